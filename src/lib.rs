//! Fog of war engine - amortized per-player visibility for tile maps

pub mod core;
pub mod fow;
