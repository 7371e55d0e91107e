//! Fog of war visibility engine
//!
//! Tracks, per player, which tiles are currently observed, remembered or
//! never seen, and derives what the renderer must redraw.
//!
//! Layers, bottom-up:
//! - `PlayerVisibilityMap`: one player's horizons, updated a few actors at a time
//! - `AggregateTileCache`: per-tile multi-player tier, edge masks and snapshots
//! - `VisibilityOrchestrator`: budgeted round-robin scheduling and windowed queries

pub mod aggregate;
pub mod constants;
pub mod delta;
pub mod edges;
pub mod grid;
pub mod memo;
pub mod orchestrator;
pub mod player_map;
pub mod sandbox;
pub mod scenario;

// Re-exports for convenient access
pub use aggregate::AggregateTileCache;
pub use constants::*;
pub use delta::VisibilityDelta;
pub use edges::{Direction, EdgeFlags, EdgeKind};
pub use grid::TileGrid;
pub use memo::{FrameMemo, Stamp};
pub use orchestrator::{TickReport, VisibilityOrchestrator};
pub use player_map::{tier_for_horizon, PlayerVisibilityMap};
pub use sandbox::{SandboxActor, SandboxObjects, SandboxScenario};
pub use scenario::{MapObjects, Scenario};
