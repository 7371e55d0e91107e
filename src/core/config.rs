//! Visibility engine configuration with documented constants
//!
//! The defaults are the values the engine was tuned with. They can be
//! overridden from a TOML file per match.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{FowError, Result};
use crate::fow::constants::{
    DEFAULT_MAX_PLAYERS, MIN_TICKS_PER_CYCLE, TICK_ENTITY_BUDGET, VISIBILITY_MEMORY_FRAMES,
};

/// Tunables for the fog of war engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FowConfig {
    /// How many frames an observation pushes a tile's horizon forward
    ///
    /// While the frame counter is at or below the horizon the tile is
    /// currently observed. Once it passes, the tile drops to partial fog
    /// and stays there until revisited.
    pub visibility_memory_frames: u64,

    /// Maximum actor scans per tick, summed over every player
    ///
    /// Caps the per-tick latency regardless of player or actor count.
    pub tick_entity_budget: usize,

    /// Minimum ticks between two full re-scans of a player's actors
    ///
    /// Bounds how often visibility is re-derived even on tiny maps.
    /// Should stay below `visibility_memory_frames`, otherwise tiles
    /// flicker into partial fog between two scans of the same actor.
    pub min_ticks_per_cycle: u32,

    /// Number of player slots the orchestrator reserves
    pub max_players: usize,
}

impl Default for FowConfig {
    fn default() -> Self {
        Self {
            visibility_memory_frames: VISIBILITY_MEMORY_FRAMES,
            tick_entity_budget: TICK_ENTITY_BUDGET,
            min_ticks_per_cycle: MIN_TICKS_PER_CYCLE,
            max_players: DEFAULT_MAX_PLAYERS,
        }
    }
}

impl FowConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from TOML text and validate it
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: FowConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file from disk
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.tick_entity_budget == 0 {
            return Err(FowError::InvalidConfig(
                "tick_entity_budget must be positive".into(),
            ));
        }

        if self.min_ticks_per_cycle == 0 {
            return Err(FowError::InvalidConfig(
                "min_ticks_per_cycle must be positive".into(),
            ));
        }

        if self.visibility_memory_frames == 0 {
            return Err(FowError::InvalidConfig(
                "visibility_memory_frames must be positive".into(),
            ));
        }

        // PlayerId is a u8
        if self.max_players == 0 || self.max_players > 256 {
            return Err(FowError::InvalidConfig(format!(
                "max_players ({}) must be within 1..=256",
                self.max_players
            )));
        }

        if self.min_ticks_per_cycle as u64 > self.visibility_memory_frames {
            tracing::warn!(
                "min_ticks_per_cycle ({}) exceeds visibility_memory_frames ({}); observed tiles will flicker",
                self.min_ticks_per_cycle,
                self.visibility_memory_frames
            );
        }

        Ok(())
    }
}
