//! Fog of war constants - all tunable defaults in one place
//!
//! `FowConfig` starts from these; a match may override them.

// Memory (frames an observation keeps a tile in the currently-observed tier)
pub const VISIBILITY_MEMORY_FRAMES: u64 = 48;

// Scheduling
pub const TICK_ENTITY_BUDGET: usize = 50; // actor scans per tick, all players combined
pub const MIN_TICKS_PER_CYCLE: u32 = 40; // floor between two full re-scans

// Player slots
pub const DEFAULT_MAX_PLAYERS: usize = 16;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_shorter_than_memory() {
        // A tile observed once per cycle must not drop to partial fog between scans
        assert!((MIN_TICKS_PER_CYCLE as u64) < VISIBILITY_MEMORY_FRAMES);
    }

    #[test]
    fn test_budget_positive() {
        assert!(TICK_ENTITY_BUDGET > 0);
    }
}
