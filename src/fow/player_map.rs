//! Per-player exploration state
//!
//! Each subscribed player owns one map covering the whole match area. A tile
//! holds the frame up to which it counts as observed (its horizon), or nothing
//! if the player has never seen it. Scans fold the player's actors' visible
//! tiles into the map a few actors at a time.

use ahash::AHashSet;
use serde::{Deserialize, Serialize};

use crate::core::error::{FowError, Result};
use crate::core::types::{ActorId, ActorSnapshot, Frame, MapSize, PlayerId, Tier, TileCoord};
use crate::fow::grid::TileGrid;
use crate::fow::scenario::Scenario;

/// Tier of a tile given its horizon and the current frame
#[inline]
pub fn tier_for_horizon(horizon: Option<Frame>, current_frame: Frame) -> Tier {
    match horizon {
        None => Tier::Full,
        Some(h) if current_frame <= h => Tier::None,
        Some(_) => Tier::Partial,
    }
}

/// Visibility memory of a single player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerVisibilityMap {
    owner: PlayerId,
    memory_frames: u64,
    /// Frame up to which each tile is observed; None = never revealed
    horizon: TileGrid<Option<Frame>>,
    /// Occupant seen on each tile the last time this player observed it
    last_seen: TileGrid<Option<ActorSnapshot>>,
    explored_count: usize,
    #[serde(skip)]
    processed: AHashSet<ActorId>,
    #[serde(skip)]
    scan_exhausted: bool,
    /// Off-map tiles reported by the scenario, summed over all scans
    #[serde(skip)]
    off_map_reports: usize,
}

impl PlayerVisibilityMap {
    pub fn new(owner: PlayerId, size: MapSize, memory_frames: u64) -> Self {
        Self {
            owner,
            memory_frames,
            horizon: TileGrid::new(size),
            last_seen: TileGrid::new(size),
            explored_count: 0,
            processed: AHashSet::new(),
            scan_exhausted: false,
            off_map_reports: 0,
        }
    }

    pub fn owner(&self) -> PlayerId {
        self.owner
    }

    pub fn size(&self) -> MapSize {
        self.horizon.size()
    }

    /// Fog tier of a tile as seen by this player
    pub fn tier_at(&self, tile: TileCoord, current_frame: Frame) -> Result<Tier> {
        self.try_tier_at(tile, current_frame)
            .ok_or(FowError::TileOutOfBounds(tile))
    }

    #[inline]
    pub(crate) fn try_tier_at(&self, tile: TileCoord, current_frame: Frame) -> Option<Tier> {
        self.horizon
            .get(tile)
            .map(|h| tier_for_horizon(*h, current_frame))
    }

    /// Raw horizon of a tile; `Ok(None)` if never revealed
    pub fn horizon_at(&self, tile: TileCoord) -> Result<Option<Frame>> {
        self.horizon
            .get(tile)
            .copied()
            .ok_or(FowError::TileOutOfBounds(tile))
    }

    /// Occupant recorded the last time this player observed the tile
    pub fn last_seen_at(&self, tile: TileCoord) -> Result<Option<&ActorSnapshot>> {
        self.last_seen
            .get(tile)
            .map(Option::as_ref)
            .ok_or(FowError::TileOutOfBounds(tile))
    }

    /// Number of tiles ever revealed
    pub fn explored_count(&self) -> usize {
        self.explored_count
    }

    /// Actors already folded into the current scan cycle
    pub fn processed_count(&self) -> usize {
        self.processed.len()
    }

    /// True once a scan call ran out of unprocessed actors before its budget
    pub fn is_scan_complete(&self) -> bool {
        self.scan_exhausted
    }

    /// Off-map tiles the scenario claimed were visible; non-zero means a broken footprint
    pub fn off_map_reports(&self) -> usize {
        self.off_map_reports
    }

    /// Start a new scan cycle and process up to `budget` actors
    pub fn restart_scan<S: Scenario + ?Sized>(&mut self, scenario: &S, budget: usize) -> usize {
        self.processed.clear();
        self.scan_exhausted = false;
        self.continue_scan(scenario, budget)
    }

    /// Process up to `budget` actors not yet seen in this cycle
    ///
    /// Returns the number of actors processed.
    pub fn continue_scan<S: Scenario + ?Sized>(&mut self, scenario: &S, budget: usize) -> usize {
        let frame = scenario.current_frame();
        let horizon = frame + self.memory_frames;
        let mut processed = 0;

        for actor in scenario.living_actors_of(self.owner) {
            if self.processed.contains(&actor) {
                continue;
            }
            if processed == budget {
                self.scan_exhausted = false;
                return processed;
            }
            self.observe(scenario, actor, frame, horizon);
            self.processed.insert(actor);
            processed += 1;
        }

        self.scan_exhausted = true;
        processed
    }

    fn observe<S: Scenario + ?Sized>(
        &mut self,
        scenario: &S,
        actor: ActorId,
        frame: Frame,
        horizon: Frame,
    ) {
        let mut off_map = 0;
        for tile in scenario.visible_tiles_of(actor) {
            let Some(slot) = self.horizon.get_mut(tile) else {
                off_map += 1;
                continue;
            };
            let next = match *slot {
                Some(h) => h.max(horizon),
                None => {
                    self.explored_count += 1;
                    horizon
                }
            };
            *slot = Some(next);

            let seen = scenario
                .occupant_at(tile)
                .map(|snapshot| ActorSnapshot {
                    observed_at: frame,
                    ..snapshot
                });
            if let Some(entry) = self.last_seen.get_mut(tile) {
                *entry = seen;
            }
        }

        if off_map > 0 {
            self.off_map_reports += off_map;
            tracing::warn!(
                "Actor {:?} of player {:?} reported {} visible tiles outside the {}x{} map",
                actor,
                self.owner,
                off_map,
                self.horizon.size().width,
                self.horizon.size().height
            );
        }
    }
}

/// Orchestrator slot for one player identity
#[derive(Debug, Clone, Default)]
pub enum PlayerSlot {
    #[default]
    Vacant,
    Active(ActiveMap),
}

/// A subscribed player's map plus its scheduling state
#[derive(Debug, Clone)]
pub struct ActiveMap {
    pub map: PlayerVisibilityMap,
    /// Next scan call must be a restart
    pub restart_pending: bool,
}

impl PlayerSlot {
    pub fn map(&self) -> Option<&PlayerVisibilityMap> {
        match self {
            PlayerSlot::Active(active) => Some(&active.map),
            PlayerSlot::Vacant => None,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, PlayerSlot::Active(_))
    }
}

/// Maps of every active slot, in slot order
pub fn active_maps(slots: &[PlayerSlot]) -> impl Iterator<Item = &PlayerVisibilityMap> + '_ {
    slots.iter().filter_map(PlayerSlot::map)
}
