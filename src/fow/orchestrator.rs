//! Visibility orchestrator - drives every player's map under one tick budget
//!
//! Each tick the scheduler walks the active player slots round-robin from
//! where the previous tick stopped, handing each map whatever is left of the
//! per-tick actor budget. Two independent bounds hold:
//! - at most `tick_entity_budget` actor scans per tick, all players combined
//! - at least `min_ticks_per_cycle` ticks between two full re-scans
//!
//! The orchestrator also owns the aggregate tile cache and the lazily
//! computed redraw set for the last queried window.

use crate::core::config::FowConfig;
use crate::core::error::{FowError, Result};
use crate::core::types::{ActorSnapshot, PlayerId, Tier, TileCoord, TileRect};
use crate::fow::aggregate::AggregateTileCache;
use crate::fow::delta::{compute_delta, VisibilityDelta};
use crate::fow::edges::{EdgeFlags, EdgeKind};
use crate::fow::memo::Stamp;
use crate::fow::player_map::{active_maps, ActiveMap, PlayerSlot, PlayerVisibilityMap};
use crate::fow::scenario::{MapObjects, Scenario};

/// What one call to [`VisibilityOrchestrator::execute_update_tick`] did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Actor scans performed, summed over every map
    pub actors_processed: usize,
    /// Players whose map was scanned, in scheduling order
    pub maps_touched: Vec<PlayerId>,
    /// The scan cycle re-armed at the end of this tick
    pub cycle_restarted: bool,
}

/// Owns the per-player maps and schedules their incremental updates
pub struct VisibilityOrchestrator<S: Scenario, M: MapObjects> {
    scenario: S,
    objects: M,
    config: FowConfig,
    slots: Vec<PlayerSlot>,
    active_count: usize,
    cursor: usize,
    scan_cycle_tick: u32,
    view_window: Option<TileRect>,
    cached_delta: Option<VisibilityDelta>,
    cache: AggregateTileCache,
    /// Bumped on every invalidation; part of the aggregate cache stamp
    epoch: u64,
}

impl<S: Scenario, M: MapObjects> VisibilityOrchestrator<S, M> {
    /// Create with default tunables
    pub fn new(scenario: S, objects: M) -> Self {
        let config = FowConfig::default();
        Self::build(scenario, objects, config)
    }

    /// Create with validated custom tunables
    pub fn with_config(scenario: S, objects: M, config: FowConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(scenario, objects, config))
    }

    fn build(scenario: S, objects: M, config: FowConfig) -> Self {
        let size = scenario.map_size();
        Self {
            slots: vec![PlayerSlot::Vacant; config.max_players],
            cache: AggregateTileCache::new(size),
            scenario,
            objects,
            config,
            active_count: 0,
            cursor: 0,
            scan_cycle_tick: 0,
            view_window: None,
            cached_delta: None,
            epoch: 0,
        }
    }

    pub fn scenario(&self) -> &S {
        &self.scenario
    }

    /// Mutable access for the game loop (advance the clock, move actors)
    pub fn scenario_mut(&mut self) -> &mut S {
        &mut self.scenario
    }

    pub fn map_objects_mut(&mut self) -> &mut M {
        &mut self.objects
    }

    pub fn config(&self) -> &FowConfig {
        &self.config
    }

    pub fn active_count(&self) -> usize {
        self.active_count
    }

    pub fn scan_cycle_tick(&self) -> u32 {
        self.scan_cycle_tick
    }

    /// Slot the next tick starts scheduling from
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_subscribed(&self, player: PlayerId) -> bool {
        self.slots
            .get(player.slot())
            .is_some_and(PlayerSlot::is_active)
    }

    pub fn active_players(&self) -> Vec<PlayerId> {
        active_maps(&self.slots).map(|m| m.owner()).collect()
    }

    pub fn player_map(&self, player: PlayerId) -> Option<&PlayerVisibilityMap> {
        self.slots.get(player.slot()).and_then(PlayerSlot::map)
    }

    /// Start tracking a player's visibility
    pub fn subscribe(&mut self, player: PlayerId) -> Result<()> {
        let size = self.scenario.map_size();
        let memory = self.config.visibility_memory_frames;
        let slot = self
            .slots
            .get_mut(player.slot())
            .ok_or(FowError::PlayerOutOfRange(player))?;
        if slot.is_active() {
            return Err(FowError::AlreadySubscribed(player));
        }

        *slot = PlayerSlot::Active(ActiveMap {
            map: PlayerVisibilityMap::new(player, size, memory),
            restart_pending: true,
        });
        self.active_count += 1;
        self.invalidate();

        tracing::debug!(
            "Subscribed player {:?} ({} active)",
            player,
            self.active_count
        );
        Ok(())
    }

    /// Stop tracking a player; hands back the map it accumulated
    pub fn unsubscribe(&mut self, player: PlayerId) -> Result<PlayerVisibilityMap> {
        let slot = self
            .slots
            .get_mut(player.slot())
            .ok_or(FowError::PlayerOutOfRange(player))?;
        let PlayerSlot::Active(active) = std::mem::take(slot) else {
            return Err(FowError::NotSubscribed(player));
        };

        self.active_count -= 1;
        self.invalidate();

        tracing::debug!(
            "Unsubscribed player {:?} ({} active)",
            player,
            self.active_count
        );
        Ok(active.map)
    }

    /// Run one amortized update; call once per simulation frame
    pub fn execute_update_tick(&mut self) -> TickReport {
        let mut report = TickReport::default();
        if self.active_count == 0 {
            return report;
        }

        let slot_count = self.slots.len();
        let mut remaining = self.config.tick_entity_budget;

        while remaining > 0 {
            let Some(index) = self.next_active_from(self.cursor) else {
                break;
            };
            self.cursor = index;

            let player = PlayerId(index as u8);
            if report.maps_touched.contains(&player) {
                // Full lap this tick
                break;
            }

            let PlayerSlot::Active(active) = &mut self.slots[index] else {
                break;
            };
            let processed = if active.restart_pending {
                active.restart_pending = false;
                active.map.restart_scan(&self.scenario, remaining)
            } else {
                active.map.continue_scan(&self.scenario, remaining)
            };

            remaining -= processed;
            report.actors_processed += processed;
            report.maps_touched.push(player);
            self.cursor = (index + 1) % slot_count;
        }

        self.scan_cycle_tick += 1;

        if self.scan_cycle_tick >= self.config.min_ticks_per_cycle && self.all_scans_complete() {
            self.scan_cycle_tick = 0;
            for slot in &mut self.slots {
                if let PlayerSlot::Active(active) = slot {
                    active.restart_pending = true;
                }
            }
            report.cycle_restarted = true;
            tracing::debug!(
                "Visibility scan cycle re-armed for {} players",
                self.active_count
            );
        }

        if !report.maps_touched.is_empty() {
            self.invalidate();
        }

        tracing::trace!(
            "Visibility tick: {} actors over {} maps",
            report.actors_processed,
            report.maps_touched.len()
        );
        report
    }

    /// Redraw set for a view window, recomputed only when stale
    pub fn query_window(&mut self, window: TileRect) -> Result<&VisibilityDelta> {
        if window.is_degenerate() {
            return Err(FowError::DegenerateWindow(window));
        }
        if self.view_window != Some(window) {
            self.view_window = Some(window);
            self.cached_delta = None;
        }

        let stamp = self.stamp();
        let size = self.cache.size();
        let cache = &mut self.cache;
        let slots = &self.slots;
        let objects = &self.objects;
        let delta = self.cached_delta.get_or_insert_with(|| {
            let delta = compute_delta(window, size, objects, |tile| {
                cache.tier_at(tile, slots, stamp)
            });
            tracing::debug!(
                "Recomputed visibility delta for {:?}: {} objects, {} terrain, {} cells",
                window,
                delta.objects.len(),
                delta.terrain_objects.len(),
                delta.cells.len()
            );
            delta
        });
        Ok(delta)
    }

    /// Aggregated tier across every active player
    pub fn tier_at(&mut self, tile: TileCoord) -> Tier {
        let stamp = self.stamp();
        self.cache.tier_at(tile, &self.slots, stamp)
    }

    /// Fog edge mask of one layer
    pub fn edge_flags(&mut self, tile: TileCoord, kind: EdgeKind) -> Result<EdgeFlags> {
        let stamp = self.stamp();
        self.cache.edge_flags(tile, kind, &self.slots, stamp)
    }

    /// Most recently remembered occupant of a tile across players
    pub fn snapshot_at(&mut self, tile: TileCoord) -> Result<Option<ActorSnapshot>> {
        let stamp = self.stamp();
        self.cache.snapshot_at(tile, &self.slots, stamp)
    }

    /// Tier of a tile for one subscribed player
    pub fn player_tier_at(&self, player: PlayerId, tile: TileCoord) -> Result<Tier> {
        let map = self
            .player_map(player)
            .ok_or(FowError::NotSubscribed(player))?;
        map.tier_at(tile, self.scenario.current_frame())
    }

    fn stamp(&self) -> Stamp {
        Stamp::new(self.scenario.current_frame(), self.epoch)
    }

    fn invalidate(&mut self) {
        self.cached_delta = None;
        self.epoch += 1;
    }

    fn next_active_from(&self, start: usize) -> Option<usize> {
        let n = self.slots.len();
        (0..n)
            .map(|step| (start + step) % n)
            .find(|&i| self.slots[i].is_active())
    }

    fn all_scans_complete(&self) -> bool {
        self.slots.iter().all(|slot| match slot {
            PlayerSlot::Active(active) => !active.restart_pending && active.map.is_scan_complete(),
            PlayerSlot::Vacant => true,
        })
    }
}
