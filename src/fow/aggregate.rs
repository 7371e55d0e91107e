//! Per-tile derived data across every active player
//!
//! Aggregated tier, fog edge masks and last-seen snapshots are pure functions
//! of the players' maps. Each is memoized per tile against a [`Stamp`] so
//! repeated queries inside one frame cost a lookup.

use crate::core::error::{FowError, Result};
use crate::core::types::{ActorSnapshot, Frame, MapSize, Tier, TileCoord};
use crate::fow::edges::{Direction, EdgeFlags, EdgeKind};
use crate::fow::grid::TileGrid;
use crate::fow::memo::{FrameMemo, Stamp};
use crate::fow::player_map::{active_maps, PlayerSlot};

#[derive(Debug, Clone, Default)]
struct TileMemo {
    tier: FrameMemo<Tier>,
    full_edges: FrameMemo<EdgeFlags>,
    partial_edges: FrameMemo<EdgeFlags>,
    snapshot: FrameMemo<Option<ActorSnapshot>>,
}

/// Memoized multi-player view of the map
#[derive(Debug, Clone)]
pub struct AggregateTileCache {
    tiles: TileGrid<TileMemo>,
}

impl AggregateTileCache {
    pub fn new(size: MapSize) -> Self {
        Self {
            tiles: TileGrid::new(size),
        }
    }

    pub fn size(&self) -> MapSize {
        self.tiles.size()
    }

    /// Best tier any active player has on the tile
    ///
    /// Off-map tiles and a match with no active player count as unfogged.
    pub fn tier_at(&mut self, tile: TileCoord, slots: &[PlayerSlot], stamp: Stamp) -> Tier {
        let Some(memo) = self.tiles.get_mut(tile) else {
            return Tier::None;
        };
        *memo
            .tier
            .get_or_compute(stamp, || aggregate_tier(slots, tile, stamp.frame))
    }

    /// Edge mask of one fog layer; both layers are computed together
    pub fn edge_flags(
        &mut self,
        tile: TileCoord,
        kind: EdgeKind,
        slots: &[PlayerSlot],
        stamp: Stamp,
    ) -> Result<EdgeFlags> {
        let memo = self
            .tiles
            .get(tile)
            .ok_or(FowError::TileOutOfBounds(tile))?;
        let cached = match kind {
            EdgeKind::Full => memo.full_edges.get(stamp),
            EdgeKind::Partial => memo.partial_edges.get(stamp),
        };
        if let Some(flags) = cached {
            return Ok(*flags);
        }

        let (full, partial) = self.compute_edges(tile, slots, stamp);
        if let Some(memo) = self.tiles.get_mut(tile) {
            memo.full_edges.store(stamp, full);
            memo.partial_edges.store(stamp, partial);
        }
        Ok(match kind {
            EdgeKind::Full => full,
            EdgeKind::Partial => partial,
        })
    }

    /// Snapshot from the player whose memory of the tile is most recent
    pub fn snapshot_at(
        &mut self,
        tile: TileCoord,
        slots: &[PlayerSlot],
        stamp: Stamp,
    ) -> Result<Option<ActorSnapshot>> {
        let memo = self
            .tiles
            .get_mut(tile)
            .ok_or(FowError::TileOutOfBounds(tile))?;
        Ok(memo
            .snapshot
            .get_or_compute(stamp, || freshest_snapshot(slots, tile))
            .clone())
    }

    fn compute_edges(
        &mut self,
        tile: TileCoord,
        slots: &[PlayerSlot],
        stamp: Stamp,
    ) -> (EdgeFlags, EdgeFlags) {
        let own = self.tier_at(tile, slots, stamp);
        let mut neighbours = [(Direction::North, Tier::None); 8];
        for (slot, direction) in neighbours.iter_mut().zip(Direction::ALL) {
            *slot = (
                direction,
                self.tier_at(direction.neighbour_of(tile), slots, stamp),
            );
        }

        let mask = |pred: &dyn Fn(Tier) -> bool| {
            neighbours
                .iter()
                .filter(|(_, tier)| pred(*tier))
                .fold(EdgeFlags::empty(), |acc, (d, _)| {
                    acc | EdgeFlags::from_direction(*d)
                })
        };

        match own {
            Tier::Full => (EdgeFlags::CURRENT, EdgeFlags::empty()),
            Tier::Partial => (mask(&|t| t == Tier::Full), EdgeFlags::CURRENT),
            Tier::None => (mask(&|t| t == Tier::Full), mask(&|t| t != Tier::None)),
        }
    }
}

fn aggregate_tier(slots: &[PlayerSlot], tile: TileCoord, frame: Frame) -> Tier {
    active_maps(slots)
        .filter_map(|map| map.try_tier_at(tile, frame))
        .min()
        .unwrap_or(Tier::None)
}

fn freshest_snapshot(slots: &[PlayerSlot], tile: TileCoord) -> Option<ActorSnapshot> {
    let mut best: Option<(Frame, Option<&ActorSnapshot>)> = None;
    for map in active_maps(slots) {
        let Ok(Some(horizon)) = map.horizon_at(tile) else {
            continue;
        };
        // First map wins ties
        if best.map_or(true, |(h, _)| horizon > h) {
            best = Some((horizon, map.last_seen_at(tile).ok().flatten()));
        }
    }
    best.and_then(|(_, snapshot)| snapshot.cloned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::PlayerId;
    use crate::fow::player_map::{ActiveMap, PlayerVisibilityMap};
    use crate::fow::sandbox::SandboxScenario;
    use crate::fow::scenario::Scenario;

    fn active(map: PlayerVisibilityMap) -> PlayerSlot {
        PlayerSlot::Active(ActiveMap {
            map,
            restart_pending: false,
        })
    }

    fn scanned(scenario: &SandboxScenario, player: PlayerId) -> PlayerSlot {
        let mut map = PlayerVisibilityMap::new(player, scenario.map_size(), 48);
        map.restart_scan(scenario, usize::MAX);
        active(map)
    }

    #[test]
    fn test_no_players_means_no_fog() {
        let mut cache = AggregateTileCache::new(MapSize::new(4, 4));
        let stamp = Stamp::new(0, 0);
        assert_eq!(cache.tier_at(TileCoord::new(1, 1), &[], stamp), Tier::None);
        assert_eq!(
            cache.snapshot_at(TileCoord::new(1, 1), &[], stamp).unwrap(),
            None
        );
    }

    #[test]
    fn test_min_across_players() {
        let mut scenario = SandboxScenario::new(MapSize::new(6, 6));
        scenario.spawn_actor(PlayerId(0), TileCoord::new(2, 2), 0);
        scenario.spawn_actor(PlayerId(1), TileCoord::new(4, 4), 0);
        let slots = vec![scanned(&scenario, PlayerId(0)), scanned(&scenario, PlayerId(1))];

        let mut cache = AggregateTileCache::new(scenario.map_size());
        let stamp = Stamp::new(0, 0);
        assert_eq!(cache.tier_at(TileCoord::new(2, 2), &slots, stamp), Tier::None);
        assert_eq!(cache.tier_at(TileCoord::new(4, 4), &slots, stamp), Tier::None);
        assert_eq!(cache.tier_at(TileCoord::new(0, 0), &slots, stamp), Tier::Full);

        let later = Stamp::new(60, 0);
        assert_eq!(cache.tier_at(TileCoord::new(2, 2), &slots, later), Tier::Partial);
    }

    #[test]
    fn test_off_map_is_unfogged_and_uncached() {
        let scenario = SandboxScenario::new(MapSize::new(3, 3));
        let slots = vec![scanned(&scenario, PlayerId(0))];
        let mut cache = AggregateTileCache::new(scenario.map_size());
        let stamp = Stamp::new(0, 0);

        assert_eq!(cache.tier_at(TileCoord::new(-1, 0), &slots, stamp), Tier::None);
        assert!(cache
            .edge_flags(TileCoord::new(3, 0), EdgeKind::Full, &slots, stamp)
            .is_err());
    }

    #[test]
    fn test_memo_holds_within_stamp() {
        let mut scenario = SandboxScenario::new(MapSize::new(4, 4));
        scenario.spawn_actor(PlayerId(0), TileCoord::new(1, 1), 0);
        let unscanned = vec![active(PlayerVisibilityMap::new(
            PlayerId(0),
            scenario.map_size(),
            48,
        ))];
        let rescanned = vec![scanned(&scenario, PlayerId(0))];

        let mut cache = AggregateTileCache::new(scenario.map_size());
        let stamp = Stamp::new(0, 0);
        assert_eq!(cache.tier_at(TileCoord::new(1, 1), &unscanned, stamp), Tier::Full);
        // Same stamp: the cached value is served even though the maps changed
        assert_eq!(cache.tier_at(TileCoord::new(1, 1), &rescanned, stamp), Tier::Full);
        // New epoch forces a recompute
        assert_eq!(
            cache.tier_at(TileCoord::new(1, 1), &rescanned, Stamp::new(0, 1)),
            Tier::None
        );
    }

    #[test]
    fn test_edges_of_full_tile() {
        let scenario = SandboxScenario::new(MapSize::new(4, 4));
        let slots = vec![scanned(&scenario, PlayerId(0))];
        let mut cache = AggregateTileCache::new(scenario.map_size());
        let stamp = Stamp::new(0, 0);

        let tile = TileCoord::new(1, 1);
        assert_eq!(
            cache.edge_flags(tile, EdgeKind::Full, &slots, stamp).unwrap(),
            EdgeFlags::CURRENT
        );
        assert!(cache
            .edge_flags(tile, EdgeKind::Partial, &slots, stamp)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_edges_of_visible_tile() {
        // Actor at (1,1) sees (0..=2, 0..=2); east column x=3 stays unseen
        let mut scenario = SandboxScenario::new(MapSize::new(4, 4));
        scenario.spawn_actor(PlayerId(0), TileCoord::new(1, 1), 1);
        let slots = vec![scanned(&scenario, PlayerId(0))];
        let mut cache = AggregateTileCache::new(scenario.map_size());
        let stamp = Stamp::new(0, 0);

        let tile = TileCoord::new(2, 1);
        let full = cache.edge_flags(tile, EdgeKind::Full, &slots, stamp).unwrap();
        let dirs: Vec<_> = full.directions().collect();
        assert_eq!(
            dirs,
            vec![Direction::NorthEast, Direction::East, Direction::SouthEast]
        );
        assert!(!full.contains(EdgeFlags::CURRENT));

        let partial = cache.edge_flags(tile, EdgeKind::Partial, &slots, stamp).unwrap();
        assert_eq!(partial, full);

        // Interior tile has no edges; off-map neighbours count as unfogged
        let corner = TileCoord::new(0, 0);
        assert!(cache
            .edge_flags(corner, EdgeKind::Full, &slots, stamp)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_edges_of_partial_tile() {
        let mut scenario = SandboxScenario::new(MapSize::new(4, 4));
        scenario.spawn_actor(PlayerId(0), TileCoord::new(0, 0), 0);
        let slots = vec![scanned(&scenario, PlayerId(0))];
        let mut cache = AggregateTileCache::new(scenario.map_size());
        let stamp = Stamp::new(100, 0);

        let tile = TileCoord::new(0, 0);
        assert_eq!(cache.tier_at(tile, &slots, stamp), Tier::Partial);
        let full = cache.edge_flags(tile, EdgeKind::Full, &slots, stamp).unwrap();
        assert_eq!(
            full.directions().collect::<Vec<_>>(),
            vec![Direction::East, Direction::SouthEast, Direction::South]
        );
        assert_eq!(
            cache.edge_flags(tile, EdgeKind::Partial, &slots, stamp).unwrap(),
            EdgeFlags::CURRENT
        );
    }

    #[test]
    fn test_snapshot_from_freshest_memory() {
        let mut scenario = SandboxScenario::new(MapSize::new(6, 6));
        let scout_a = scenario.spawn_actor(PlayerId(0), TileCoord::new(2, 2), 1);
        let target = scenario.spawn_actor(PlayerId(2), TileCoord::new(3, 3), 0);
        let mut map_a = PlayerVisibilityMap::new(PlayerId(0), scenario.map_size(), 48);
        map_a.restart_scan(&scenario, usize::MAX);

        // Target moves away; player 1 looks later and sees an empty tile
        scenario.kill_actor(scout_a);
        scenario.move_actor(target, TileCoord::new(5, 5));
        scenario.set_frame(10);
        scenario.spawn_actor(PlayerId(1), TileCoord::new(3, 2), 1);
        let mut map_b = PlayerVisibilityMap::new(PlayerId(1), scenario.map_size(), 48);
        map_b.restart_scan(&scenario, usize::MAX);

        let slots = vec![active(map_a.clone()), active(map_b)];
        let mut cache = AggregateTileCache::new(scenario.map_size());
        let stamp = Stamp::new(10, 0);
        assert_eq!(cache.snapshot_at(TileCoord::new(3, 3), &slots, stamp).unwrap(), None);

        let only_a = vec![active(map_a)];
        let seen = cache
            .snapshot_at(TileCoord::new(3, 3), &only_a, Stamp::new(10, 1))
            .unwrap()
            .unwrap();
        assert_eq!(seen.actor, target);
        assert_eq!(seen.observed_at, 0);
    }
}
