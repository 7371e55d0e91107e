//! In-memory scenario and map objects
//!
//! Small stand-ins for the game's entity model and tile renderer, used by the
//! headless runner, benches and tests.

use std::collections::BTreeMap;

use ahash::AHashMap;

use crate::core::types::{
    ActorId, ActorSnapshot, Frame, MapSize, ObjectId, PlayerId, TerrainObjectId, TileCoord,
    TileRect,
};
use crate::fow::scenario::{MapObjects, Scenario};

/// A unit or structure with a square sight footprint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SandboxActor {
    pub id: ActorId,
    pub owner: PlayerId,
    pub position: TileCoord,
    pub sight_radius: u32,
}

/// Scenario with a settable clock and a flat actor list
#[derive(Debug, Clone)]
pub struct SandboxScenario {
    frame: Frame,
    size: MapSize,
    /// Keyed by id so enumeration order is stable
    actors: BTreeMap<ActorId, SandboxActor>,
    next_id: u32,
}

impl SandboxScenario {
    pub fn new(size: MapSize) -> Self {
        Self {
            frame: 0,
            size,
            actors: BTreeMap::new(),
            next_id: 0,
        }
    }

    pub fn set_frame(&mut self, frame: Frame) {
        self.frame = frame;
    }

    pub fn advance_frame(&mut self) -> Frame {
        self.frame += 1;
        self.frame
    }

    pub fn spawn_actor(&mut self, owner: PlayerId, position: TileCoord, sight_radius: u32) -> ActorId {
        let id = ActorId(self.next_id);
        self.next_id += 1;
        self.actors.insert(
            id,
            SandboxActor {
                id,
                owner,
                position,
                sight_radius,
            },
        );
        id
    }

    /// Returns false if the actor does not exist
    pub fn move_actor(&mut self, id: ActorId, position: TileCoord) -> bool {
        match self.actors.get_mut(&id) {
            Some(actor) => {
                actor.position = position;
                true
            }
            None => false,
        }
    }

    pub fn kill_actor(&mut self, id: ActorId) -> bool {
        self.actors.remove(&id).is_some()
    }

    pub fn actor(&self, id: ActorId) -> Option<&SandboxActor> {
        self.actors.get(&id)
    }

    pub fn actors(&self) -> impl Iterator<Item = &SandboxActor> {
        self.actors.values()
    }
}

impl Scenario for SandboxScenario {
    fn current_frame(&self) -> Frame {
        self.frame
    }

    fn map_size(&self) -> MapSize {
        self.size
    }

    fn living_actors_of(&self, player: PlayerId) -> Vec<ActorId> {
        self.actors
            .values()
            .filter(|a| a.owner == player)
            .map(|a| a.id)
            .collect()
    }

    fn visible_tiles_of(&self, actor: ActorId) -> Vec<TileCoord> {
        let Some(actor) = self.actors.get(&actor) else {
            return Vec::new();
        };
        let r = actor.sight_radius as i32;
        let footprint = TileRect::new(
            actor.position.x - r,
            actor.position.y - r,
            (2 * r + 1) as u32,
            (2 * r + 1) as u32,
        );
        match footprint.clipped_to(self.size) {
            Some(clipped) => clipped.tiles().collect(),
            None => Vec::new(),
        }
    }

    fn occupant_at(&self, tile: TileCoord) -> Option<ActorSnapshot> {
        self.actors
            .values()
            .find(|a| a.position == tile)
            .map(|a| ActorSnapshot {
                actor: a.id,
                owner: a.owner,
                observed_at: self.frame,
            })
    }
}

/// One primary drawable per tile plus optional multi-cell drawables and decorations
#[derive(Debug, Clone)]
pub struct SandboxObjects {
    size: MapSize,
    secondary_at: AHashMap<TileCoord, Vec<ObjectId>>,
    secondary_cells: AHashMap<ObjectId, Vec<TileCoord>>,
    terrain: BTreeMap<TerrainObjectId, Vec<TileCoord>>,
    next_secondary: u32,
    next_terrain: u32,
}

impl SandboxObjects {
    pub fn new(size: MapSize) -> Self {
        Self {
            size,
            secondary_at: AHashMap::new(),
            secondary_cells: AHashMap::new(),
            terrain: BTreeMap::new(),
            // Primary ids are tile indices
            next_secondary: size.tile_count() as u32,
            next_terrain: 0,
        }
    }

    /// Id of the primary drawable of an on-map tile
    pub fn primary_object_at(&self, tile: TileCoord) -> Option<ObjectId> {
        self.size.index(tile).map(|i| ObjectId(i as u32))
    }

    /// Add a drawable spanning several cells (cliffs, bridges, ...)
    pub fn add_secondary(&mut self, cells: Vec<TileCoord>) -> ObjectId {
        let id = ObjectId(self.next_secondary);
        self.next_secondary += 1;
        for &cell in &cells {
            self.secondary_at.entry(cell).or_default().push(id);
        }
        self.secondary_cells.insert(id, cells);
        id
    }

    pub fn add_terrain_object(&mut self, cells: Vec<TileCoord>) -> TerrainObjectId {
        let id = TerrainObjectId(self.next_terrain);
        self.next_terrain += 1;
        self.terrain.insert(id, cells);
        id
    }
}

impl MapObjects for SandboxObjects {
    fn primary_and_secondary_objects_at(&self, tile: TileCoord) -> Vec<ObjectId> {
        let mut objects: Vec<ObjectId> = self.primary_object_at(tile).into_iter().collect();
        if let Some(secondary) = self.secondary_at.get(&tile) {
            objects.extend(secondary.iter().copied());
        }
        objects
    }

    fn cut_cells_of(&self, object: ObjectId) -> Vec<TileCoord> {
        if let Some(cells) = self.secondary_cells.get(&object) {
            return cells.clone();
        }
        let width = self.size.width.max(1);
        if (object.0 as usize) < self.size.tile_count() {
            vec![TileCoord::new(
                (object.0 % width) as i32,
                (object.0 / width) as i32,
            )]
        } else {
            Vec::new()
        }
    }

    fn terrain_objects_intersecting(&self, window: TileRect) -> Vec<TerrainObjectId> {
        self.terrain
            .iter()
            .filter(|(_, cells)| cells.iter().any(|c| window.contains(*c)))
            .map(|(id, _)| *id)
            .collect()
    }

    fn terrain_cut_cells_of(&self, object: TerrainObjectId) -> Vec<TileCoord> {
        self.terrain.get(&object).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_footprint_clipped_to_map() {
        let mut scenario = SandboxScenario::new(MapSize::new(5, 5));
        let actor = scenario.spawn_actor(PlayerId(0), TileCoord::new(0, 0), 1);

        let tiles = scenario.visible_tiles_of(actor);
        assert_eq!(tiles.len(), 4);
        assert!(tiles.iter().all(|t| scenario.map_size().contains(*t)));
    }

    #[test]
    fn test_living_actors_stable_order() {
        let mut scenario = SandboxScenario::new(MapSize::new(5, 5));
        let a = scenario.spawn_actor(PlayerId(0), TileCoord::new(0, 0), 0);
        let _b = scenario.spawn_actor(PlayerId(1), TileCoord::new(1, 0), 0);
        let c = scenario.spawn_actor(PlayerId(0), TileCoord::new(2, 0), 0);

        assert_eq!(scenario.living_actors_of(PlayerId(0)), vec![a, c]);
        assert!(scenario.kill_actor(a));
        assert_eq!(scenario.living_actors_of(PlayerId(0)), vec![c]);
        assert!(!scenario.move_actor(a, TileCoord::new(3, 3)));
    }

    #[test]
    fn test_objects_lookup() {
        let size = MapSize::new(4, 4);
        let mut objects = SandboxObjects::new(size);
        let bridge = objects.add_secondary(vec![TileCoord::new(1, 1), TileCoord::new(2, 1)]);
        let tree = objects.add_terrain_object(vec![TileCoord::new(3, 3)]);

        let at = objects.primary_and_secondary_objects_at(TileCoord::new(2, 1));
        assert_eq!(at, vec![ObjectId(6), bridge]);
        assert_eq!(objects.cut_cells_of(ObjectId(6)), vec![TileCoord::new(2, 1)]);
        assert_eq!(objects.cut_cells_of(bridge).len(), 2);

        assert_eq!(
            objects.terrain_objects_intersecting(TileRect::new(2, 2, 2, 2)),
            vec![tree]
        );
        assert!(objects
            .terrain_objects_intersecting(TileRect::new(0, 0, 2, 2))
            .is_empty());
    }
}
