//! Contracts the engine consumes from the rest of the game
//!
//! The orchestrator receives implementations of these traits in its
//! constructor; nothing is looked up globally.

use crate::core::types::{
    ActorId, ActorSnapshot, Frame, MapSize, ObjectId, PlayerId, TerrainObjectId, TileCoord,
    TileRect,
};

/// Scenario clock and entity model
pub trait Scenario {
    /// Monotonically increasing simulation frame
    fn current_frame(&self) -> Frame;

    fn map_size(&self) -> MapSize;

    /// Living units and structures of a player
    ///
    /// The order must stay stable while a scan cycle is in progress.
    fn living_actors_of(&self, player: PlayerId) -> Vec<ActorId>;

    /// Tiles an actor currently observes
    fn visible_tiles_of(&self, actor: ActorId) -> Vec<TileCoord>;

    /// What an observer looking at this tile right now would see on it
    fn occupant_at(&self, tile: TileCoord) -> Option<ActorSnapshot>;
}

/// Drawable map elements the renderer redraws
pub trait MapObjects {
    /// Primary and secondary drawable tile objects covering a tile
    fn primary_and_secondary_objects_at(&self, tile: TileCoord) -> Vec<ObjectId>;

    /// Every grid cell a drawable object cuts across
    fn cut_cells_of(&self, object: ObjectId) -> Vec<TileCoord>;

    /// Terrain decorations whose footprint intersects the window
    fn terrain_objects_intersecting(&self, window: TileRect) -> Vec<TerrainObjectId>;

    /// Every grid cell a terrain decoration cuts across
    fn terrain_cut_cells_of(&self, object: TerrainObjectId) -> Vec<TileCoord>;
}
