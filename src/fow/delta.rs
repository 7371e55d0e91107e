//! Redraw sets for a view window

use ahash::AHashSet;
use serde::Serialize;

use crate::core::types::{MapSize, ObjectId, TerrainObjectId, Tier, TileCoord, TileRect};
use crate::fow::scenario::MapObjects;

/// Map elements inside a window that the renderer must redraw
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VisibilityDelta {
    pub objects: AHashSet<ObjectId>,
    pub terrain_objects: AHashSet<TerrainObjectId>,
    pub cells: AHashSet<TileCoord>,
}

impl VisibilityDelta {
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty() && self.terrain_objects.is_empty() && self.cells.is_empty()
    }
}

/// Collect every element of `window` not hidden under full fog
///
/// `tier_of` answers the aggregated tier of a tile. Objects are deduplicated;
/// an object already collected is not looked up again.
pub(crate) fn compute_delta<M, F>(
    window: TileRect,
    size: MapSize,
    objects: &M,
    mut tier_of: F,
) -> VisibilityDelta
where
    M: MapObjects + ?Sized,
    F: FnMut(TileCoord) -> Tier,
{
    let mut delta = VisibilityDelta::default();
    let Some(clipped) = window.clipped_to(size) else {
        return delta;
    };

    for tile in clipped.tiles() {
        if tier_of(tile) == Tier::Full {
            continue;
        }
        for object in objects.primary_and_secondary_objects_at(tile) {
            if delta.objects.insert(object) {
                delta.cells.extend(
                    objects
                        .cut_cells_of(object)
                        .into_iter()
                        .filter(|c| size.contains(*c)),
                );
            }
        }
    }

    for terrain in objects.terrain_objects_intersecting(clipped) {
        if delta.terrain_objects.contains(&terrain) {
            continue;
        }
        let cells = objects.terrain_cut_cells_of(terrain);
        if cells.iter().all(|c| tier_of(*c) == Tier::Full) {
            continue;
        }
        delta.terrain_objects.insert(terrain);
        delta
            .cells
            .extend(cells.into_iter().filter(|c| size.contains(*c)));
    }

    delta
}
