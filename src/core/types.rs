//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};

/// Simulation frame counter (one visibility tick per frame)
pub type Frame = u64;

/// Player identity; doubles as the slot index in the orchestrator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(pub u8);

impl PlayerId {
    #[inline]
    pub fn slot(&self) -> usize {
        self.0 as usize
    }
}

/// Unique identifier for controllable units and structures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActorId(pub u32);

/// Drawable tile object (primary or secondary isotile)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(pub u32);

/// Terrain decoration object (trees, rocks, ...)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TerrainObjectId(pub u32);

/// Tile coordinate (column, row)
///
/// Signed so that the off-map neighbours of border tiles can be named.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    pub x: i32,
    pub y: i32,
}

impl TileCoord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn offset(&self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// Map dimensions in tiles, fixed for the lifetime of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapSize {
    pub width: u32,
    pub height: u32,
}

impl MapSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn contains(&self, coord: TileCoord) -> bool {
        coord.x >= 0
            && coord.y >= 0
            && (coord.x as u32) < self.width
            && (coord.y as u32) < self.height
    }

    /// Row-major index of a tile, or None when off the map
    #[inline]
    pub fn index(&self, coord: TileCoord) -> Option<usize> {
        if self.contains(coord) {
            Some(coord.y as usize * self.width as usize + coord.x as usize)
        } else {
            None
        }
    }

    pub fn tile_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// The whole map as a window
    pub fn bounds(&self) -> TileRect {
        TileRect::new(0, 0, self.width, self.height)
    }
}

/// Rectangular window in tile space
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileRect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl TileRect {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    pub fn is_degenerate(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn contains(&self, coord: TileCoord) -> bool {
        let dx = coord.x as i64 - self.x as i64;
        let dy = coord.y as i64 - self.y as i64;
        dx >= 0 && dy >= 0 && dx < self.width as i64 && dy < self.height as i64
    }

    /// Intersection with the map; None when the window lies entirely off it
    pub fn clipped_to(&self, size: MapSize) -> Option<TileRect> {
        let x0 = self.x.max(0) as i64;
        let y0 = self.y.max(0) as i64;
        let x1 = (self.x as i64 + self.width as i64).min(size.width as i64);
        let y1 = (self.y as i64 + self.height as i64).min(size.height as i64);
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(TileRect::new(
            x0 as i32,
            y0 as i32,
            (x1 - x0) as u32,
            (y1 - y0) as u32,
        ))
    }

    /// Tiles of the window in row-major order
    pub fn tiles(&self) -> impl Iterator<Item = TileCoord> {
        let (x, y, w, h) = (self.x, self.y, self.width as i32, self.height as i32);
        (0..h).flat_map(move |dy| (0..w).map(move |dx| TileCoord::new(x + dx, y + dy)))
    }
}

/// Fog tier of a tile, ordered `None < Partial < Full`
///
/// Aggregation across players picks the minimum: visible to anyone counts as visible.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Tier {
    /// Currently observed
    None,
    /// Observed before, not currently observed
    Partial,
    /// Never observed
    #[default]
    Full,
}

/// What a player last saw standing on a tile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorSnapshot {
    pub actor: ActorId,
    pub owner: PlayerId,
    pub observed_at: Frame,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_ordering() {
        assert!(Tier::None < Tier::Partial);
        assert!(Tier::Partial < Tier::Full);
        assert_eq!(Tier::Full.min(Tier::None), Tier::None);
    }

    #[test]
    fn test_map_index() {
        let size = MapSize::new(4, 3);
        assert_eq!(size.index(TileCoord::new(0, 0)), Some(0));
        assert_eq!(size.index(TileCoord::new(3, 2)), Some(11));
        assert_eq!(size.index(TileCoord::new(4, 0)), None);
        assert_eq!(size.index(TileCoord::new(-1, 0)), None);
        assert_eq!(size.tile_count(), 12);
    }

    #[test]
    fn test_rect_clipping() {
        let size = MapSize::new(10, 10);
        let rect = TileRect::new(-2, 8, 5, 5);
        assert_eq!(rect.clipped_to(size), Some(TileRect::new(0, 8, 3, 2)));

        let off_map = TileRect::new(20, 20, 3, 3);
        assert_eq!(off_map.clipped_to(size), None);
    }

    #[test]
    fn test_rect_tiles_row_major() {
        let rect = TileRect::new(1, 1, 2, 2);
        let tiles: Vec<_> = rect.tiles().collect();
        assert_eq!(
            tiles,
            vec![
                TileCoord::new(1, 1),
                TileCoord::new(2, 1),
                TileCoord::new(1, 2),
                TileCoord::new(2, 2),
            ]
        );
        assert!(rect.contains(TileCoord::new(2, 2)));
        assert!(!rect.contains(TileCoord::new(3, 2)));
        assert!(TileRect::new(0, 0, 0, 5).is_degenerate());
    }

    #[test]
    fn test_rect_contains_extreme_coords() {
        let rect = TileRect::new(-1, 0, 4, 4);
        assert!(!rect.contains(TileCoord::new(i32::MAX, 0)));
        assert!(!rect.contains(TileCoord::new(i32::MIN, 0)));
        assert!(rect.contains(TileCoord::new(-1, 3)));

        let wide = TileRect::new(i32::MIN, i32::MIN, u32::MAX, 2);
        assert!(wide.contains(TileCoord::new(i32::MAX - 1, i32::MIN + 1)));
        assert!(!wide.contains(TileCoord::new(i32::MAX, i32::MIN)));
    }
}
