//! Dense tile grid for per-tile visibility data

use serde::{Deserialize, Serialize};

use crate::core::types::{MapSize, TileCoord};

/// Row-major grid holding one value per map tile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileGrid<T: Clone + Default> {
    size: MapSize,
    data: Vec<T>,
}

impl<T: Clone + Default> TileGrid<T> {
    pub fn new(size: MapSize) -> Self {
        Self {
            size,
            data: vec![T::default(); size.tile_count()],
        }
    }

    pub fn size(&self) -> MapSize {
        self.size
    }

    #[inline]
    pub fn get(&self, coord: TileCoord) -> Option<&T> {
        self.size.index(coord).map(|i| &self.data[i])
    }

    #[inline]
    pub fn get_mut(&mut self, coord: TileCoord) -> Option<&mut T> {
        self.size.index(coord).map(move |i| &mut self.data[i])
    }

    /// Reset every tile to `value`
    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }

    /// Tiles paired with their values, row-major
    pub fn iter(&self) -> impl Iterator<Item = (TileCoord, &T)> + '_ {
        let width = self.size.width.max(1) as usize;
        self.data.iter().enumerate().map(move |(i, value)| {
            (
                TileCoord::new((i % width) as i32, (i / width) as i32),
                value,
            )
        })
    }
}
