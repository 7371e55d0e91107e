//! Fog edge bitmasks
//!
//! One bit per compass neighbour plus a marker for the tile itself. The
//! renderer picks an edge-blending sprite from the combination.

use std::ops::{BitOr, BitOrAssign};

use serde::{Deserialize, Serialize};

use crate::core::types::TileCoord;

/// The eight neighbours of a tile; north is towards row 0
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
    ];

    /// (dx, dy) offset towards this neighbour
    pub fn offset(&self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::NorthEast => (1, -1),
            Direction::East => (1, 0),
            Direction::SouthEast => (1, 1),
            Direction::South => (0, 1),
            Direction::SouthWest => (-1, 1),
            Direction::West => (-1, 0),
            Direction::NorthWest => (-1, -1),
        }
    }

    pub fn neighbour_of(&self, tile: TileCoord) -> TileCoord {
        let (dx, dy) = self.offset();
        tile.offset(dx, dy)
    }

    fn bit(&self) -> u16 {
        1 << (*self as u16)
    }
}

/// Which fog layer an edge mask describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeKind {
    /// Border of never-seen fog
    Full,
    /// Border of remembered fog
    Partial,
}

/// Neighbour-difference bitmask
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EdgeFlags(u16);

impl EdgeFlags {
    /// The tile itself lies in this fog layer
    pub const CURRENT: EdgeFlags = EdgeFlags(1 << 8);

    pub const fn empty() -> Self {
        EdgeFlags(0)
    }

    pub fn bits(&self) -> u16 {
        self.0
    }

    pub fn from_direction(direction: Direction) -> Self {
        EdgeFlags(direction.bit())
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn contains(&self, other: EdgeFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn has_direction(&self, direction: Direction) -> bool {
        self.0 & direction.bit() != 0
    }

    pub fn insert(&mut self, direction: Direction) {
        self.0 |= direction.bit();
    }

    /// Set neighbour directions
    pub fn directions(&self) -> impl Iterator<Item = Direction> + '_ {
        Direction::ALL
            .into_iter()
            .filter(move |d| self.has_direction(*d))
    }
}

impl BitOr for EdgeFlags {
    type Output = EdgeFlags;

    fn bitor(self, rhs: EdgeFlags) -> EdgeFlags {
        EdgeFlags(self.0 | rhs.0)
    }
}

impl BitOrAssign for EdgeFlags {
    fn bitor_assign(&mut self, rhs: EdgeFlags) {
        self.0 |= rhs.0;
    }
}
