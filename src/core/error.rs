use thiserror::Error;

use crate::core::types::{PlayerId, TileCoord, TileRect};

#[derive(Error, Debug)]
pub enum FowError {
    #[error("Player {0:?} already has an active visibility map")]
    AlreadySubscribed(PlayerId),

    #[error("Player {0:?} has no active visibility map")]
    NotSubscribed(PlayerId),

    #[error("Player {0:?} is outside the configured player slots")]
    PlayerOutOfRange(PlayerId),

    #[error("Tile {0:?} is outside the map")]
    TileOutOfBounds(TileCoord),

    #[error("Degenerate view window: {0:?}")]
    DegenerateWindow(TileRect),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, FowError>;
