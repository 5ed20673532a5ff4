//! Error types for the tileset model

use thiserror::Error;

/// Errors raised while validating or querying the tileset model
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CoreError {
    /// A Wang set stores data that its type does not allow. This is a content
    /// defect and is reported at load time, never at resolve time.
    #[error("Wang set '{set}' tile {tile}: {reason}")]
    InvalidWangId {
        set: String,
        tile: u32,
        reason: String,
    },
    #[error("Tile id {tile} is out of range (tileset has {tile_count} tiles)")]
    OutOfRangeTileId { tile: u32, tile_count: u32 },
    #[error("Unknown Wang set: {0}")]
    UnknownWangSet(String),
    #[error("Duplicate Wang set name: {0}")]
    DuplicateWangSet(String),
    /// Weights must be finite and non-negative
    #[error("Invalid probability {probability} on {owner}")]
    InvalidProbability { owner: String, probability: f32 },
    #[error("Invalid color '{0}', expected #rrggbb or #aarrggbb")]
    InvalidColor(String),
    #[error("Failed to parse tileset: {0}")]
    Parse(String),
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::Parse(err.to_string())
    }
}
