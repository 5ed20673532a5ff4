//! Error types for collider extraction

use tessera_core::CoreError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CollisionError {
    /// The shape encloses no area. Extraction records it and emits an empty
    /// collider in its place.
    #[error("Degenerate collision shape {object} on tile {tile}")]
    DegenerateShape { tile: u32, object: u32 },
    #[error(transparent)]
    Core(#[from] CoreError),
}
