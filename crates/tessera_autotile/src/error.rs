//! Error types for Wang resolution and painting

use crate::resolver::Signature;
use tessera_core::CoreError;
use thiserror::Error;

/// Errors raised by the resolver and the painter
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AutotileError {
    /// No tile in the active Wang set satisfies the signature. Painting records
    /// this per cell and keeps going.
    #[error("No tile matches signature [{signature}]")]
    NoMatch { signature: Signature },
    #[error("Terrain color {color} is not defined (set has {color_count} colors)")]
    UnknownColor { color: u8, color_count: usize },
    #[error(transparent)]
    Core(#[from] CoreError),
}
