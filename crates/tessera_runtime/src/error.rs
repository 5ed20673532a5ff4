//! Error types for the map runtime

use tessera_autotile::AutotileError;
use tessera_collision::CollisionError;
use tessera_core::CoreError;
use thiserror::Error;

use crate::chunk::ChunkCoord;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Config(#[from] toml::de::Error),
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error(transparent)]
    Autotile(#[from] AutotileError),
    #[error(transparent)]
    Collision(#[from] CollisionError),
    #[error("Cell ({x}, {y}) is outside the {width}x{height} map")]
    OutOfBounds {
        x: i32,
        y: i32,
        width: u32,
        height: u32,
    },
    #[error("Chunk ({}, {}) data is {width}x{height}, expected {expected}x{expected}", coord.x, coord.y)]
    InvalidChunk {
        coord: ChunkCoord,
        width: u32,
        height: u32,
        expected: u32,
    },
    #[error("Chunk ({}, {}) stores {len} cells, expected {expected}", coord.x, coord.y)]
    InvalidChunkStorage {
        coord: ChunkCoord,
        len: usize,
        expected: usize,
    },
}
