//! Core data structures for tessera
//!
//! This crate provides the read-only tileset model consumed by the autotile
//! and collision crates:
//! - `Tileset` - Tile records, atlas addressing and Wang sets
//! - `Tile` / `ObjectGroup` / `CollisionObject` - Per-tile collision geometry
//! - `Shape` - Rectangle or polygon in local tile pixels
//! - `WangSet` / `WangId` - Edge/corner terrain signatures for autotiling
//! - `TileLayer` - Row-major grid of packed tile references
//!
//! The model is built once by an external loader (or deserialized with
//! [`Tileset::from_json`]) and validated with [`Tileset::validate`].

mod collision;
mod error;
mod flags;
mod layer;
mod tileset;
mod wang;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use collision::{CollisionMaterial, CollisionObject, ObjectGroup, OneWayDirection, Shape};
pub use error::CoreError;
pub use flags::{
    pack_tile, tile_flip_d, tile_flip_x, tile_flip_y, tile_index, TileFlip, TILE_FLIP_D,
    TILE_FLIP_MASK, TILE_FLIP_X, TILE_FLIP_Y,
};
pub use layer::TileLayer;
pub use tileset::{PixelRect, Tile, Tileset, TilesetImage};
pub use wang::{Color, WangColor, WangColorIndex, WangId, WangSet, WangSetType};
