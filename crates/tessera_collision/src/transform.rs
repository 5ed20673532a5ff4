//! Tile placement transforms
//!
//! Tiled stores tile flips in the top three bits of a packed tile reference.
//! They are applied inside the tile box: diagonal (swap x and y) first, then
//! horizontal, then vertical.

use serde::{Deserialize, Serialize};
use tessera_core::{tile_index, TileFlip};

/// Flip state of a placed tile plus the box it flips within
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TileTransform {
    pub flip: TileFlip,
    pub tile_width: f32,
    pub tile_height: f32,
}

impl TileTransform {
    pub fn new(flip: TileFlip, tile_width: f32, tile_height: f32) -> Self {
        Self {
            flip,
            tile_width,
            tile_height,
        }
    }

    pub fn identity(tile_width: f32, tile_height: f32) -> Self {
        Self::new(TileFlip::NONE, tile_width, tile_height)
    }

    /// Transform encoded in a packed tile reference
    pub fn from_packed(packed: u32, tile_width: f32, tile_height: f32) -> Self {
        Self::new(TileFlip::from_packed(packed), tile_width, tile_height)
    }

    pub fn is_identity(&self) -> bool {
        self.flip.is_identity()
    }

    /// Odd number of flips: polygon winding must be reversed to be preserved
    pub fn is_reflection(&self) -> bool {
        self.flip.is_reflection()
    }

    /// Map a tile-local point
    pub fn apply(&self, point: [f32; 2]) -> [f32; 2] {
        let [mut x, mut y] = point;
        let (mut width, mut height) = (self.tile_width, self.tile_height);
        if self.flip.diagonal {
            std::mem::swap(&mut x, &mut y);
            std::mem::swap(&mut width, &mut height);
        }
        if self.flip.x {
            x = width - x;
        }
        if self.flip.y {
            y = height - y;
        }
        [x, y]
    }
}

/// One tile placed in the world
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TileInstance {
    /// Packed tile reference (id plus flip flags)
    pub tile: u32,
    /// Grid cell the tile occupies
    pub cell: (i32, i32),
    /// World position of the tile's top-left corner
    pub origin: [f32; 2],
}

impl TileInstance {
    pub fn new(tile: u32, cell: (i32, i32), origin: [f32; 2]) -> Self {
        Self { tile, cell, origin }
    }

    /// Instance on a regular grid: origin is `cell * tile size`
    pub fn at_cell(tile: u32, x: i32, y: i32, tile_width: u32, tile_height: u32) -> Self {
        Self::new(
            tile,
            (x, y),
            [x as f32 * tile_width as f32, y as f32 * tile_height as f32],
        )
    }

    /// Tile id without flip flags
    pub fn tile_id(&self) -> u32 {
        tile_index(self.tile)
    }

    pub fn flip(&self) -> TileFlip {
        TileFlip::from_packed(self.tile)
    }
}
