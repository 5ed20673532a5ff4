//! Packed tile references with Tiled's flip flags
//!
//! A tile layer stores each cell as a `u32`: the low 29 bits are the tile id
//! inside the tileset, the top three bits are the flip flags Tiled writes for
//! horizontally, vertically and anti-diagonally flipped tiles.

use serde::{Deserialize, Serialize};

pub const TILE_FLIP_X: u32 = 0x8000_0000;
pub const TILE_FLIP_Y: u32 = 0x4000_0000;
/// Anti-diagonal flip (swap x and y). Combined with X/Y it expresses 90° rotations.
pub const TILE_FLIP_D: u32 = 0x2000_0000;
pub const TILE_FLIP_MASK: u32 = TILE_FLIP_X | TILE_FLIP_Y | TILE_FLIP_D;

/// Strip flip flags from a packed tile reference
#[inline]
pub fn tile_index(packed: u32) -> u32 {
    packed & !TILE_FLIP_MASK
}

#[inline]
pub fn tile_flip_x(packed: u32) -> bool {
    packed & TILE_FLIP_X != 0
}

#[inline]
pub fn tile_flip_y(packed: u32) -> bool {
    packed & TILE_FLIP_Y != 0
}

#[inline]
pub fn tile_flip_d(packed: u32) -> bool {
    packed & TILE_FLIP_D != 0
}

/// Pack a tile id and its flips into a layer cell value
pub fn pack_tile(tile: u32, flip: TileFlip) -> u32 {
    tile_index(tile) | flip.bits()
}

/// Decoded flip state of a placed tile
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileFlip {
    #[serde(default)]
    pub x: bool,
    #[serde(default)]
    pub y: bool,
    #[serde(default)]
    pub diagonal: bool,
}

impl TileFlip {
    pub const NONE: Self = Self {
        x: false,
        y: false,
        diagonal: false,
    };

    /// Decode the flip flags of a packed tile reference
    pub fn from_packed(packed: u32) -> Self {
        Self {
            x: tile_flip_x(packed),
            y: tile_flip_y(packed),
            diagonal: tile_flip_d(packed),
        }
    }

    pub fn bits(&self) -> u32 {
        let mut bits = 0;
        if self.x {
            bits |= TILE_FLIP_X;
        }
        if self.y {
            bits |= TILE_FLIP_Y;
        }
        if self.diagonal {
            bits |= TILE_FLIP_D;
        }
        bits
    }

    pub fn is_identity(&self) -> bool {
        !self.x && !self.y && !self.diagonal
    }

    /// Whether applying these flips mirrors the tile (odd number of reflections)
    pub fn is_reflection(&self) -> bool {
        (self.x as u8 + self.y as u8 + self.diagonal as u8) % 2 == 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_roundtrip_strips_flags() {
        let flip = TileFlip {
            x: true,
            y: false,
            diagonal: true,
        };
        let packed = pack_tile(17, flip);
        assert_eq!(tile_index(packed), 17);
        assert!(tile_flip_x(packed));
        assert!(!tile_flip_y(packed));
        assert!(tile_flip_d(packed));
        assert_eq!(TileFlip::from_packed(packed), flip);
    }

    #[test]
    fn test_reflection_parity() {
        assert!(!TileFlip::NONE.is_reflection());
        assert!(TileFlip { x: true, ..TileFlip::NONE }.is_reflection());
        // Diagonal + horizontal is a 90° rotation
        assert!(!TileFlip {
            x: true,
            y: false,
            diagonal: true
        }
        .is_reflection());
        assert!(TileFlip {
            x: true,
            y: true,
            diagonal: true
        }
        .is_reflection());
    }
}
