//! Tile layer: the row-major tile-instance grid of a map region

use crate::flags::tile_index;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A grid of packed tile references
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileLayer {
    pub name: String,
    /// The tileset used for this layer
    pub tileset_id: Uuid,
    pub width: u32,
    pub height: u32,
    /// Tile data - None means empty, Some(packed) is a tile id plus flip flags
    pub tiles: Vec<Option<u32>>,
}

impl TileLayer {
    /// Create a new empty tile layer
    pub fn new(name: impl Into<String>, tileset_id: Uuid, width: u32, height: u32) -> Self {
        let size = width as usize * height as usize;
        Self {
            name: name.into(),
            tileset_id,
            width,
            height,
            tiles: vec![None; size],
        }
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height
    }

    /// Row-major index of a cell, `None` outside the layer
    pub fn index(&self, x: i32, y: i32) -> Option<usize> {
        if self.in_bounds(x, y) {
            Some(y as usize * self.width as usize + x as usize)
        } else {
            None
        }
    }

    /// Packed tile reference at a cell
    pub fn get(&self, x: i32, y: i32) -> Option<u32> {
        self.index(x, y)
            .and_then(|i| self.tiles.get(i).copied().flatten())
    }

    /// Tile id at a cell with flip flags stripped
    pub fn tile_id(&self, x: i32, y: i32) -> Option<u32> {
        self.get(x, y).map(tile_index)
    }

    /// Write a cell, returning the previous value. Out-of-bounds writes are ignored.
    pub fn set(&mut self, x: i32, y: i32, tile: Option<u32>) -> Option<u32> {
        self.index(x, y)
            .and_then(|i| self.tiles.get_mut(i))
            .and_then(|slot| std::mem::replace(slot, tile))
    }

    /// Iterate occupied cells as `(x, y, packed)` in row-major order
    pub fn occupied(&self) -> impl Iterator<Item = (i32, i32, u32)> + '_ {
        let width = (self.width as usize).max(1);
        self.tiles.iter().enumerate().filter_map(move |(i, tile)| {
            tile.map(|t| ((i % width) as i32, (i / width) as i32, t))
        })
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.iter().all(Option::is_none)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{pack_tile, TileFlip};

    #[test]
    fn test_new_tile_layer() {
        let layer = TileLayer::new("Ground", Uuid::new_v4(), 10, 10);
        assert_eq!(layer.name, "Ground");
        assert_eq!(layer.tiles.len(), 100);
        assert!(layer.is_empty());
    }

    #[test]
    fn test_get_set_and_bounds() {
        let mut layer = TileLayer::new("Ground", Uuid::new_v4(), 4, 3);
        assert_eq!(layer.set(1, 2, Some(17)), None);
        assert_eq!(layer.get(1, 2), Some(17));
        assert_eq!(layer.set(1, 2, None), Some(17));
        assert_eq!(layer.set(-1, 0, Some(3)), None);
        assert_eq!(layer.set(4, 0, Some(3)), None);
        assert!(layer.is_empty());
        assert_eq!(layer.index(3, 2), Some(11));
        assert_eq!(layer.index(0, 3), None);
    }

    #[test]
    fn test_large_dimensions_index_without_overflow() {
        // 70000 x 70000 cells exceeds u32; storage is left empty
        let mut layer = TileLayer {
            name: "Ground".to_string(),
            tileset_id: Uuid::nil(),
            width: 70_000,
            height: 70_000,
            tiles: Vec::new(),
        };
        assert_eq!(layer.index(69_999, 69_999), Some(4_899_999_999));
        assert_eq!(layer.get(69_999, 69_999), None);
        assert_eq!(layer.set(69_999, 69_999, Some(1)), None);
        assert_eq!(layer.occupied().count(), 0);
    }

    #[test]
    fn test_tile_id_strips_flips() {
        let mut layer = TileLayer::new("Ground", Uuid::new_v4(), 2, 2);
        let packed = pack_tile(
            5,
            TileFlip {
                x: true,
                y: true,
                diagonal: false,
            },
        );
        layer.set(0, 1, Some(packed));
        assert_eq!(layer.tile_id(0, 1), Some(5));
        assert_eq!(layer.occupied().collect::<Vec<_>>(), vec![(0, 1, packed)]);
    }
}
