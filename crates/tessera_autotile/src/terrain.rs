//! Terrain grid
//!
//! The painter's input: which Wang color each cell is assigned. A cell with no
//! assignment (`None`) is different from one assigned color 0 ("none").

use crate::resolver::Signature;
use serde::{Deserialize, Serialize};
use tessera_core::{WangColorIndex, WangId};

/// Neighbor offsets in `WangId` slot order, y-down (Tiled map coordinates)
pub const NEIGHBOR_OFFSETS: [(i32, i32); 8] = [
    (0, -1),  // 0 = Top
    (1, -1),  // 1 = TopRight
    (1, 0),   // 2 = Right
    (1, 1),   // 3 = BottomRight
    (0, 1),   // 4 = Bottom
    (-1, 1),  // 5 = BottomLeft
    (-1, 0),  // 6 = Left
    (-1, -1), // 7 = TopLeft
];

/// Row-major grid of terrain color assignments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerrainGrid {
    pub width: u32,
    pub height: u32,
    pub cells: Vec<Option<WangColorIndex>>,
}

impl TerrainGrid {
    /// Grid with no assignments
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            cells: vec![None; width as usize * height as usize],
        }
    }

    /// Grid with every cell assigned `color`
    pub fn filled(width: u32, height: u32, color: WangColorIndex) -> Self {
        Self {
            width,
            height,
            cells: vec![Some(color); width as usize * height as usize],
        }
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        self.in_bounds(x, y)
            .then(|| y as usize * self.width as usize + x as usize)
    }

    /// Assigned color, `None` when unassigned or out of bounds
    pub fn get(&self, x: i32, y: i32) -> Option<WangColorIndex> {
        self.index(x, y)
            .and_then(|i| self.cells.get(i).copied().flatten())
    }

    /// Assign a cell. Returns false when the cell is out of bounds.
    pub fn set(&mut self, x: i32, y: i32, color: Option<WangColorIndex>) -> bool {
        match self.index(x, y).and_then(|i| self.cells.get_mut(i)) {
            Some(cell) => {
                *cell = color;
                true
            }
            None => false,
        }
    }

    /// Neighbor colors of a cell; out-of-grid and unassigned neighbors are don't-care
    pub fn signature(&self, x: i32, y: i32) -> Signature {
        let mut signature = Signature::ANY;
        for (slot, (dx, dy)) in NEIGHBOR_OFFSETS.iter().enumerate() {
            signature.set(slot, self.get(x + dx, y + dy));
        }
        signature
    }

    /// The evaluated view of an assigned cell
    pub fn cell(&self, x: i32, y: i32) -> Option<TerrainCell> {
        Some(TerrainCell {
            x,
            y,
            color: self.get(x, y)?,
            signature: self.signature(x, y),
        })
    }

    /// Number of assigned cells
    pub fn assigned(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }
}

/// A grid cell together with its computed signature
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerrainCell {
    pub x: i32,
    pub y: i32,
    pub color: WangColorIndex,
    pub signature: Signature,
}

impl TerrainCell {
    /// Neighbor coordinate in slot direction `slot`
    pub fn neighbor(&self, slot: usize) -> (i32, i32) {
        let (dx, dy) = NEIGHBOR_OFFSETS[slot % WangId::SLOTS];
        (self.x + dx, self.y + dy)
    }
}
