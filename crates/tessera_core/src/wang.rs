//! Wang sets and Wang ids
//!
//! A Wang set tags tiles with terrain colors on their edges and/or corners.
//! Colors are 1-based; 0 is reserved for "no color".

use crate::tileset::check_probability;
use crate::CoreError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Index of a color within a Wang set (0 = none)
pub type WangColorIndex = u8;

/// Simple RGBA color for terrain visualization
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);
    pub const RED: Self = Self::rgb(1.0, 0.0, 0.0);

    /// Parse Tiled's `#rrggbb` / `#aarrggbb` notation
    pub fn from_hex(hex: &str) -> Result<Self, CoreError> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        let invalid = || CoreError::InvalidColor(hex.to_string());
        let channel = |i: usize| -> Result<f32, CoreError> {
            let byte = digits.get(i..i + 2).ok_or_else(invalid)?;
            u8::from_str_radix(byte, 16)
                .map(|v| v as f32 / 255.0)
                .map_err(|_| invalid())
        };
        match digits.len() {
            6 => Ok(Self::rgb(channel(0)?, channel(2)?, channel(4)?)),
            8 => Ok(Self::rgba(channel(2)?, channel(4)?, channel(6)?, channel(0)?)),
            _ => Err(invalid()),
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

/// Type of Wang set - determines which WangId slots are meaningful
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WangSetType {
    /// Corner slots (1, 3, 5, 7) only
    #[default]
    Corner,
    /// Edge slots (0, 2, 4, 6) only
    Edge,
    /// All 8 slots
    Mixed,
}

impl WangSetType {
    /// Whether `slot` carries meaning for this set type
    pub fn is_meaningful(&self, slot: usize) -> bool {
        match self {
            WangSetType::Corner => WangId::is_corner(slot),
            WangSetType::Edge => !WangId::is_corner(slot),
            WangSetType::Mixed => slot < WangId::SLOTS,
        }
    }

    /// Meaningful slot indices in clockwise order
    pub fn meaningful_slots(self) -> impl Iterator<Item = usize> {
        (0..WangId::SLOTS).filter(move |&slot| self.is_meaningful(slot))
    }

    /// Number of meaningful slots
    pub fn position_count(&self) -> usize {
        match self {
            WangSetType::Corner | WangSetType::Edge => 4,
            WangSetType::Mixed => 8,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            WangSetType::Corner => "corner",
            WangSetType::Edge => "edge",
            WangSetType::Mixed => "mixed",
        }
    }
}

/// Terrain colors at the 8 positions of a tile
///
/// Uses Tiled's position indexing:
///   7|0|1
///   6|X|2
///   5|4|3
/// - Even indices (0,2,4,6) = Edges (Top, Right, Bottom, Left)
/// - Odd indices (1,3,5,7) = Corners (TopRight, BottomRight, BottomLeft, TopLeft)
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WangId(pub [WangColorIndex; 8]);

impl WangId {
    pub const SLOTS: usize = 8;

    pub const TOP: usize = 0;
    pub const TOP_RIGHT: usize = 1;
    pub const RIGHT: usize = 2;
    pub const BOTTOM_RIGHT: usize = 3;
    pub const BOTTOM: usize = 4;
    pub const BOTTOM_LEFT: usize = 5;
    pub const LEFT: usize = 6;
    pub const TOP_LEFT: usize = 7;

    pub const EMPTY: Self = WangId([0; 8]);

    pub const fn new(colors: [WangColorIndex; 8]) -> Self {
        WangId(colors)
    }

    /// All positions set to one color
    pub const fn filled(color: WangColorIndex) -> Self {
        WangId([color; 8])
    }

    pub fn get(&self, slot: usize) -> WangColorIndex {
        self.0.get(slot).copied().unwrap_or(0)
    }

    pub fn set(&mut self, slot: usize, color: WangColorIndex) {
        if slot < Self::SLOTS {
            self.0[slot] = color;
        }
    }

    pub fn colors(&self) -> &[WangColorIndex; 8] {
        &self.0
    }

    /// Get opposite index (position on neighbor that faces us)
    pub fn opposite_index(i: usize) -> usize {
        (i + 4) % 8
    }

    /// Check if index is a corner (odd indices: 1,3,5,7)
    pub fn is_corner(i: usize) -> bool {
        i % 2 == 1
    }

    /// Get next index clockwise
    pub fn next_index(i: usize) -> usize {
        (i + 1) % 8
    }

    /// Get previous index counter-clockwise
    pub fn prev_index(i: usize) -> usize {
        (i + 7) % 8
    }

    /// Copy with every slot that `set_type` ignores cleared to 0
    pub fn masked(&self, set_type: WangSetType) -> Self {
        let mut out = *self;
        for (slot, color) in out.0.iter_mut().enumerate() {
            if !set_type.is_meaningful(slot) {
                *color = 0;
            }
        }
        out
    }

    /// Whether every slot meaningful to `set_type` is 0
    pub fn is_blank(&self, set_type: WangSetType) -> bool {
        set_type.meaningful_slots().all(|slot| self.0[slot] == 0)
    }

    /// Highest color index used in any slot
    pub fn max_color(&self) -> WangColorIndex {
        self.0.iter().copied().max().unwrap_or(0)
    }
}

impl fmt::Display for WangId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, color) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{color}")?;
        }
        Ok(())
    }
}

impl FromStr for WangId {
    type Err = CoreError;

    /// Parse Tiled's `wangid="0,0,1,0,1,0,0,0"` attribute
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut colors = [0; 8];
        let mut count = 0;
        for (i, part) in s.split(',').enumerate() {
            if i >= Self::SLOTS {
                return Err(CoreError::Parse(format!("wangid '{s}' has more than 8 slots")));
            }
            colors[i] = part
                .trim()
                .parse()
                .map_err(|_| CoreError::Parse(format!("wangid '{s}': invalid color '{part}'")))?;
            count += 1;
        }
        if count != Self::SLOTS {
            return Err(CoreError::Parse(format!("wangid '{s}' must have 8 slots")));
        }
        Ok(WangId(colors))
    }
}

/// A terrain color within a Wang set (e.g., "Float", "Ground")
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WangColor {
    pub name: String,
    /// Display color for UI visualization
    #[serde(default)]
    pub color: Color,
    /// Representative tile for this color (shown in UI)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tile: Option<u32>,
    #[serde(default = "default_probability")]
    pub probability: f32,
}

fn default_probability() -> f32 {
    1.0
}

impl WangColor {
    pub fn new(name: impl Into<String>, color: Color) -> Self {
        Self {
            name: name.into(),
            color,
            tile: None,
            probability: default_probability(),
        }
    }
}

/// A Wang set attached to a tileset
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WangSet {
    pub name: String,
    /// Type of terrain matching (Corner, Edge, or Mixed)
    #[serde(rename = "type")]
    pub set_type: WangSetType,
    /// Colors in this set; `colors[0]` is color index 1
    #[serde(default)]
    pub colors: Vec<WangColor>,
    /// WangId of each member tile (tile id -> WangId)
    #[serde(default)]
    pub tiles: BTreeMap<u32, WangId>,
    /// Representative tile for the whole set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tile: Option<u32>,
}

impl WangSet {
    pub fn new(name: impl Into<String>, set_type: WangSetType) -> Self {
        Self {
            name: name.into(),
            set_type,
            colors: Vec::new(),
            tiles: BTreeMap::new(),
            tile: None,
        }
    }

    /// Add a new color to this set, returning its 1-based index
    pub fn add_color(&mut self, color: WangColor) -> WangColorIndex {
        self.colors.push(color);
        self.colors.len() as WangColorIndex
    }

    /// Number of colors (highest valid color index)
    pub fn color_count(&self) -> usize {
        self.colors.len()
    }

    /// Look up a color by its 1-based index
    pub fn color(&self, index: WangColorIndex) -> Option<&WangColor> {
        (index as usize)
            .checked_sub(1)
            .and_then(|i| self.colors.get(i))
    }

    /// Get color index by name
    pub fn color_index(&self, name: &str) -> Option<WangColorIndex> {
        self.colors
            .iter()
            .position(|c| c.name == name)
            .map(|i| (i + 1) as WangColorIndex)
    }

    /// Assign a WangId to a tile, replacing any previous one
    pub fn set_tile_wang_id(&mut self, tile: u32, wang_id: WangId) {
        self.tiles.insert(tile, wang_id);
    }

    pub fn with_tile(mut self, tile: u32, wang_id: WangId) -> Self {
        self.set_tile_wang_id(tile, wang_id);
        self
    }

    pub fn wang_id(&self, tile: u32) -> Option<WangId> {
        self.tiles.get(&tile).copied()
    }

    /// Tiles whose meaningful slots are all 0 (the "isolated" variants), ascending
    pub fn blank_tiles(&self) -> Vec<u32> {
        self.tiles
            .iter()
            .filter(|(_, id)| id.is_blank(self.set_type))
            .map(|(&tile, _)| tile)
            .collect()
    }

    /// Check every member WangId against the set type and color list
    pub fn validate(&self, tile_count: u32) -> Result<(), CoreError> {
        for color in &self.colors {
            check_probability(color.probability, || {
                format!("Wang set '{}' color '{}'", self.name, color.name)
            })?;
        }
        for (&tile, wang_id) in &self.tiles {
            if tile >= tile_count {
                return Err(CoreError::OutOfRangeTileId { tile, tile_count });
            }
            for (slot, &color) in wang_id.0.iter().enumerate() {
                if !self.set_type.is_meaningful(slot) && color != 0 {
                    return Err(CoreError::InvalidWangId {
                        set: self.name.clone(),
                        tile,
                        reason: format!(
                            "slot {slot} must be 0 in a {} set (found {color})",
                            self.set_type.name()
                        ),
                    });
                }
                if color as usize > self.colors.len() {
                    return Err(CoreError::InvalidWangId {
                        set: self.name.clone(),
                        tile,
                        reason: format!(
                            "slot {slot} uses color {color} but the set defines {}",
                            self.colors.len()
                        ),
                    });
                }
            }
        }
        Ok(())
    }
}
