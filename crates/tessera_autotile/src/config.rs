//! Autotile configuration and brush state

use crate::resolver::MatchMode;
use serde::{Deserialize, Serialize};
use tessera_core::WangColorIndex;

/// What to write into a cell whose signature matches no tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackPolicy {
    /// Leave the cell's current tile untouched
    #[default]
    KeepExisting,
    /// Use the set's all-zero tile, keeping the current tile if there is none
    BlankTile,
    /// Empty the cell
    Clear,
}

/// How one tile is chosen among equally ranked candidates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariantPolicy {
    /// Always the top-ranked candidate
    #[default]
    Deterministic,
    /// Probability-weighted pick among candidates tied on matched slots,
    /// seeded per cell so a repaint reproduces the same variant
    Weighted { seed: u64 },
}

/// Configuration for terrain painting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AutotileConfig {
    pub match_mode: MatchMode,
    pub fallback: FallbackPolicy,
    pub variants: VariantPolicy,
}

impl AutotileConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_match_mode(mut self, match_mode: MatchMode) -> Self {
        self.match_mode = match_mode;
        self
    }

    pub fn with_fallback(mut self, fallback: FallbackPolicy) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn with_variants(mut self, variants: VariantPolicy) -> Self {
        self.variants = variants;
        self
    }
}

/// Terrain brush state for painting with automatic tile selection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TerrainBrush {
    /// Currently selected Wang set
    pub wang_set: Option<String>,
    /// Currently selected color within the set (0 erases)
    pub color: Option<WangColorIndex>,
    /// Whether terrain painting mode is active
    pub active: bool,
}

impl TerrainBrush {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(&mut self, wang_set: impl Into<String>, color: WangColorIndex) {
        self.wang_set = Some(wang_set.into());
        self.color = Some(color);
        self.active = true;
    }

    pub fn deselect(&mut self) {
        self.wang_set = None;
        self.color = None;
        self.active = false;
    }

    /// The selected set and color while the brush is active
    pub fn selection(&self) -> Option<(&str, WangColorIndex)> {
        if !self.active {
            return None;
        }
        Some((self.wang_set.as_deref()?, self.color?))
    }
}
