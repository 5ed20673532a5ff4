//! Tileset model: tile records, atlas addressing and Wang sets

use crate::{CollisionObject, CoreError, ObjectGroup, WangSet};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use uuid::Uuid;

/// Pixel rectangle inside the tileset image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// The atlas image a tileset slices its tiles from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TilesetImage {
    /// Path to the image file (relative to the tileset)
    pub source: String,
    pub width: u32,
    pub height: u32,
}

/// Per-tile definition: collision, weight and custom metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Tile {
    pub id: u32,
    /// Weight used to rank otherwise equivalent Wang candidates
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probability: Option<f32>,
    /// Collision shapes in local tile coordinates
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collision: Option<ObjectGroup>,
    /// Explicit sub-rectangle for image-collection style tiles
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_rect: Option<PixelRect>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    /// Custom user-defined properties
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub properties: HashMap<String, serde_json::Value>,
}

impl Tile {
    pub fn new(id: u32) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }

    /// Set collision objects for this tile
    pub fn with_collision(mut self, objects: Vec<CollisionObject>) -> Self {
        self.collision = Some(ObjectGroup::new(objects));
        self
    }

    pub fn with_probability(mut self, probability: f32) -> Self {
        self.probability = Some(probability);
        self
    }

    /// Collision objects, empty when the tile has no object group
    pub fn collision_objects(&self) -> &[CollisionObject] {
        self.collision
            .as_ref()
            .map(|group| group.objects.as_slice())
            .unwrap_or(&[])
    }

    /// Check if any properties are set (non-default)
    pub fn is_empty(&self) -> bool {
        self.probability.is_none()
            && self.collision.as_ref().map_or(true, ObjectGroup::is_empty)
            && self.image_rect.is_none()
            && self.class.is_none()
            && self.properties.is_empty()
    }
}

/// Tileset configuration, immutable once loaded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tileset {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub name: String,
    pub tile_width: u32,
    pub tile_height: u32,
    /// Columns in the atlas image
    pub columns: u32,
    /// Valid tile ids are `0..tile_count`
    pub tile_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<TilesetImage>,
    /// Tiles that carry data; ids in range without a record use defaults
    #[serde(default)]
    pub tiles: BTreeMap<u32, Tile>,
    #[serde(default)]
    pub wang_sets: Vec<WangSet>,
}

impl Tileset {
    /// Create a new tileset without tile data
    pub fn new(
        name: impl Into<String>,
        tile_width: u32,
        tile_height: u32,
        columns: u32,
        tile_count: u32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            tile_width,
            tile_height,
            columns,
            tile_count,
            image: None,
            tiles: BTreeMap::new(),
            wang_sets: Vec::new(),
        }
    }

    /// Deserialize a tileset from JSON and validate it
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        let tileset: Tileset = serde_json::from_str(json)?;
        tileset.validate()?;
        Ok(tileset)
    }

    pub fn to_json(&self) -> Result<String, CoreError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn with_image(mut self, source: impl Into<String>, width: u32, height: u32) -> Self {
        self.image = Some(TilesetImage {
            source: source.into(),
            width,
            height,
        });
        self
    }

    /// Insert or replace a tile record
    pub fn insert_tile(&mut self, tile: Tile) {
        self.tiles.insert(tile.id, tile);
    }

    pub fn with_tile(mut self, tile: Tile) -> Self {
        self.insert_tile(tile);
        self
    }

    pub fn add_wang_set(&mut self, wang_set: WangSet) {
        self.wang_sets.push(wang_set);
    }

    pub fn with_wang_set(mut self, wang_set: WangSet) -> Self {
        self.add_wang_set(wang_set);
        self
    }

    pub fn contains(&self, tile: u32) -> bool {
        tile < self.tile_count
    }

    /// Fail with `OutOfRangeTileId` for ids outside the tileset
    pub fn check_tile(&self, tile: u32) -> Result<(), CoreError> {
        if self.contains(tile) {
            Ok(())
        } else {
            Err(CoreError::OutOfRangeTileId {
                tile,
                tile_count: self.tile_count,
            })
        }
    }

    /// Tile record, `None` both for in-range tiles without data and out-of-range ids
    pub fn tile(&self, tile: u32) -> Option<&Tile> {
        self.tiles.get(&tile)
    }

    /// Collision objects of a tile; empty for in-range tiles without data
    pub fn collision_objects(&self, tile: u32) -> Result<&[CollisionObject], CoreError> {
        self.check_tile(tile)?;
        Ok(self
            .tiles
            .get(&tile)
            .map(Tile::collision_objects)
            .unwrap_or(&[]))
    }

    /// Per-tile weight, `None` when the tile has no explicit probability
    pub fn probability(&self, tile: u32) -> Option<f32> {
        self.tiles.get(&tile).and_then(|t| t.probability)
    }

    pub fn wang_set(&self, name: &str) -> Option<&WangSet> {
        self.wang_sets.iter().find(|set| set.name == name)
    }

    pub fn require_wang_set(&self, name: &str) -> Result<&WangSet, CoreError> {
        self.wang_set(name)
            .ok_or_else(|| CoreError::UnknownWangSet(name.to_string()))
    }

    /// Rows in the atlas
    pub fn rows(&self) -> u32 {
        if self.columns == 0 {
            0
        } else {
            self.tile_count.div_ceil(self.columns)
        }
    }

    /// Convert a tile id to its (column, row) in the atlas
    pub fn tile_to_grid(&self, tile: u32) -> Option<(u32, u32)> {
        if !self.contains(tile) || self.columns == 0 {
            return None;
        }
        Some((tile % self.columns, tile / self.columns))
    }

    /// Pixel rectangle of a tile in the atlas image
    pub fn atlas_rect(&self, tile: u32) -> Option<PixelRect> {
        if let Some(rect) = self.tile(tile).and_then(|t| t.image_rect) {
            return Some(rect);
        }
        let (col, row) = self.tile_to_grid(tile)?;
        Some(PixelRect {
            x: col * self.tile_width,
            y: row * self.tile_height,
            width: self.tile_width,
            height: self.tile_height,
        })
    }

    /// Load-time validation of tile records and Wang sets
    pub fn validate(&self) -> Result<(), CoreError> {
        for (&key, tile) in &self.tiles {
            self.check_tile(key)?;
            if tile.id != key {
                return Err(CoreError::Parse(format!(
                    "tile record keyed {key} carries id {}",
                    tile.id
                )));
            }
            if let Some(probability) = tile.probability {
                check_probability(probability, || format!("tile {key}"))?;
            }
        }
        let mut names = HashSet::new();
        for set in &self.wang_sets {
            if !names.insert(set.name.as_str()) {
                return Err(CoreError::DuplicateWangSet(set.name.clone()));
            }
            set.validate(self.tile_count)?;
        }
        Ok(())
    }
}

pub(crate) fn check_probability(
    probability: f32,
    owner: impl FnOnce() -> String,
) -> Result<(), CoreError> {
    if probability.is_finite() && probability >= 0.0 {
        Ok(())
    } else {
        Err(CoreError::InvalidProbability {
            owner: owner(),
            probability,
        })
    }
}
