//! Runtime configuration
//!
//! Loaded from TOML; every field is optional:
//!
//! ```toml
//! chunk_size = 32
//! layer_name = "Ground"
//! wang_set = "Float"
//!
//! [autotile]
//! fallback = "blank_tile"
//! variants = { weighted = { seed = 7 } }
//!
//! [collision]
//! merge = true
//!
//! [collision.layer_materials.LADDERS]
//! sensor = true
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use tessera_autotile::AutotileConfig;
use tessera_collision::CollisionConfig;

use crate::RuntimeError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Chunk edge length in cells
    pub chunk_size: u32,
    /// Name given to chunk tile layers; selects the collision layer material
    pub layer_name: String,
    /// Wang set used when re-resolving after chunk loads and tileset reloads.
    /// `None` uses the tileset's first set.
    pub wang_set: Option<String>,
    pub autotile: AutotileConfig,
    pub collision: CollisionConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            chunk_size: 32,
            layer_name: "Ground".to_string(),
            wang_set: None,
            autotile: AutotileConfig::default(),
            collision: CollisionConfig::default(),
        }
    }
}

impl RuntimeConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, RuntimeError> {
        let config: RuntimeConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, RuntimeError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    pub fn validate(&self) -> Result<(), RuntimeError> {
        if self.chunk_size == 0 {
            return Err(RuntimeError::InvalidConfig(
                "chunk_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn with_chunk_size(mut self, chunk_size: u32) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_wang_set(mut self, wang_set: impl Into<String>) -> Self {
        self.wang_set = Some(wang_set.into());
        self
    }

    pub fn with_autotile(mut self, autotile: AutotileConfig) -> Self {
        self.autotile = autotile;
        self
    }

    pub fn with_collision(mut self, collision: CollisionConfig) -> Self {
        self.collision = collision;
        self
    }
}
