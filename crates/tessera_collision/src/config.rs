//! Collision extraction settings

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tessera_core::CollisionMaterial;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionConfig {
    /// Merge colliders that share edges into single outlines
    pub merge: bool,
    /// Shapes enclosing less area (square pixels) are degenerate
    pub min_area: f32,
    /// Material forced onto every shape of a layer, by layer name
    /// (e.g. `LADDERS` as sensors, `PLATFORMS` as one-way)
    pub layer_materials: BTreeMap<String, CollisionMaterial>,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            merge: true,
            min_area: 0.0,
            layer_materials: BTreeMap::new(),
        }
    }
}

impl CollisionConfig {
    pub fn with_merge(mut self, merge: bool) -> Self {
        self.merge = merge;
        self
    }

    pub fn with_min_area(mut self, min_area: f32) -> Self {
        self.min_area = min_area;
        self
    }

    pub fn with_layer_material(
        mut self,
        layer: impl Into<String>,
        material: CollisionMaterial,
    ) -> Self {
        self.layer_materials.insert(layer.into(), material);
        self
    }

    pub fn layer_material(&self, layer: &str) -> Option<CollisionMaterial> {
        self.layer_materials.get(layer).copied()
    }
}
