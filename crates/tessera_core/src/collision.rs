//! Collision data structures for tiles
//!
//! This module provides the per-tile collision types read by the extractor:
//! - `Shape` - Rectangle or polygon in local tile pixels (Tiled top-left anchor)
//! - `CollisionObject` - One shape plus its collision material
//! - `ObjectGroup` - The collision shapes attached to a tile definition
//! - `CollisionMaterial` - Layer, mask, one-way direction and sensor flag

use serde::{Deserialize, Serialize};

/// Collision shape in local tile coordinates
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Shape {
    /// Axis-aligned rectangle, `(x, y)` is its top-left corner
    Rectangle {
        #[serde(default)]
        x: f32,
        #[serde(default)]
        y: f32,
        width: f32,
        height: f32,
    },
    /// Closed polygon, `points` are relative to the anchor `(x, y)`
    Polygon {
        #[serde(default)]
        x: f32,
        #[serde(default)]
        y: f32,
        points: Vec<[f32; 2]>,
    },
}

impl Shape {
    /// Create a rectangle shape
    pub fn rectangle(x: f32, y: f32, width: f32, height: f32) -> Self {
        Shape::Rectangle {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a polygon shape from an anchor and anchor-relative points
    pub fn polygon(anchor: [f32; 2], points: Vec<[f32; 2]>) -> Self {
        Shape::Polygon {
            x: anchor[0],
            y: anchor[1],
            points,
        }
    }

    /// Get the display name of this shape type
    pub fn name(&self) -> &'static str {
        match self {
            Shape::Rectangle { .. } => "Rectangle",
            Shape::Polygon { .. } => "Polygon",
        }
    }

    /// Outline in tile-local coordinates (anchor applied)
    ///
    /// Rectangles are listed top-left, top-right, bottom-right, bottom-left.
    pub fn outline(&self) -> Vec<[f32; 2]> {
        match self {
            Shape::Rectangle {
                x,
                y,
                width,
                height,
            } => vec![
                [*x, *y],
                [x + width, *y],
                [x + width, y + height],
                [*x, y + height],
            ],
            Shape::Polygon { x, y, points } => {
                points.iter().map(|p| [x + p[0], y + p[1]]).collect()
            }
        }
    }

    /// Shoelace signed area of the outline
    pub fn signed_area(&self) -> f32 {
        match self {
            Shape::Rectangle { width, height, .. } => width * height,
            Shape::Polygon { points, .. } => {
                let n = points.len();
                if n < 3 {
                    return 0.0;
                }
                let twice: f32 = (0..n)
                    .map(|i| {
                        let a = points[i];
                        let b = points[(i + 1) % n];
                        a[0] * b[1] - b[0] * a[1]
                    })
                    .sum();
                twice * 0.5
            }
        }
    }

    /// Whether this shape encloses no area worth colliding with
    pub fn is_degenerate(&self, min_area: f32) -> bool {
        match self {
            Shape::Rectangle { width, height, .. } => {
                *width <= 0.0 || *height <= 0.0 || width * height < min_area
            }
            Shape::Polygon { .. } => self.signed_area().abs() < min_area.max(f32::EPSILON),
        }
    }

    /// Axis-aligned bounds as `(min, max)`, `None` for an empty polygon
    pub fn bounds(&self) -> Option<([f32; 2], [f32; 2])> {
        let outline = self.outline();
        let first = *outline.first()?;
        Some(outline.iter().fold((first, first), |(min, max), p| {
            (
                [min[0].min(p[0]), min[1].min(p[1])],
                [max[0].max(p[0]), max[1].max(p[1])],
            )
        }))
    }
}

/// Direction for one-way platforms
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum OneWayDirection {
    /// No one-way behavior (solid from all sides)
    #[default]
    None,
    /// Pass through from below (standard platformer)
    Top,
    /// Pass through from above
    Bottom,
    /// Pass through from right
    Left,
    /// Pass through from left
    Right,
}

impl OneWayDirection {
    /// Check if this is a one-way platform
    pub fn is_one_way(&self) -> bool {
        !matches!(self, OneWayDirection::None)
    }
}

/// Collision category of a shape. Colliders only merge when their materials match.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct CollisionMaterial {
    /// Collision layer (0-31)
    #[serde(default)]
    pub layer: u8,
    /// Collision mask (which layers to collide with)
    #[serde(default = "default_mask")]
    pub mask: u32,
    /// One-way platform direction (None = solid from all sides)
    #[serde(default)]
    pub one_way: OneWayDirection,
    /// Sensors report overlaps but never block movement (ladders, triggers)
    #[serde(default)]
    pub sensor: bool,
}

fn default_mask() -> u32 {
    0xFFFFFFFF
}

impl Default for CollisionMaterial {
    fn default() -> Self {
        Self {
            layer: 0,
            mask: default_mask(),
            one_way: OneWayDirection::None,
            sensor: false,
        }
    }
}

impl CollisionMaterial {
    /// Membership bits for this material's layer
    pub fn membership(&self) -> u32 {
        1u32 << (self.layer & 31)
    }

    pub fn with_layer(mut self, layer: u8) -> Self {
        self.layer = layer;
        self
    }

    pub fn with_mask(mut self, mask: u32) -> Self {
        self.mask = mask;
        self
    }

    pub fn with_one_way(mut self, one_way: OneWayDirection) -> Self {
        self.one_way = one_way;
        self
    }

    pub fn with_sensor(mut self, sensor: bool) -> Self {
        self.sensor = sensor;
        self
    }
}

/// A single collision shape attached to a tile
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CollisionObject {
    pub id: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub shape: Shape,
    #[serde(default)]
    pub material: CollisionMaterial,
}

impl CollisionObject {
    pub fn new(id: u32, shape: Shape) -> Self {
        Self {
            id,
            name: None,
            shape,
            material: CollisionMaterial::default(),
        }
    }

    pub fn with_material(mut self, material: CollisionMaterial) -> Self {
        self.material = material;
        self
    }
}

/// Collision shapes of one tile definition
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ObjectGroup {
    #[serde(default)]
    pub id: u32,
    #[serde(default)]
    pub objects: Vec<CollisionObject>,
}

impl ObjectGroup {
    pub fn new(objects: Vec<CollisionObject>) -> Self {
        Self { id: 0, objects }
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rectangle_outline_and_area() {
        let shape = Shape::rectangle(0.0, 7.0, 16.0, 9.0);
        assert_eq!(
            shape.outline(),
            vec![[0.0, 7.0], [16.0, 7.0], [16.0, 16.0], [0.0, 16.0]]
        );
        assert_eq!(shape.signed_area(), 144.0);
        assert!(!shape.is_degenerate(0.0));
    }

    #[test]
    fn test_polygon_outline_applies_anchor() {
        // Slope tile from main.tsx: anchor at the bottom-left corner
        let shape = Shape::polygon([0.0, 16.0], vec![[0.0, 0.0], [16.0, -16.0], [16.0, 0.0]]);
        assert_eq!(
            shape.outline(),
            vec![[0.0, 16.0], [16.0, 0.0], [16.0, 16.0]]
        );
        assert_eq!(shape.signed_area().abs(), 128.0);
    }

    #[test]
    fn test_degenerate_shapes() {
        assert!(Shape::rectangle(0.0, 0.0, 0.0, 16.0).is_degenerate(0.0));
        assert!(Shape::rectangle(0.0, 0.0, -4.0, 16.0).is_degenerate(0.0));
        let collinear = Shape::polygon([0.0, 0.0], vec![[0.0, 0.0], [8.0, 8.0], [16.0, 16.0]]);
        assert!(collinear.is_degenerate(0.0));
        let single = Shape::polygon([0.0, 0.0], vec![[4.0, 4.0]]);
        assert!(single.is_degenerate(0.0));
    }

    #[test]
    fn test_material_defaults() {
        let material = CollisionMaterial::default();
        assert_eq!(material.layer, 0);
        assert_eq!(material.mask, 0xFFFFFFFF);
        assert!(!material.one_way.is_one_way());
        assert_eq!(material.with_layer(3).membership(), 0b1000);
    }

    #[test]
    fn test_shape_serialization() {
        let shape = Shape::polygon([0.0, 4.0], vec![[0.0, 0.0], [16.0, 8.0], [16.0, 12.0]]);
        let json = serde_json::to_string(&shape).unwrap();
        assert!(json.contains("\"type\":\"Polygon\""));
        let parsed: Shape = serde_json::from_str(&json).unwrap();
        assert_eq!(shape, parsed);
    }
}
