//! Collider extraction from placed tiles
//!
//! Each collision object of a tile is mapped through the instance transform
//! into world space. Rectangles stay axis-aligned; polygons keep their
//! winding. Shapes that enclose no area become `ColliderShape::Empty` and are
//! reported in `Extraction::issues` instead of failing the tile.

use crate::collider::{quantize, signed_area, Collider, ColliderShape};
use crate::merge::merge_colliders;
use crate::transform::{TileInstance, TileTransform};
use crate::{CollisionConfig, CollisionError};
use tessera_core::{CollisionMaterial, Shape, TileLayer, Tileset};
use tracing::debug;

/// Colliders for one or more instances, plus the shapes that degenerated
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    pub colliders: Vec<Collider>,
    pub issues: Vec<CollisionError>,
}

impl Extraction {
    pub fn extend(&mut self, other: Extraction) {
        self.colliders.extend(other.colliders);
        self.issues.extend(other.issues);
    }
}

/// Extract the world-space colliders of a single placed tile
pub fn extract(
    tileset: &Tileset,
    instance: &TileInstance,
    config: &CollisionConfig,
) -> Result<Extraction, CollisionError> {
    extract_instance(tileset, instance, config, None)
}

/// Extract every occupied cell of a layer, merging when configured.
/// `cell_offset` is the world cell of the layer's `(0, 0)`.
pub fn extract_layer(
    tileset: &Tileset,
    layer: &TileLayer,
    cell_offset: (i32, i32),
    config: &CollisionConfig,
) -> Result<Extraction, CollisionError> {
    let material = config.layer_material(&layer.name);
    let mut extraction = Extraction::default();
    for (x, y, packed) in layer.occupied() {
        let instance = TileInstance::at_cell(
            packed,
            cell_offset.0 + x,
            cell_offset.1 + y,
            tileset.tile_width,
            tileset.tile_height,
        );
        extraction.extend(extract_instance(tileset, &instance, config, material)?);
    }
    if config.merge {
        extraction.colliders = merge_colliders(extraction.colliders);
    }
    Ok(extraction)
}

fn extract_instance(
    tileset: &Tileset,
    instance: &TileInstance,
    config: &CollisionConfig,
    material: Option<CollisionMaterial>,
) -> Result<Extraction, CollisionError> {
    let tile = instance.tile_id();
    let objects = tileset.collision_objects(tile)?;
    let transform = TileTransform::from_packed(
        instance.tile,
        tileset.tile_width as f32,
        tileset.tile_height as f32,
    );

    let mut extraction = Extraction::default();
    for object in objects {
        let material = material.unwrap_or(object.material);
        let shape = match world_shape(&object.shape, &transform, instance.origin, config.min_area) {
            Some(shape) => shape,
            None => {
                debug!(
                    tile,
                    object = object.id,
                    cell = ?instance.cell,
                    "degenerate collision shape"
                );
                extraction.issues.push(CollisionError::DegenerateShape {
                    tile,
                    object: object.id,
                });
                ColliderShape::Empty
            }
        };
        extraction
            .colliders
            .push(Collider::new(shape, material, instance.cell));
    }
    Ok(extraction)
}

/// World-space shape, `None` when degenerate
fn world_shape(
    shape: &Shape,
    transform: &TileTransform,
    origin: [f32; 2],
    min_area: f32,
) -> Option<ColliderShape> {
    let place = |p: [f32; 2]| {
        let [x, y] = transform.apply(p);
        [x + origin[0], y + origin[1]]
    };

    match shape {
        Shape::Rectangle { width, height, .. } => {
            // Also rejects NaN extents
            if !(*width > 0.0 && *height > 0.0) {
                return None;
            }
            let corners: Vec<[f32; 2]> = shape.outline().into_iter().map(place).collect();
            let (min, max) = corners.iter().skip(1).fold(
                (corners[0], corners[0]),
                |(min, max), p| {
                    (
                        [min[0].min(p[0]), min[1].min(p[1])],
                        [max[0].max(p[0]), max[1].max(p[1])],
                    )
                },
            );
            let rect = ColliderShape::Rectangle { min, max };
            (rect.area() >= min_area).then_some(rect)
        }
        Shape::Polygon { .. } => {
            let mut vertices: Vec<[f32; 2]> = shape.outline().into_iter().map(place).collect();
            if transform.is_reflection() {
                vertices.reverse();
            }
            vertices.dedup_by(|a, b| quantize(*a) == quantize(*b));
            while vertices.len() > 1
                && vertices.first().map(|v| quantize(*v)) == vertices.last().map(|v| quantize(*v))
            {
                vertices.pop();
            }
            if vertices.len() < 3 || signed_area(&vertices).abs() < min_area.max(f32::EPSILON) {
                return None;
            }
            Some(ColliderShape::Polygon { vertices })
        }
    }
}
