//! Avian2D integration
//!
//! Colliders are in y-down map pixels; Avian bodies live in Bevy's y-up
//! world, so every point is mirrored on the x axis. Each converted collider
//! is centered on its bounds and paired with the translation to spawn it at.
//! Concave outlines are decomposed into convex parts so they stay solid.

use crate::collider::{Collider as MapCollider, ColliderShape};
use avian2d::prelude::*;
use bevy::prelude::*;
use tessera_core::CollisionMaterial;

/// Convert a collider into an Avian collider plus its world translation.
/// `Empty` colliders have no physical counterpart.
pub fn to_avian(collider: &MapCollider) -> Option<(Vec2, Collider)> {
    let (min, max) = collider.shape.bounds()?;
    let center = Vec2::new((min[0] + max[0]) * 0.5, -(min[1] + max[1]) * 0.5);

    match &collider.shape {
        ColliderShape::Rectangle { min, max } => Some((
            center,
            Collider::rectangle(max[0] - min[0], max[1] - min[1]),
        )),
        ColliderShape::Polygon { vertices } => {
            let points: Vec<Vec2> = vertices
                .iter()
                .map(|v| Vec2::new(v[0], -v[1]) - center)
                .collect();
            if is_convex(&points) {
                Collider::convex_hull(points).map(|hull| (center, hull))
            } else {
                let n = points.len() as u32;
                let indices = (0..n).map(|i| [i, (i + 1) % n]).collect();
                Some((center, Collider::convex_decomposition(points, indices)))
            }
        }
        ColliderShape::Empty => None,
    }
}

/// Membership and filter bits for a material
pub fn collision_layers(material: &CollisionMaterial) -> CollisionLayers {
    CollisionLayers::from_bits(material.membership(), material.mask)
}

fn is_convex(points: &[Vec2]) -> bool {
    let n = points.len();
    if n < 3 {
        return false;
    }
    let mut sign = 0.0f32;
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        let c = points[(i + 2) % n];
        let cross = (b - a).perp_dot(c - b);
        if cross.abs() <= f32::EPSILON {
            continue;
        }
        if sign == 0.0 {
            sign = cross.signum();
        } else if cross.signum() != sign {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collider(shape: ColliderShape) -> MapCollider {
        MapCollider::new(shape, CollisionMaterial::default(), (0, 0))
    }

    #[test]
    fn test_rectangle_is_centered_and_mirrored() {
        let rect = collider(ColliderShape::Rectangle {
            min: [16.0, 32.0],
            max: [48.0, 48.0],
        });
        let (translation, converted) = to_avian(&rect).unwrap();
        assert_eq!(translation, Vec2::new(32.0, -40.0));
        assert!(converted.shape().as_cuboid().is_some());
    }

    #[test]
    fn test_empty_has_no_collider() {
        assert!(to_avian(&collider(ColliderShape::Empty)).is_none());
    }

    #[test]
    fn test_convexity() {
        let square = [
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(0.0, 1.0),
        ];
        assert!(is_convex(&square));
        let l_shape = [
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(2.0, 1.0),
            Vec2::new(2.0, 2.0),
            Vec2::new(0.0, 2.0),
        ];
        assert!(!is_convex(&l_shape));
    }

    #[test]
    fn test_concave_polygon_converts() {
        let l_shape = collider(ColliderShape::Polygon {
            vertices: vec![
                [0.0, 0.0],
                [16.0, 0.0],
                [16.0, 16.0],
                [32.0, 16.0],
                [32.0, 32.0],
                [0.0, 32.0],
            ],
        });
        let (translation, converted) = to_avian(&l_shape).unwrap();
        assert_eq!(translation, Vec2::new(16.0, -16.0));
        // Solid convex parts, not a hollow edge chain
        let parts = converted.shape().as_compound().unwrap();
        assert!(parts.shapes().len() >= 2);
        assert!(converted.shape().as_polyline().is_none());
    }
}
