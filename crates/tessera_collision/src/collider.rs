//! World-space colliders and the per-chunk collider set

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tessera_core::{CollisionMaterial, OneWayDirection};

/// Quantization step for comparing vertices: 1/1000 pixel
pub(crate) const QUANTUM: f32 = 1000.0;

pub(crate) fn quantize(point: [f32; 2]) -> (i64, i64) {
    (
        (point[0] * QUANTUM).round() as i64,
        (point[1] * QUANTUM).round() as i64,
    )
}

pub(crate) fn dequantize(point: (i64, i64)) -> [f32; 2] {
    [point.0 as f32 / QUANTUM, point.1 as f32 / QUANTUM]
}

/// Sort key for materials, which carry no ordering of their own
pub(crate) fn material_key(material: &CollisionMaterial) -> (u8, u32, u8, bool) {
    let one_way = match material.one_way {
        OneWayDirection::None => 0,
        OneWayDirection::Top => 1,
        OneWayDirection::Bottom => 2,
        OneWayDirection::Left => 3,
        OneWayDirection::Right => 4,
    };
    (material.layer, material.mask, one_way, material.sensor)
}

/// World-space collision geometry (pixels, y-down)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ColliderShape {
    Rectangle { min: [f32; 2], max: [f32; 2] },
    /// Closed outline with positive shoelace area
    Polygon { vertices: Vec<[f32; 2]> },
    /// Placeholder for a degenerate source shape
    Empty,
}

impl ColliderShape {
    /// Outline vertices; rectangles as min, (max x, min y), max, (min x, max y)
    pub fn outline(&self) -> Vec<[f32; 2]> {
        match self {
            ColliderShape::Rectangle { min, max } => {
                vec![*min, [max[0], min[1]], *max, [min[0], max[1]]]
            }
            ColliderShape::Polygon { vertices } => vertices.clone(),
            ColliderShape::Empty => Vec::new(),
        }
    }

    pub fn area(&self) -> f32 {
        match self {
            ColliderShape::Rectangle { min, max } => (max[0] - min[0]) * (max[1] - min[1]),
            ColliderShape::Polygon { vertices } => signed_area(vertices).abs(),
            ColliderShape::Empty => 0.0,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, ColliderShape::Empty)
    }

    /// Axis-aligned bounds as `(min, max)`
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

    pub fn translated(&self, dx: f32, dy: f32) -> Self {
        match self {
            ColliderShape::Rectangle { min, max } => ColliderShape::Rectangle {
                min: [min[0] + dx, min[1] + dy],
                max: [max[0] + dx, max[1] + dy],
            },
            ColliderShape::Polygon { vertices } => ColliderShape::Polygon {
                vertices: vertices.iter().map(|v| [v[0] + dx, v[1] + dy]).collect(),
            },
            ColliderShape::Empty => ColliderShape::Empty,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ColliderShape::Rectangle { .. } => "Rectangle",
            ColliderShape::Polygon { .. } => "Polygon",
            ColliderShape::Empty => "Empty",
        }
    }
}

/// Shoelace signed area
pub fn signed_area(vertices: &[[f32; 2]]) -> f32 {
    let n = vertices.len();
    if n < 3 {
        return 0.0;
    }
    let twice: f32 = (0..n)
        .map(|i| {
            let a = vertices[i];
            let b = vertices[(i + 1) % n];
            a[0] * b[1] - b[0] * a[1]
        })
        .sum();
    twice * 0.5
}

/// A collider produced from one or more placed tiles
#[cfg_attr(feature = "bevy", derive(bevy::prelude::Component))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collider {
    pub shape: ColliderShape,
    pub material: CollisionMaterial,
    /// Cells whose tiles contributed to this collider, sorted
    pub cells: Vec<(i32, i32)>,
}

impl Collider {
    pub fn new(shape: ColliderShape, material: CollisionMaterial, cell: (i32, i32)) -> Self {
        Self {
            shape,
            material,
            cells: vec![cell],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.shape.is_empty()
    }

    /// Exact identity used to keep ids stable across regenerations
    fn key(&self) -> ColliderKey {
        let shape = match &self.shape {
            ColliderShape::Rectangle { .. } => 0,
            ColliderShape::Polygon { .. } => 1,
            ColliderShape::Empty => 2,
        };
        ColliderKey {
            shape,
            outline: self.shape.outline().into_iter().map(quantize).collect(),
            material: self.material,
            cells: self.cells.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ColliderKey {
    shape: u8,
    outline: Vec<(i64, i64)>,
    material: CollisionMaterial,
    cells: Vec<(i32, i32)>,
}

/// Stable handle of a collider inside a `ColliderSet`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ColliderId(pub u64);

/// Colliders to add and remove after a regeneration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColliderDelta {
    pub added: Vec<(ColliderId, Collider)>,
    pub removed: Vec<ColliderId>,
}

impl ColliderDelta {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }

    pub fn extend(&mut self, other: ColliderDelta) {
        self.added.extend(other.added);
        self.removed.extend(other.removed);
    }
}

/// The published colliders of one owner (a chunk), with stable ids
#[derive(Debug, Clone, Default)]
pub struct ColliderSet {
    next_id: u64,
    colliders: BTreeMap<ColliderId, Collider>,
}

impl ColliderSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.colliders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colliders.is_empty()
    }

    pub fn get(&self, id: ColliderId) -> Option<&Collider> {
        self.colliders.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ColliderId, &Collider)> {
        self.colliders.iter().map(|(&id, c)| (id, c))
    }

    /// Replace the contents with `colliders`. Colliders equal to one already
    /// published keep their id; only the difference is reported.
    pub fn sync(&mut self, colliders: Vec<Collider>) -> ColliderDelta {
        let mut existing: HashMap<ColliderKey, Vec<ColliderId>> = HashMap::new();
        for (&id, collider) in &self.colliders {
            existing.entry(collider.key()).or_default().push(id);
        }

        let mut kept = BTreeMap::new();
        let mut delta = ColliderDelta::default();
        for collider in colliders {
            let reused = existing.get_mut(&collider.key()).and_then(|ids| ids.pop());
            match reused {
                Some(id) => {
                    kept.insert(id, collider);
                }
                None => {
                    let id = ColliderId(self.next_id);
                    self.next_id += 1;
                    delta.added.push((id, collider.clone()));
                    kept.insert(id, collider);
                }
            }
        }

        delta.removed = self
            .colliders
            .keys()
            .filter(|id| !kept.contains_key(id))
            .copied()
            .collect();
        self.colliders = kept;
        delta
    }

    /// Remove everything, reporting the removals
    pub fn clear(&mut self) -> ColliderDelta {
        let removed = self.colliders.keys().copied().collect();
        self.colliders.clear();
        ColliderDelta {
            added: Vec::new(),
            removed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x: f32, y: f32) -> Collider {
        Collider::new(
            ColliderShape::Rectangle {
                min: [x, y],
                max: [x + 16.0, y + 16.0],
            },
            CollisionMaterial::default(),
            ((x / 16.0) as i32, (y / 16.0) as i32),
        )
    }

    #[test]
    fn test_rectangle_outline_has_positive_area() {
        let shape = square(0.0, 0.0).shape;
        assert_eq!(shape.area(), 256.0);
        assert!(signed_area(&shape.outline()) > 0.0);
        assert_eq!(shape.bounds(), Some(([0.0, 0.0], [16.0, 16.0])));
        assert_eq!(ColliderShape::Empty.bounds(), None);
    }

    #[test]
    fn test_sync_keeps_unchanged_ids() {
        let mut set = ColliderSet::new();
        let first = set.sync(vec![square(0.0, 0.0), square(16.0, 0.0)]);
        assert_eq!(first.added.len(), 2);
        assert!(first.removed.is_empty());
        let kept_id = first.added[0].0;

        let second = set.sync(vec![square(0.0, 0.0), square(32.0, 0.0)]);
        assert_eq!(second.added.len(), 1);
        assert_eq!(second.removed, vec![first.added[1].0]);
        assert_eq!(set.get(kept_id), Some(&square(0.0, 0.0)));
        assert_eq!(set.len(), 2);

        assert!(set.sync(vec![square(32.0, 0.0), square(0.0, 0.0)]).is_empty());
    }

    #[test]
    fn test_sync_handles_duplicates() {
        let mut set = ColliderSet::new();
        set.sync(vec![square(0.0, 0.0), square(0.0, 0.0)]);
        let delta = set.sync(vec![square(0.0, 0.0)]);
        assert!(delta.added.is_empty());
        assert_eq!(delta.removed.len(), 1);
    }

    #[test]
    fn test_clear_reports_every_id() {
        let mut set = ColliderSet::new();
        let added = set.sync(vec![square(0.0, 0.0), square(16.0, 0.0)]);
        let delta = set.clear();
        let mut ids: Vec<_> = added.added.iter().map(|(id, _)| *id).collect();
        ids.sort();
        assert_eq!(delta.removed, ids);
        assert!(set.is_empty());
    }
}
