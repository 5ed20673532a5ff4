//! Manifold-edge merging
//!
//! Colliders of the same material that share edges are fused into a single
//! outline:
//! 1. outlines are quantized and oriented to positive area
//! 2. edges are split wherever another outline's vertex lies on them
//! 3. directed edges that appear with opposite orientation cancel, and the
//!    colliders that owned them join one component
//! 4. the surviving edges of a component are traced into loops, taking the
//!    leftmost turn at shared vertices
//!
//! A component that traces to exactly one loop becomes one collider. A
//! component with holes or pinches keeps its original colliders. The output is
//! sorted, so it does not depend on input order.

use crate::collider::{dequantize, material_key, quantize, Collider, ColliderShape};
use std::collections::{BTreeSet, HashMap, HashSet};
use tessera_core::CollisionMaterial;

type Point = (i64, i64);
type Edge = (Point, Point);

/// Merge edge-sharing colliders; empty colliders pass through untouched
pub fn merge_colliders(colliders: Vec<Collider>) -> Vec<Collider> {
    let mut merged = Vec::with_capacity(colliders.len());
    let mut groups: HashMap<CollisionMaterial, Vec<Collider>> = HashMap::new();
    for collider in colliders {
        if collider.is_empty() {
            merged.push(collider);
        } else {
            groups.entry(collider.material).or_default().push(collider);
        }
    }
    for group in groups.into_values() {
        merged.extend(merge_group(group));
    }
    merged.sort_by_cached_key(sort_key);
    merged
}

fn sort_key(collider: &Collider) -> ((u8, u32, u8, bool), Vec<(i32, i32)>, Vec<Point>) {
    (
        material_key(&collider.material),
        collider.cells.clone(),
        collider.shape.outline().into_iter().map(quantize).collect(),
    )
}

fn merge_group(group: Vec<Collider>) -> Vec<Collider> {
    if group.len() < 2 {
        return group;
    }

    let outlines: Vec<Vec<Point>> = group.iter().map(|c| oriented_outline(&c.shape)).collect();
    let vertices: BTreeSet<Point> = outlines.iter().flatten().copied().collect();
    let outlines: Vec<Vec<Point>> = outlines
        .iter()
        .map(|outline| split_edges(outline, &vertices))
        .collect();

    let mut owners: HashMap<Edge, Vec<usize>> = HashMap::new();
    for (i, outline) in outlines.iter().enumerate() {
        for edge in edges(outline) {
            owners.entry(edge).or_default().push(i);
        }
    }

    let mut components = UnionFind::new(group.len());
    for (&(a, b), forward) in &owners {
        if let Some(backward) = owners.get(&(b, a)) {
            for &other in forward.iter().chain(backward) {
                components.union(forward[0], other);
            }
        }
    }

    // Surviving edges per component root
    let mut sorted_edges: Vec<Edge> = owners.keys().copied().collect();
    sorted_edges.sort_unstable();
    let mut boundary: HashMap<usize, Vec<Edge>> = HashMap::new();
    for (a, b) in sorted_edges {
        let forward = &owners[&(a, b)];
        let backward = owners.get(&(b, a)).map_or(0, Vec::len);
        if backward == 0 {
            for &owner in forward {
                boundary
                    .entry(components.find(owner))
                    .or_default()
                    .push((a, b));
            }
        } else if forward.len() > backward {
            let root = components.find(forward[0]);
            for _ in backward..forward.len() {
                boundary.entry(root).or_default().push((a, b));
            }
        }
    }

    let mut members: HashMap<usize, Vec<usize>> = HashMap::new();
    for i in 0..group.len() {
        members.entry(components.find(i)).or_default().push(i);
    }

    let mut slots: Vec<Option<Collider>> = group.into_iter().map(Some).collect();
    let mut result = Vec::new();
    for (root, indices) in members {
        let fused = if indices.len() > 1 {
            let expected: i128 = indices.iter().map(|&i| twice_area(&outlines[i])).sum();
            boundary
                .remove(&root)
                .and_then(trace_single_loop)
                .filter(|outline| twice_area(outline) == expected)
        } else {
            None
        };

        match fused {
            Some(outline) => {
                let mut cells = BTreeSet::new();
                let mut material = None;
                for &i in &indices {
                    if let Some(collider) = slots[i].take() {
                        material = Some(collider.material);
                        cells.extend(collider.cells);
                    }
                }
                if let Some(material) = material {
                    result.push(Collider {
                        shape: outline_to_shape(simplify(outline)),
                        material,
                        cells: cells.into_iter().collect(),
                    });
                }
            }
            None => result.extend(indices.iter().filter_map(|&i| slots[i].take())),
        }
    }
    result
}

/// Quantized outline with consecutive duplicates removed, positive area
fn oriented_outline(shape: &ColliderShape) -> Vec<Point> {
    let mut outline: Vec<Point> = shape.outline().into_iter().map(quantize).collect();
    outline.dedup();
    while outline.len() > 1 && outline.first() == outline.last() {
        outline.pop();
    }
    if outline.len() < 3 || twice_area(&outline) == 0 {
        return Vec::new();
    }
    if twice_area(&outline) < 0 {
        outline.reverse();
    }
    outline
}

fn edges(outline: &[Point]) -> impl Iterator<Item = Edge> + '_ {
    let n = outline.len();
    (0..n).map(move |i| (outline[i], outline[(i + 1) % n]))
}

fn twice_area(outline: &[Point]) -> i128 {
    edges(outline)
        .map(|(a, b)| a.0 as i128 * b.1 as i128 - b.0 as i128 * a.1 as i128)
        .sum()
}

fn cross(o: Point, a: Point, b: Point) -> i128 {
    (a.0 - o.0) as i128 * (b.1 - o.1) as i128 - (a.1 - o.1) as i128 * (b.0 - o.0) as i128
}

fn dot(o: Point, a: Point, b: Point) -> i128 {
    (a.0 - o.0) as i128 * (b.0 - o.0) as i128 + (a.1 - o.1) as i128 * (b.1 - o.1) as i128
}

/// Insert every known vertex that lies strictly inside an edge
fn split_edges(outline: &[Point], vertices: &BTreeSet<Point>) -> Vec<Point> {
    let mut split = Vec::with_capacity(outline.len());
    for (a, b) in edges(outline) {
        split.push(a);
        let (min_x, max_x) = (a.0.min(b.0), a.0.max(b.0));
        let (min_y, max_y) = (a.1.min(b.1), a.1.max(b.1));
        let mut inner: Vec<Point> = vertices
            .range((min_x, i64::MIN)..=(max_x, i64::MAX))
            .copied()
            .filter(|&p| {
                p.1 >= min_y
                    && p.1 <= max_y
                    && p != a
                    && p != b
                    && cross(a, b, p) == 0
                    && dot(a, p, b) > 0
                    && dot(b, p, a) > 0
            })
            .collect();
        inner.sort_by_key(|&p| dot(a, p, b));
        split.extend(inner);
    }
    split
}

/// Trace edges into loops; `None` unless they form exactly one closed loop
fn trace_single_loop(mut edges: Vec<Edge>) -> Option<Vec<Point>> {
    edges.sort_unstable();
    let mut outgoing: HashMap<Point, Vec<usize>> = HashMap::new();
    for (i, (a, _)) in edges.iter().enumerate() {
        outgoing.entry(*a).or_default().push(i);
    }

    let mut used = vec![false; edges.len()];
    let mut traced = None;
    for start in 0..edges.len() {
        if used[start] {
            continue;
        }
        if traced.is_some() {
            // A second loop: hole or pinch
            return None;
        }
        used[start] = true;
        let origin = edges[start].0;
        let (mut previous, mut current) = edges[start];
        let mut outline = vec![origin];
        while current != origin {
            outline.push(current);
            let next = outgoing
                .get(&current)?
                .iter()
                .copied()
                .filter(|&e| !used[e])
                .max_by(|&x, &y| {
                    turn(previous, current, edges[x].1)
                        .total_cmp(&turn(previous, current, edges[y].1))
                        .then(y.cmp(&x))
                })?;
            used[next] = true;
            previous = current;
            current = edges[next].1;
        }
        // A loop through the same vertex twice pinches around a hole
        let distinct: HashSet<Point> = outline.iter().copied().collect();
        if distinct.len() != outline.len() {
            return None;
        }
        traced = Some(outline);
    }
    traced
}

/// Signed turn angle at `at`, positive to the left
fn turn(from: Point, at: Point, to: Point) -> f64 {
    let incoming = ((at.0 - from.0) as f64, (at.1 - from.1) as f64);
    let outgoing = ((to.0 - at.0) as f64, (to.1 - at.1) as f64);
    let cross = incoming.0 * outgoing.1 - incoming.1 * outgoing.0;
    let dot = incoming.0 * outgoing.0 + incoming.1 * outgoing.1;
    cross.atan2(dot)
}

/// Drop collinear vertices and start at the smallest vertex
fn simplify(mut outline: Vec<Point>) -> Vec<Point> {
    loop {
        let n = outline.len();
        if n <= 3 {
            break;
        }
        let kept: Vec<Point> = (0..n)
            .filter(|&i| cross(outline[(i + n - 1) % n], outline[i], outline[(i + 1) % n]) != 0)
            .map(|i| outline[i])
            .collect();
        if kept.len() == n {
            break;
        }
        outline = kept;
    }
    if let Some(start) = outline
        .iter()
        .enumerate()
        .min_by_key(|(_, p)| **p)
        .map(|(i, _)| i)
    {
        outline.rotate_left(start);
    }
    outline
}

fn outline_to_shape(outline: Vec<Point>) -> ColliderShape {
    let axis_aligned = edges(&outline).all(|(a, b)| a.0 == b.0 || a.1 == b.1);
    if outline.len() == 4 && axis_aligned {
        let min = outline.iter().fold((i64::MAX, i64::MAX), |m, p| (m.0.min(p.0), m.1.min(p.1)));
        let max = outline.iter().fold((i64::MIN, i64::MIN), |m, p| (m.0.max(p.0), m.1.max(p.1)));
        return ColliderShape::Rectangle {
            min: dequantize(min),
            max: dequantize(max),
        };
    }
    ColliderShape::Polygon {
        vertices: outline.into_iter().map(dequantize).collect(),
    }
}

struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
        }
    }

    fn find(&mut self, mut i: usize) -> usize {
        while self.parent[i] != i {
            self.parent[i] = self.parent[self.parent[i]];
            i = self.parent[i];
        }
        i
    }

    fn union(&mut self, a: usize, b: usize) {
        let (a, b) = (self.find(a), self.find(b));
        if a != b {
            // Smaller root wins so components are labelled independently of input order
            let (low, high) = (a.min(b), a.max(b));
            self.parent[high] = low;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(x: f32, y: f32, w: f32, h: f32, cell: (i32, i32)) -> Collider {
        Collider::new(
            ColliderShape::Rectangle {
                min: [x, y],
                max: [x + w, y + h],
            },
            CollisionMaterial::default(),
            cell,
        )
    }

    fn unit(x: i32, y: i32) -> Collider {
        rect(x as f32, y as f32, 1.0, 1.0, (x, y))
    }

    #[test]
    fn test_two_squares_merge_to_rectangle() {
        let merged = merge_colliders(vec![unit(0, 0), unit(1, 0)]);
        assert_eq!(merged.len(), 1);
        assert_eq!(
            merged[0].shape,
            ColliderShape::Rectangle {
                min: [0.0, 0.0],
                max: [2.0, 1.0]
            }
        );
        assert_eq!(merged[0].cells, vec![(0, 0), (1, 0)]);
    }

    #[test]
    fn test_merge_order_does_not_matter() {
        let cells = [(0, 0), (1, 0), (2, 0), (0, 1), (2, 1), (5, 5), (6, 5)];
        let forward: Vec<Collider> = cells.iter().map(|&(x, y)| unit(x, y)).collect();
        let expected = merge_colliders(forward.clone());
        for shift in 1..forward.len() {
            let mut rotated = forward.clone();
            rotated.rotate_left(shift);
            assert_eq!(merge_colliders(rotated), expected);
        }
        let mut reversed = forward;
        reversed.reverse();
        assert_eq!(merge_colliders(reversed), expected);
        // U shape plus a separate domino
        assert_eq!(expected.len(), 2);
    }

    #[test]
    fn test_l_shape_becomes_polygon() {
        let merged = merge_colliders(vec![unit(0, 0), unit(0, 1), unit(1, 1)]);
        assert_eq!(merged.len(), 1);
        assert_eq!(
            merged[0].shape,
            ColliderShape::Polygon {
                vertices: vec![
                    [0.0, 0.0],
                    [1.0, 0.0],
                    [1.0, 1.0],
                    [2.0, 1.0],
                    [2.0, 2.0],
                    [0.0, 2.0],
                ]
            }
        );
    }

    #[test]
    fn test_slope_and_block_merge() {
        // Tile 69 slope next to a full block
        let slope = Collider::new(
            ColliderShape::Polygon {
                vertices: vec![[0.0, 16.0], [16.0, 0.0], [16.0, 16.0]],
            },
            CollisionMaterial::default(),
            (0, 0),
        );
        let merged = merge_colliders(vec![rect(16.0, 0.0, 16.0, 16.0, (1, 0)), slope]);
        assert_eq!(merged.len(), 1);
        assert_eq!(
            merged[0].shape,
            ColliderShape::Polygon {
                vertices: vec![[0.0, 16.0], [16.0, 0.0], [32.0, 0.0], [32.0, 16.0]]
            }
        );
    }

    #[test]
    fn test_t_junction_is_split() {
        let wide = rect(0.0, 0.0, 2.0, 1.0, (0, 0));
        let merged = merge_colliders(vec![wide, unit(0, 1), unit(1, 1)]);
        assert_eq!(merged.len(), 1);
        assert_eq!(
            merged[0].shape,
            ColliderShape::Rectangle {
                min: [0.0, 0.0],
                max: [2.0, 2.0]
            }
        );
    }

    #[test]
    fn test_ring_keeps_originals() {
        let mut ring = Vec::new();
        for y in 0..3 {
            for x in 0..3 {
                if (x, y) != (1, 1) {
                    ring.push(unit(x, y));
                }
            }
        }
        let merged = merge_colliders(ring.clone());
        assert_eq!(merged.len(), 8);
        for collider in &ring {
            assert!(merged.contains(collider));
        }
    }

    #[test]
    fn test_pinched_ring_keeps_originals() {
        // Ring around (1, 1) with the (0, 0) corner missing: the hole touches
        // the outer boundary at a single vertex
        let mut ring = Vec::new();
        for y in 0..3 {
            for x in 0..3 {
                if (x, y) != (1, 1) && (x, y) != (0, 0) {
                    ring.push(unit(x, y));
                }
            }
        }
        let merged = merge_colliders(ring.clone());
        assert_eq!(merged.len(), 7);
        for collider in &ring {
            assert!(merged.contains(collider));
        }
    }

    #[test]
    fn test_corner_contact_does_not_merge() {
        let merged = merge_colliders(vec![unit(0, 0), unit(1, 1)]);
        assert_eq!(merged, vec![unit(0, 0), unit(1, 1)]);
    }

    #[test]
    fn test_materials_do_not_mix() {
        let sensor = CollisionMaterial::default().with_sensor(true);
        let mut ladder = unit(1, 0);
        ladder.material = sensor;
        let merged = merge_colliders(vec![unit(0, 0), ladder.clone(), unit(0, 1)]);
        assert_eq!(merged.len(), 2);
        assert!(merged.contains(&ladder));
        assert!(merged.iter().any(|c| c.shape
            == ColliderShape::Rectangle {
                min: [0.0, 0.0],
                max: [1.0, 2.0]
            }));
    }

    #[test]
    fn test_empty_colliders_pass_through() {
        let empty = Collider::new(ColliderShape::Empty, CollisionMaterial::default(), (3, 3));
        let merged = merge_colliders(vec![unit(0, 0), empty.clone(), unit(1, 0)]);
        assert_eq!(merged.len(), 2);
        assert!(merged.contains(&empty));
    }

    #[test]
    fn test_overlapping_colliders_stay_separate() {
        let a = rect(0.0, 0.0, 2.0, 2.0, (0, 0));
        let b = rect(1.0, 1.0, 2.0, 2.0, (1, 1));
        assert_eq!(merge_colliders(vec![b.clone(), a.clone()]), vec![a, b]);
    }
}
