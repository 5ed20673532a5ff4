//! Edit requests and their results

use serde::{Deserialize, Serialize};
use tessera_autotile::{PaintRegion, PaintReport, TerrainBrush};
use tessera_collision::{ColliderDelta, CollisionError};
use tessera_core::WangColorIndex;

use crate::chunk::ChunkCoord;

/// Paint `color` of `wang_set` over `region` (map cells)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaintRequest {
    pub wang_set: String,
    pub region: PaintRegion,
    pub color: WangColorIndex,
}

impl PaintRequest {
    pub fn new(wang_set: impl Into<String>, region: PaintRegion, color: WangColorIndex) -> Self {
        Self {
            wang_set: wang_set.into(),
            region,
            color,
        }
    }

    /// Request for the brush's current selection, `None` when the brush is idle
    pub fn from_brush(brush: &TerrainBrush, region: PaintRegion) -> Option<Self> {
        let (wang_set, color) = brush.selection()?;
        Some(Self::new(wang_set, region, color))
    }
}

/// What an edit changed: tiles, per-chunk collider deltas and the collision
/// shapes that degenerated during regeneration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditOutcome {
    pub sequence: u64,
    pub report: PaintReport,
    pub colliders: Vec<(ChunkCoord, ColliderDelta)>,
    pub issues: Vec<CollisionError>,
}

impl EditOutcome {
    pub fn new(sequence: u64) -> Self {
        Self {
            sequence,
            ..Default::default()
        }
    }

    pub fn extend(&mut self, other: EditOutcome) {
        self.sequence = self.sequence.max(other.sequence);
        self.report.extend(other.report);
        for (coord, delta) in other.colliders {
            match self.colliders.iter_mut().find(|(c, _)| *c == coord) {
                Some((_, existing)) => existing.extend(delta),
                None => self.colliders.push((coord, delta)),
            }
        }
        self.issues.extend(other.issues);
    }

    /// Collider delta published for one chunk
    pub fn delta(&self, coord: ChunkCoord) -> Option<&ColliderDelta> {
        self.colliders
            .iter()
            .find(|(c, _)| *c == coord)
            .map(|(_, delta)| delta)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PaintResult {
    Applied(EditOutcome),
    /// A newer edit had already written one of the paint's chunks; nothing
    /// was written
    Superseded { sequence: u64, newer: u64 },
}

impl PaintResult {
    pub fn applied(&self) -> Option<&EditOutcome> {
        match self {
            PaintResult::Applied(outcome) => Some(outcome),
            PaintResult::Superseded { .. } => None,
        }
    }

    pub fn is_superseded(&self) -> bool {
        matches!(self, PaintResult::Superseded { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_collision::ColliderId;

    #[test]
    fn test_request_from_brush() {
        let mut brush = TerrainBrush::new();
        assert_eq!(PaintRequest::from_brush(&brush, PaintRegion::cell(0, 0)), None);
        brush.select("Float", 1);
        assert_eq!(
            PaintRequest::from_brush(&brush, PaintRegion::cell(2, 3)),
            Some(PaintRequest::new("Float", PaintRegion::cell(2, 3), 1))
        );
    }

    #[test]
    fn test_outcome_merges_chunk_deltas() {
        let coord = ChunkCoord::new(0, 0);
        let mut first = EditOutcome::new(1);
        first.colliders.push((
            coord,
            ColliderDelta {
                added: Vec::new(),
                removed: vec![ColliderId(1)],
            },
        ));
        let mut second = EditOutcome::new(2);
        second.colliders.push((
            coord,
            ColliderDelta {
                added: Vec::new(),
                removed: vec![ColliderId(2)],
            },
        ));
        first.extend(second);
        assert_eq!(first.sequence, 2);
        assert_eq!(first.colliders.len(), 1);
        assert_eq!(
            first.delta(coord).unwrap().removed,
            vec![ColliderId(1), ColliderId(2)]
        );
    }
}
