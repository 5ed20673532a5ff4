//! Autotile painter
//!
//! Paints a Wang color over a region of a `TerrainGrid` and re-resolves every
//! cell whose signature may have changed: the region plus its 8-neighborhood.

use crate::config::{AutotileConfig, FallbackPolicy};
use crate::resolver::WangIndex;
use crate::terrain::{TerrainCell, TerrainGrid};
use crate::AutotileError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tessera_core::{TileLayer, WangColorIndex};
use tracing::{debug, warn};

/// Cells targeted by one paint, kept in row-major order without duplicates
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaintRegion {
    cells: Vec<(i32, i32)>,
}

impl PaintRegion {
    pub fn cell(x: i32, y: i32) -> Self {
        Self {
            cells: vec![(x, y)],
        }
    }

    /// Rectangle of `width` x `height` cells with its top-left at `(x, y)`
    pub fn rect(x: i32, y: i32, width: u32, height: u32) -> Self {
        let mut cells = Vec::with_capacity(width as usize * height as usize);
        for dy in 0..height as i32 {
            for dx in 0..width as i32 {
                cells.push((x + dx, y + dy));
            }
        }
        Self { cells }
    }

    pub fn from_cells(cells: impl IntoIterator<Item = (i32, i32)>) -> Self {
        let sorted: BTreeSet<(i32, i32)> = cells.into_iter().map(|(x, y)| (y, x)).collect();
        Self {
            cells: sorted.into_iter().map(|(y, x)| (x, y)).collect(),
        }
    }

    pub fn cells(&self) -> &[(i32, i32)] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Inclusive bounds as `(min_x, min_y, max_x, max_y)`
    pub fn bounds(&self) -> Option<(i32, i32, i32, i32)> {
        let &(x, y) = self.cells.first()?;
        Some(self.cells.iter().fold(
            (x, y, x, y),
            |(min_x, min_y, max_x, max_y), &(x, y)| {
                (min_x.min(x), min_y.min(y), max_x.max(x), max_y.max(y))
            },
        ))
    }

    /// The same region shifted by `(dx, dy)`
    pub fn translated(&self, dx: i32, dy: i32) -> Self {
        Self {
            cells: self.cells.iter().map(|&(x, y)| (x + dx, y + dy)).collect(),
        }
    }
}

/// One tile write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileChange {
    pub x: i32,
    pub y: i32,
    pub old: Option<u32>,
    pub new: Option<u32>,
}

/// What happened to an evaluated cell
#[derive(Debug, Clone, PartialEq)]
pub enum CellOutcome {
    Resolved { tile: u32 },
    /// Assigned color 0
    Cleared,
    /// No tile matched; `fallback` is what the cell now holds
    Unresolved {
        error: AutotileError,
        fallback: Option<u32>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct CellReport {
    pub cell: TerrainCell,
    pub outcome: CellOutcome,
}

/// Result of a paint, preview or refresh
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaintReport {
    /// Tile writes, row-major
    pub changes: Vec<TileChange>,
    /// Every evaluated cell, row-major; unassigned cells are not listed
    pub outcomes: Vec<CellReport>,
}

impl PaintReport {
    /// Cells left without a matching tile, for highlighting in an editor
    pub fn unresolved(&self) -> impl Iterator<Item = &CellReport> {
        self.outcomes
            .iter()
            .filter(|report| matches!(report.outcome, CellOutcome::Unresolved { .. }))
    }

    pub fn is_clean(&self) -> bool {
        self.unresolved().next().is_none()
    }

    pub fn tile_at(&self, x: i32, y: i32) -> Option<&TileChange> {
        self.changes.iter().find(|c| c.x == x && c.y == y)
    }

    /// Append another report
    pub fn extend(&mut self, other: PaintReport) {
        self.changes.extend(other.changes);
        self.outcomes.extend(other.outcomes);
    }
}

/// Applies terrain edits to a grid and tile layer with one active Wang set
#[derive(Debug, Clone, Copy)]
pub struct AutotilePainter<'a> {
    index: &'a WangIndex,
    config: AutotileConfig,
    origin: (i32, i32),
}

impl<'a> AutotilePainter<'a> {
    pub fn new(index: &'a WangIndex) -> Self {
        Self {
            index,
            config: AutotileConfig::default().with_match_mode(index.match_mode()),
            origin: (0, 0),
        }
    }

    /// Match mode, fallback and variant policies. The config's match mode
    /// replaces the one the index was built with.
    pub fn with_config(mut self, config: AutotileConfig) -> Self {
        self.config = config;
        self
    }

    /// World position of the grid's `(0, 0)` cell. Reports and variant seeds
    /// use world coordinates; regions stay grid-local.
    pub fn with_origin(mut self, x: i32, y: i32) -> Self {
        self.origin = (x, y);
        self
    }

    pub fn index(&self) -> &WangIndex {
        self.index
    }

    /// Mark `region` with `color` and re-resolve the affected cells
    pub fn paint(
        &self,
        terrain: &mut TerrainGrid,
        layer: &mut TileLayer,
        region: &PaintRegion,
        color: WangColorIndex,
    ) -> Result<PaintReport, AutotileError> {
        self.check_color(color)?;

        let mut painted = Vec::with_capacity(region.len());
        for &(x, y) in region.cells() {
            if terrain.set(x, y, Some(color)) {
                painted.push((x, y));
            } else {
                debug!(x, y, "paint cell outside the terrain grid, skipped");
            }
        }

        let affected = affected_cells(terrain, &painted);
        Ok(self.resolve_cells(terrain, layer, affected))
    }

    /// The report `paint` would produce, computed on copies
    pub fn preview(
        &self,
        terrain: &TerrainGrid,
        layer: &TileLayer,
        region: &PaintRegion,
        color: WangColorIndex,
    ) -> Result<PaintReport, AutotileError> {
        let mut terrain = terrain.clone();
        let mut layer = layer.clone();
        self.paint(&mut terrain, &mut layer, region, color)
    }

    /// Re-resolve the region's cells from the current terrain without painting
    pub fn refresh(
        &self,
        terrain: &TerrainGrid,
        layer: &mut TileLayer,
        region: &PaintRegion,
    ) -> PaintReport {
        let cells = region
            .cells()
            .iter()
            .copied()
            .filter(|&(x, y)| terrain.in_bounds(x, y));
        self.resolve_cells(terrain, layer, cells)
    }

    fn check_color(&self, color: WangColorIndex) -> Result<(), AutotileError> {
        let color_count = self.index.color_count();
        if color as usize > color_count {
            return Err(AutotileError::UnknownColor { color, color_count });
        }
        Ok(())
    }

    fn resolve_cells(
        &self,
        terrain: &TerrainGrid,
        layer: &mut TileLayer,
        cells: impl IntoIterator<Item = (i32, i32)>,
    ) -> PaintReport {
        let (ox, oy) = self.origin;
        let mut report = PaintReport::default();

        for (x, y) in cells {
            if !layer.in_bounds(x, y) {
                debug!(x = x + ox, y = y + oy, "cell outside the tile layer, skipped");
                continue;
            }
            // Unassigned cells keep whatever tile they hold
            let Some(cell) = terrain.cell(x, y) else {
                continue;
            };

            let old = layer.get(x, y);
            let (new, outcome) = if cell.color == 0 {
                (None, CellOutcome::Cleared)
            } else {
                match self.index.select_with(
                    &cell.signature,
                    self.config.match_mode,
                    self.config.variants,
                    x + ox,
                    y + oy,
                ) {
                    Ok(tile) => (Some(tile), CellOutcome::Resolved { tile }),
                    Err(error) => {
                        let fallback = match self.config.fallback {
                            FallbackPolicy::KeepExisting => old,
                            FallbackPolicy::BlankTile => self.index.blank_tile().or(old),
                            FallbackPolicy::Clear => None,
                        };
                        warn!(
                            x = x + ox,
                            y = y + oy,
                            wang_set = self.index.name(),
                            signature = %cell.signature,
                            "no Wang tile matches cell"
                        );
                        (fallback, CellOutcome::Unresolved { error, fallback })
                    }
                }
            };

            if new != old {
                layer.set(x, y, new);
                report.changes.push(TileChange {
                    x: x + ox,
                    y: y + oy,
                    old,
                    new,
                });
            }
            report.outcomes.push(CellReport {
                cell: TerrainCell {
                    x: x + ox,
                    y: y + oy,
                    ..cell
                },
                outcome,
            });
        }

        report
    }
}

/// Painted cells and their 8-neighborhoods, clipped to the grid, row-major
fn affected_cells(terrain: &TerrainGrid, painted: &[(i32, i32)]) -> Vec<(i32, i32)> {
    let mut affected = BTreeSet::new();
    for &(x, y) in painted {
        for dy in -1..=1 {
            for dx in -1..=1 {
                if terrain.in_bounds(x + dx, y + dy) {
                    affected.insert((y + dy, x + dx));
                }
            }
        }
    }
    affected.into_iter().map(|(y, x)| (x, y)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::MatchMode;
    use tessera_core::testing::{float_tileset, main_tileset};
    use tessera_core::{
        pack_tile, Color, TileFlip, WangColor, WangId, WangSet, WangSetType,
    };
    use uuid::Uuid;

    fn float_index() -> WangIndex {
        WangIndex::from_tileset(&float_tileset(), "Float").unwrap()
    }

    fn layer(width: u32, height: u32) -> TileLayer {
        TileLayer::new("Ground", Uuid::nil(), width, height)
    }

    /// Edge set with an isolated (all-zero) tile and a full tile
    fn blob_index() -> WangIndex {
        let mut set = WangSet::new("Blob", WangSetType::Edge);
        set.add_color(WangColor::new("Blob", Color::RED));
        set.set_tile_wang_id(4, WangId::EMPTY);
        set.set_tile_wang_id(5, WangId::new([1, 0, 1, 0, 1, 0, 1, 0]));
        WangIndex::new(&set)
    }

    #[test]
    fn test_float_strip_over_zero_background() {
        let index = float_index();
        let painter = AutotilePainter::new(&index);
        let mut terrain = TerrainGrid::filled(3, 5, 0);
        let mut tiles = layer(3, 5);

        let report = painter
            .paint(&mut terrain, &mut tiles, &PaintRegion::rect(1, 1, 1, 3), 1)
            .unwrap();

        assert_eq!(tiles.get(1, 1), Some(3));
        assert_eq!(tiles.get(1, 2), Some(19));
        assert_eq!(tiles.get(1, 3), Some(35));
        // Background cells are assigned 0 and stay empty
        assert_eq!(tiles.get(0, 2), None);
        assert!(report.is_clean());
        assert_eq!(report.changes.len(), 3);
        // Whole 3x5 grid is within one cell of the strip
        assert_eq!(report.outcomes.len(), 15);
    }

    #[test]
    fn test_float_strip_over_unassigned_background() {
        let index = float_index();
        let painter = AutotilePainter::new(&index);
        let mut terrain = TerrainGrid::new(3, 5);
        let mut tiles = layer(3, 5);

        let report = painter
            .paint(&mut terrain, &mut tiles, &PaintRegion::rect(1, 1, 1, 3), 1)
            .unwrap();

        // Only the bottom edge of the top cell is concrete
        assert_eq!(tiles.get(1, 1), Some(0));
        assert_eq!(report.outcomes.len(), 3);
        assert_eq!(report.outcomes[0].cell.signature.get(WangId::BOTTOM), Some(1));
        assert_eq!(report.outcomes[0].cell.signature.get(WangId::TOP), None);
    }

    #[test]
    fn test_paint_is_idempotent() {
        let index = float_index();
        let painter = AutotilePainter::new(&index);
        let mut terrain = TerrainGrid::filled(6, 6, 0);
        let mut tiles = layer(6, 6);
        let region = PaintRegion::from_cells([(1, 1), (2, 1), (3, 1), (2, 2), (2, 3)]);

        painter.paint(&mut terrain, &mut tiles, &region, 1).unwrap();
        let (terrain_once, tiles_once) = (terrain.clone(), tiles.clone());

        let again = painter.paint(&mut terrain, &mut tiles, &region, 1).unwrap();
        assert_eq!(terrain, terrain_once);
        assert_eq!(tiles, tiles_once);
        assert!(again.changes.is_empty());
    }

    #[test]
    fn test_isolated_cell_without_blank_tile() {
        let index = float_index();
        let painter = AutotilePainter::new(&index);
        let mut terrain = TerrainGrid::filled(3, 3, 0);
        let mut tiles = layer(3, 3);

        let report = painter
            .paint(&mut terrain, &mut tiles, &PaintRegion::cell(1, 1), 1)
            .unwrap();

        let unresolved: Vec<_> = report.unresolved().collect();
        assert_eq!(unresolved.len(), 1);
        assert_eq!((unresolved[0].cell.x, unresolved[0].cell.y), (1, 1));
        assert!(matches!(
            unresolved[0].outcome,
            CellOutcome::Unresolved {
                error: AutotileError::NoMatch { .. },
                fallback: None
            }
        ));
        assert_eq!(tiles.get(1, 1), None);
    }

    #[test]
    fn test_isolated_cell_uses_blank_tile() {
        let index = blob_index();
        let painter = AutotilePainter::new(&index);
        let mut terrain = TerrainGrid::filled(3, 3, 0);
        let mut tiles = layer(3, 3);

        let report = painter
            .paint(&mut terrain, &mut tiles, &PaintRegion::cell(1, 1), 1)
            .unwrap();
        assert!(report.is_clean());
        assert_eq!(tiles.get(1, 1), Some(4));
    }

    #[test]
    fn test_fallback_policies() {
        let index = float_index();
        let region = PaintRegion::cell(1, 1);

        let run = |fallback: FallbackPolicy| {
            let painter = AutotilePainter::new(&index)
                .with_config(AutotileConfig::default().with_fallback(fallback));
            let mut terrain = TerrainGrid::filled(3, 3, 0);
            let mut tiles = layer(3, 3);
            tiles.set(1, 1, Some(17));
            painter.paint(&mut terrain, &mut tiles, &region, 1).unwrap();
            tiles.get(1, 1)
        };

        assert_eq!(run(FallbackPolicy::KeepExisting), Some(17));
        // Float has no blank tile, so the existing tile is kept
        assert_eq!(run(FallbackPolicy::BlankTile), Some(17));
        assert_eq!(run(FallbackPolicy::Clear), None);
    }

    #[test]
    fn test_config_match_mode_overrides_index() {
        let mut set = WangSet::new("Cap", WangSetType::Edge);
        set.add_color(WangColor::new("Cap", Color::RED));
        set.set_tile_wang_id(6, WangId::new([1, 0, 0, 0, 0, 0, 0, 0]));
        let index = WangIndex::new(&set);
        // (1, 1) sees color 1 on top and right
        let region = PaintRegion::from_cells([(1, 0), (1, 1), (2, 1)]);

        let run = |painter: AutotilePainter| {
            let mut terrain = TerrainGrid::filled(3, 3, 0);
            let mut tiles = layer(3, 3);
            painter.paint(&mut terrain, &mut tiles, &region, 1).unwrap();
            tiles.get(1, 1)
        };

        assert_eq!(AutotilePainter::new(&index).config.match_mode, MatchMode::Strict);
        assert_eq!(run(AutotilePainter::new(&index)), None);
        let wildcard = AutotileConfig::default().with_match_mode(MatchMode::ZeroIsWildcard);
        assert_eq!(run(AutotilePainter::new(&index).with_config(wildcard)), Some(6));

        // A painter without a config inherits the index's mode
        let wildcard_index = WangIndex::new(&set).with_match_mode(MatchMode::ZeroIsWildcard);
        assert_eq!(run(AutotilePainter::new(&wildcard_index)), Some(6));
        assert_eq!(
            run(AutotilePainter::new(&wildcard_index).with_config(AutotileConfig::default())),
            None
        );
    }

    #[test]
    fn test_unknown_color_writes_nothing() {
        let index = float_index();
        let painter = AutotilePainter::new(&index);
        let mut terrain = TerrainGrid::filled(3, 3, 0);
        let mut tiles = layer(3, 3);

        let err = painter
            .paint(&mut terrain, &mut tiles, &PaintRegion::cell(1, 1), 2)
            .unwrap_err();
        assert_eq!(
            err,
            AutotileError::UnknownColor {
                color: 2,
                color_count: 1
            }
        );
        assert_eq!(terrain, TerrainGrid::filled(3, 3, 0));
        assert!(tiles.is_empty());
    }

    #[test]
    fn test_out_of_bounds_cells_are_skipped() {
        let index = float_index();
        let painter = AutotilePainter::new(&index);
        let mut terrain = TerrainGrid::filled(3, 3, 0);
        let mut tiles = layer(3, 3);

        let report = painter
            .paint(&mut terrain, &mut tiles, &PaintRegion::rect(-1, 1, 5, 1), 1)
            .unwrap();
        assert_eq!(terrain.get(0, 1), Some(1));
        assert_eq!(terrain.get(2, 1), Some(1));
        // Left edge of the grid is don't-care, so the lowest id wins there
        assert_eq!(tiles.get(0, 1), Some(48));
        assert_eq!(tiles.get(1, 1), Some(49));
        assert_eq!(tiles.get(2, 1), Some(49));
        assert!(report.is_clean());
    }

    #[test]
    fn test_reresolve_discards_flip_bits() {
        let index = float_index();
        let painter = AutotilePainter::new(&index);
        let mut terrain = TerrainGrid::filled(3, 5, 0);
        let mut tiles = layer(3, 5);
        let region = PaintRegion::rect(1, 1, 1, 3);
        painter.paint(&mut terrain, &mut tiles, &region, 1).unwrap();

        let flipped = pack_tile(
            19,
            TileFlip {
                x: true,
                y: false,
                diagonal: false,
            },
        );
        tiles.set(1, 2, Some(flipped));
        let report = painter.paint(&mut terrain, &mut tiles, &region, 1).unwrap();
        assert_eq!(tiles.get(1, 2), Some(19));
        assert_eq!(
            report.changes,
            vec![TileChange {
                x: 1,
                y: 2,
                old: Some(flipped),
                new: Some(19)
            }]
        );
    }

    #[test]
    fn test_preview_matches_paint_without_mutation() {
        let index = float_index();
        let painter = AutotilePainter::new(&index);
        let terrain = TerrainGrid::filled(3, 5, 0);
        let tiles = layer(3, 5);
        let region = PaintRegion::rect(1, 1, 1, 3);

        let preview = painter.preview(&terrain, &tiles, &region, 1).unwrap();
        assert_eq!(terrain, TerrainGrid::filled(3, 5, 0));
        assert!(tiles.is_empty());

        let (mut terrain, mut tiles) = (terrain, tiles);
        let painted = painter.paint(&mut terrain, &mut tiles, &region, 1).unwrap();
        assert_eq!(preview, painted);
    }

    #[test]
    fn test_refresh_resolves_existing_terrain() {
        let index = float_index();
        let painter = AutotilePainter::new(&index);
        let mut terrain = TerrainGrid::filled(3, 5, 0);
        for y in 1..=3 {
            terrain.set(1, y, Some(1));
        }
        let mut tiles = layer(3, 5);

        let report = painter.refresh(&terrain, &mut tiles, &PaintRegion::rect(0, 0, 3, 5));
        assert_eq!(tiles.get(1, 1), Some(3));
        assert_eq!(tiles.get(1, 2), Some(19));
        assert_eq!(tiles.get(1, 3), Some(35));
        assert_eq!(report.changes.len(), 3);
    }

    #[test]
    fn test_origin_offsets_reported_coordinates() {
        let index = float_index();
        let painter = AutotilePainter::new(&index).with_origin(32, -16);
        let mut terrain = TerrainGrid::filled(3, 5, 0);
        let mut tiles = layer(3, 5);

        let report = painter
            .paint(&mut terrain, &mut tiles, &PaintRegion::rect(1, 1, 1, 3), 1)
            .unwrap();
        assert_eq!(report.tile_at(33, -15).and_then(|c| c.new), Some(3));
        assert_eq!(report.outcomes[0].cell.x, 32);
    }

    #[test]
    fn test_corner_set_block() {
        let tileset = main_tileset();
        let index = WangIndex::from_tileset(&tileset, "COLLIDER").unwrap();
        let painter = AutotilePainter::new(&index);
        let mut terrain = TerrainGrid::new(3, 3);
        let mut tiles = layer(3, 3);

        painter
            .paint(&mut terrain, &mut tiles, &PaintRegion::rect(0, 0, 3, 3), 1)
            .unwrap();
        // Centre sees the block on every corner
        assert_eq!(tiles.get(1, 1), Some(127));
        // Top-left cell only has its bottom-right diagonal inside the grid
        assert_eq!(tiles.get(0, 0), Some(30));
    }

    #[test]
    fn test_region_helpers() {
        let region = PaintRegion::from_cells([(2, 1), (0, 0), (2, 1), (1, 0)]);
        assert_eq!(region.cells(), &[(0, 0), (1, 0), (2, 1)]);
        assert_eq!(region.bounds(), Some((0, 0, 2, 1)));
        assert_eq!(region.translated(1, 1).cells(), &[(1, 1), (2, 1), (3, 2)]);
        assert_eq!(PaintRegion::default().bounds(), None);
    }
}
