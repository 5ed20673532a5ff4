//! Tiled-compatible Wang autotiling
//!
//! This crate resolves the tile variant of a cell from the terrain colors of
//! its eight neighbors, and paints terrain over a grid while keeping every
//! affected neighbor consistent.
//!
//! # Features
//! - Corner, Edge, and Mixed Wang sets
//! - Pre-indexed resolution with a total, deterministic ranking
//! - Fallback policies for cells no tile can satisfy
//! - Preview and refresh without repainting
//!
//! # Example
//!
//! ```rust,ignore
//! use tessera_autotile::{AutotilePainter, PaintRegion, TerrainGrid, WangIndex};
//! use tessera_core::TileLayer;
//!
//! let index = WangIndex::from_tileset(&tileset, "Float")?;
//! let painter = AutotilePainter::new(&index);
//!
//! let mut terrain = TerrainGrid::filled(16, 16, 0);
//! let mut layer = TileLayer::new("Ground", tileset.id, 16, 16);
//! let report = painter.paint(&mut terrain, &mut layer, &PaintRegion::rect(4, 4, 1, 3), 1)?;
//! for cell in report.unresolved() {
//!     // highlight cell.cell.x, cell.cell.y
//! }
//! ```

pub mod config;
pub mod error;
pub mod paint;
pub mod resolver;
pub mod terrain;

pub use config::{AutotileConfig, FallbackPolicy, TerrainBrush, VariantPolicy};
pub use error::AutotileError;
pub use paint::{AutotilePainter, CellOutcome, CellReport, PaintRegion, PaintReport, TileChange};
pub use resolver::{Candidate, MatchMode, Signature, WangIndex};
pub use terrain::{TerrainCell, TerrainGrid, NEIGHBOR_OFFSETS};

// Re-export tessera_core
pub use tessera_core;
