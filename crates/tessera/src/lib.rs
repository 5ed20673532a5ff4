//! Wang autotiling and tile collision for Tiled tilesets
//!
//! This crate bundles the tessera crates:
//! - [`core`] - Tileset model, Wang sets, collision shapes, tile layers
//! - [`autotile`] - Wang tile resolution and the autotile painter
//! - [`collision`] - World-space collider extraction and merging
//! - [`runtime`] - Chunked, concurrently editable map (feature `runtime`)
//!
//! # Example
//!
//! ```rust,ignore
//! use tessera::prelude::*;
//!
//! let tileset = Tileset::from_json(&json)?;
//! tileset.validate()?;
//!
//! let index = WangIndex::from_tileset(&tileset, "Float")?;
//! let mut terrain = TerrainGrid::filled(32, 32, 0);
//! let mut layer = TileLayer::new("Ground", tileset.id, 32, 32);
//! let report = AutotilePainter::new(&index).paint(
//!     &mut terrain,
//!     &mut layer,
//!     &PaintRegion::rect(4, 4, 1, 3),
//!     1,
//! )?;
//!
//! let colliders = extract_layer(&tileset, &layer, (0, 0), &CollisionConfig::default())?;
//! ```
//!
//! # Features
//! - `runtime` (default): [`runtime::MapRuntime`]
//! - `bevy`: colliders are bevy components, the runtime a bevy resource
//! - `physics`: conversion into `avian2d` colliders

pub use tessera_autotile as autotile;
pub use tessera_collision as collision;
pub use tessera_core as core;
#[cfg(feature = "runtime")]
pub use tessera_runtime as runtime;

pub mod prelude {
    pub use tessera_autotile::{
        AutotileConfig, AutotileError, AutotilePainter, CellOutcome, FallbackPolicy, MatchMode,
        PaintRegion, PaintReport, Signature, TerrainBrush, TerrainGrid, VariantPolicy, WangIndex,
    };
    pub use tessera_collision::{
        extract, extract_layer, Collider, ColliderDelta, ColliderSet, ColliderShape,
        CollisionConfig, CollisionError, TileInstance,
    };
    pub use tessera_core::{
        CollisionMaterial, CoreError, Shape, TileFlip, TileLayer, Tileset, WangId, WangSet,
        WangSetType,
    };
    #[cfg(feature = "runtime")]
    pub use tessera_runtime::{
        ChunkCoord, EditOutcome, MapRuntime, PaintRequest, PaintResult, RuntimeConfig,
        RuntimeError,
    };
}
