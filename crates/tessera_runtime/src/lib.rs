//! Chunked map runtime for tessera
//!
//! [`MapRuntime`] holds a tile map as square chunks that can be painted,
//! edited, loaded and unloaded concurrently. Every edit returns the tiles it
//! changed and the collider deltas of the chunks it touched.
//!
//! # Example
//!
//! ```rust,ignore
//! use tessera_runtime::{MapRuntime, PaintRequest, RuntimeConfig};
//! use tessera_autotile::PaintRegion;
//!
//! let config = RuntimeConfig::load("tessera.toml")?;
//! let map = MapRuntime::new(tileset, 256, 256, config)?;
//!
//! let request = PaintRequest::new("Float", PaintRegion::rect(10, 4, 1, 3), 1);
//! if let Some(outcome) = map.paint(&request)?.applied() {
//!     for (chunk, delta) in &outcome.colliders {
//!         // despawn delta.removed, spawn delta.added
//!     }
//! }
//! ```
//!
//! Batches of requests run in parallel with [`MapRuntime::paint_batch`];
//! overlapping requests keep their submission order.

pub mod bundle;
pub mod chunk;
pub mod config;
pub mod error;
pub mod map;
pub mod request;

pub use bundle::TilesetBundle;
pub use chunk::{ChunkCoord, ChunkData};
pub use config::RuntimeConfig;
pub use error::RuntimeError;
pub use map::{MapRuntime, UnloadedChunk};
pub use request::{EditOutcome, PaintRequest, PaintResult};

// Re-export the component crates
pub use tessera_autotile;
pub use tessera_collision;
pub use tessera_core;
