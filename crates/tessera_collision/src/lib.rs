//! Collision extraction for Tiled tile collision shapes
//!
//! Turns the collision objects of placed tiles into world-space colliders,
//! honoring Tiled's flip flags, and optionally merges edge-sharing colliders
//! of the same material into single outlines.
//!
//! # Example
//!
//! ```rust,ignore
//! use tessera_collision::{extract_layer, ColliderSet, CollisionConfig};
//!
//! let extraction = extract_layer(&tileset, &layer, (0, 0), &CollisionConfig::default())?;
//! let mut published = ColliderSet::new();
//! let delta = published.sync(extraction.colliders);
//! ```
//!
//! With the `physics` feature, `physics::to_avian` builds `avian2d`
//! colliders from the result.

pub mod collider;
pub mod config;
pub mod error;
pub mod extract;
pub mod merge;
#[cfg(feature = "physics")]
pub mod physics;
pub mod transform;

pub use collider::{signed_area, Collider, ColliderDelta, ColliderId, ColliderSet, ColliderShape};
pub use config::CollisionConfig;
pub use error::CollisionError;
pub use extract::{extract, extract_layer, Extraction};
pub use merge::merge_colliders;
pub use transform::{TileInstance, TileTransform};

// Re-export tessera_core
pub use tessera_core;
