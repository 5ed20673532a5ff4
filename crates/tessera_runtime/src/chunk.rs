//! Map chunks: the unit of locking and collider ownership

use serde::{Deserialize, Serialize};
use tessera_autotile::TerrainGrid;
use tessera_collision::ColliderSet;
use tessera_core::{TileLayer, WangColorIndex};
use uuid::Uuid;

/// Chunk position in chunk units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkCoord {
    pub x: i32,
    pub y: i32,
}

impl ChunkCoord {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The chunk holding a map cell
    pub fn containing(x: i32, y: i32, chunk_size: u32) -> Self {
        let size = chunk_size as i32;
        Self::new(x.div_euclid(size), y.div_euclid(size))
    }

    /// Map cell of the chunk's top-left corner
    pub fn origin(&self, chunk_size: u32) -> (i32, i32) {
        let size = chunk_size as i32;
        (self.x * size, self.y * size)
    }
}

/// The persistent contents of a chunk, as handed to `load_chunk` and
/// returned by `unload_chunk`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkData {
    pub terrain: TerrainGrid,
    pub layer: TileLayer,
}

impl ChunkData {
    /// Unassigned terrain, no tiles
    pub fn empty(chunk_size: u32, layer_name: &str, tileset_id: Uuid) -> Self {
        Self {
            terrain: TerrainGrid::new(chunk_size, chunk_size),
            layer: TileLayer::new(layer_name, tileset_id, chunk_size, chunk_size),
        }
    }
}

/// A loaded chunk
#[derive(Debug)]
pub(crate) struct Chunk {
    pub coord: ChunkCoord,
    pub origin: (i32, i32),
    pub data: ChunkData,
    pub colliders: ColliderSet,
    /// Sequence number of the last edit written into this chunk
    pub sequence: u64,
    /// Set once removed from the chunk table; late lockers must not write
    pub unloaded: bool,
}

impl Chunk {
    pub fn new(coord: ChunkCoord, chunk_size: u32, data: ChunkData) -> Self {
        Self {
            coord,
            origin: coord.origin(chunk_size),
            data,
            colliders: ColliderSet::new(),
            sequence: 0,
            unloaded: false,
        }
    }

    /// Chunk-local position of a map cell
    pub fn local(&self, x: i32, y: i32) -> (i32, i32) {
        (x - self.origin.0, y - self.origin.1)
    }

    pub fn terrain_at(&self, x: i32, y: i32) -> Option<WangColorIndex> {
        let (lx, ly) = self.local(x, y);
        self.data.terrain.get(lx, ly)
    }

    pub fn tile_at(&self, x: i32, y: i32) -> Option<u32> {
        let (lx, ly) = self.local(x, y);
        self.data.layer.get(lx, ly)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_containing_chunk() {
        assert_eq!(ChunkCoord::containing(0, 0, 16), ChunkCoord::new(0, 0));
        assert_eq!(ChunkCoord::containing(15, 16, 16), ChunkCoord::new(0, 1));
        assert_eq!(ChunkCoord::containing(-1, 31, 16), ChunkCoord::new(-1, 1));
        assert_eq!(ChunkCoord::new(2, 3).origin(16), (32, 48));
    }

    #[test]
    fn test_local_cells() {
        let chunk = Chunk::new(
            ChunkCoord::new(1, 0),
            8,
            ChunkData::empty(8, "Ground", Uuid::nil()),
        );
        assert_eq!(chunk.local(9, 3), (1, 3));
        assert_eq!(chunk.terrain_at(9, 3), None);
        assert_eq!(chunk.tile_at(9, 3), None);
    }
}
