//! Coordinate types for world pixels and chunks.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// World coordinate in pixels (global position, unbounded).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Pod, Zeroable)]
#[repr(C)]
pub struct WorldCoord {
    /// X coordinate in world space
    pub x: i64,
    /// Y coordinate in world space
    pub y: i64,
}

impl WorldCoord {
    /// Creates a new world coordinate.
    #[must_use]
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// Returns the chunk containing this pixel.
    ///
    /// Uses floor division, so pixel -1 belongs to chunk -1. Chunk indices
    /// span the same `i64` range as pixels, so distant chunks never alias.
    #[must_use]
    pub const fn to_chunk_coord(self, block_size: u32) -> ChunkCoord {
        let size = block_size as i64;
        ChunkCoord {
            x: self.x.div_euclid(size),
            y: self.y.div_euclid(size),
        }
    }
}

/// Chunk coordinate (identifies a chunk in the world grid and keys the cache).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Pod,
    Zeroable,
)]
#[repr(C)]
pub struct ChunkCoord {
    /// X coordinate in chunk space
    pub x: i64,
    /// Y coordinate in chunk space
    pub y: i64,
}

impl ChunkCoord {
    /// Creates a new chunk coordinate.
    #[must_use]
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// Converts to world coordinate (top-left pixel of the chunk).
    ///
    /// Saturates for chunks whose origin lies beyond the `i64` pixel range.
    #[must_use]
    pub const fn to_world_coord(self, block_size: u32) -> WorldCoord {
        WorldCoord {
            x: self.x.saturating_mul(block_size as i64),
            y: self.y.saturating_mul(block_size as i64),
        }
    }
}

impl From<(i64, i64)> for ChunkCoord {
    fn from((x, y): (i64, i64)) -> Self {
        Self::new(x, y)
    }
}

impl std::fmt::Display for ChunkCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
