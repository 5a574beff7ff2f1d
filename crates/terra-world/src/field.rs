//! Terrain field and rendered chunk data structures.

use terra_common::ChunkCoord;

/// Normalised elevation grid for one chunk.
///
/// Values are stored row-major (`y * size + x`) and lie in `[0, 1]`.
/// A field is only ever produced by the generator for one exact
/// `(coord, scale)` pair and is never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct TerrainField {
    /// Chunk coordinate
    coord: ChunkCoord,
    /// Edge length in cells
    size: u32,
    /// World-to-noise scale the field was sampled at
    scale: f64,
    /// Elevation values (size × size)
    values: Vec<f64>,
}

impl TerrainField {
    /// Wraps generated values. `values.len()` must equal `size * size`.
    #[must_use]
    pub(crate) fn from_values(coord: ChunkCoord, size: u32, scale: f64, values: Vec<f64>) -> Self {
        debug_assert_eq!(values.len(), (size * size) as usize);
        Self {
            coord,
            size,
            scale,
            values,
        }
    }

    /// Returns the chunk coordinate.
    #[must_use]
    pub const fn coord(&self) -> ChunkCoord {
        self.coord
    }

    /// Returns the edge length in cells.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Returns the scale the field was sampled at.
    #[must_use]
    pub const fn scale(&self) -> f64 {
        self.scale
    }

    /// Gets the elevation at local cell `(x, y)`.
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> Option<f64> {
        if x >= self.size || y >= self.size {
            return None;
        }
        self.values.get((y * self.size + x) as usize).copied()
    }

    /// Returns all values, row-major.
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Returns one row of the field.
    #[must_use]
    pub fn row(&self, y: u32) -> &[f64] {
        let start = (y * self.size) as usize;
        &self.values[start..start + self.size as usize]
    }
}

/// RGB pixel block for one chunk, ready to blit.
///
/// Pixels are stored row-major, three bytes per pixel. Rendered chunks are
/// replaced wholesale, never edited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedChunk {
    /// Chunk coordinate
    coord: ChunkCoord,
    /// Edge length in pixels
    side: u32,
    /// RGB bytes (side × side × 3)
    pixels: Vec<u8>,
}

impl RenderedChunk {
    /// Wraps rendered pixels. `pixels.len()` must equal `side * side * 3`.
    #[must_use]
    pub(crate) fn from_pixels(coord: ChunkCoord, side: u32, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(pixels.len(), side as usize * side as usize * 3);
        Self {
            coord,
            side,
            pixels,
        }
    }

    /// Returns the chunk coordinate.
    #[must_use]
    pub const fn coord(&self) -> ChunkCoord {
        self.coord
    }

    /// Returns the width and height in pixels.
    #[must_use]
    pub const fn side(&self) -> u32 {
        self.side
    }

    /// Gets the RGB value of pixel `(x, y)`.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.side || y >= self.side {
            return None;
        }
        let idx = (y as usize * self.side as usize + x as usize) * 3;
        Some([self.pixels[idx], self.pixels[idx + 1], self.pixels[idx + 2]])
    }

    /// Returns the raw RGB bytes.
    #[must_use]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Returns one row of RGB bytes.
    #[must_use]
    pub fn row(&self, y: u32) -> &[u8] {
        let stride = self.side as usize * 3;
        let start = y as usize * stride;
        &self.pixels[start..start + stride]
    }
}
