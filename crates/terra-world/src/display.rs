//! Display collaborator interface and an in-memory framebuffer.
//!
//! The streaming cache hands finished pixel blocks to a [`Display`] as soon
//! as they are rendered so the screen fills in progressively, then redraws
//! every visible chunk once per frame.

use std::path::Path;

use terra_common::{ChunkCoord, TerrainError, TerrainResult};
use tracing::info;

use crate::field::RenderedChunk;

/// Display pixel offset of a chunk's top-left corner.
pub type ScreenOffset = (i64, i64);

/// Anything that can show RGB pixel blocks.
pub trait Display {
    /// Draws one chunk at `offset`. Parts outside the surface are clipped.
    fn present(&mut self, coord: ChunkCoord, offset: ScreenOffset, chunk: &RenderedChunk);

    /// Shows what has been drawn so far.
    fn flip(&mut self) {}
}

/// RGB framebuffer, row-major, three bytes per pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Framebuffer {
    /// Width in pixels
    width: u32,
    /// Height in pixels
    height: u32,
    /// RGB bytes
    pixels: Vec<u8>,
    /// Chunks presented since creation
    presented: u64,
    /// Flips since creation
    flips: u64,
}

impl Framebuffer {
    /// Creates a black framebuffer.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * 3],
            presented: 0,
            flips: 0,
        }
    }

    /// Returns the width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Returns the height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Returns the raw RGB bytes.
    #[must_use]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Gets the RGB value at `(x, y)`.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * 3;
        Some([self.pixels[idx], self.pixels[idx + 1], self.pixels[idx + 2]])
    }

    /// Number of chunk blits so far.
    #[must_use]
    pub const fn presented(&self) -> u64 {
        self.presented
    }

    /// Number of flips so far.
    #[must_use]
    pub const fn flips(&self) -> u64 {
        self.flips
    }

    /// Fills the whole buffer with one colour.
    pub fn clear(&mut self, color: [u8; 3]) {
        for px in self.pixels.chunks_exact_mut(3) {
            px.copy_from_slice(&color);
        }
    }

    /// Encodes the buffer as a PNG file.
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> TerrainResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let image = image::RgbImage::from_raw(self.width, self.height, self.pixels.clone())
            .ok_or_else(|| TerrainError::Image("framebuffer size mismatch".into()))?;
        image
            .save_with_format(path, image::ImageFormat::Png)
            .map_err(|e| TerrainError::Image(e.to_string()))?;

        info!(
            "Saved {}x{} frame to {}",
            self.width,
            self.height,
            path.display()
        );
        Ok(())
    }
}

impl Display for Framebuffer {
    fn present(&mut self, _coord: ChunkCoord, offset: ScreenOffset, chunk: &RenderedChunk) {
        self.presented += 1;

        let side = i64::from(chunk.side());
        let (width, height) = (i64::from(self.width), i64::from(self.height));
        let x0 = offset.0.max(0);
        let x1 = (offset.0 + side).min(width);
        if x0 >= x1 {
            return;
        }

        for y in offset.1.max(0)..(offset.1 + side).min(height) {
            let src_row = chunk.row((y - offset.1) as u32);
            let src = &src_row[((x0 - offset.0) * 3) as usize..((x1 - offset.0) * 3) as usize];
            let dst_start = ((y * width + x0) * 3) as usize;
            self.pixels[dst_start..dst_start + src.len()].copy_from_slice(src);
        }
    }

    fn flip(&mut self) {
        self.flips += 1;
    }
}
