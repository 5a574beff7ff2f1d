//! Viewport, visible chunk bounds and camera movement.
//!
//! The camera points at the top-left world pixel of the window. Input layers
//! translate key presses into the mutations below before each reconcile.

use terra_common::{ChunkCoord, TerrainError, TerrainResult, WorldCoord, DEFAULT_SCALE};

/// Default pan speed in world pixels per frame.
pub const DEFAULT_PAN_SPEED: i64 = 6;

/// Cinematic drift per frame.
pub const CINEMATIC_DRIFT: (i64, i64) = (2, 1);

/// Half-extent of the square a random reset lands in.
pub const RESET_RANGE: i64 = 50_000;

/// Direction of a zoom step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zoom {
    /// Halve the scale (features grow)
    In,
    /// Double the scale (features shrink)
    Out,
}

/// Visible window onto the world.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    /// Top-left world pixel, x
    pub camera_x: i64,
    /// Top-left world pixel, y
    pub camera_y: i64,
    /// Window width in world pixels
    pub width: u32,
    /// Window height in world pixels
    pub height: u32,
    /// World-to-noise scale
    pub scale: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(300, 300)
    }
}

impl Viewport {
    /// Creates a viewport at the origin with the default scale.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self {
            camera_x: 0,
            camera_y: 0,
            width,
            height,
            scale: DEFAULT_SCALE,
        }
    }

    /// Places the camera.
    #[must_use]
    pub fn at(mut self, camera_x: i64, camera_y: i64) -> Self {
        self.camera_x = camera_x;
        self.camera_y = camera_y;
        self
    }

    /// Sets the scale.
    #[must_use]
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    /// Returns the camera as a world coordinate.
    #[must_use]
    pub const fn camera(&self) -> WorldCoord {
        WorldCoord::new(self.camera_x, self.camera_y)
    }

    /// Returns the chunk rectangle covering every visible pixel, including
    /// partially visible chunks.
    #[must_use]
    pub fn required_bounds(&self, block_size: u32) -> ChunkBounds {
        let top_left = self.camera().to_chunk_coord(block_size);
        let bottom_right = WorldCoord::new(
            self.camera_x.saturating_add(i64::from(self.width.max(1)) - 1),
            self.camera_y.saturating_add(i64::from(self.height.max(1)) - 1),
        )
        .to_chunk_coord(block_size);

        ChunkBounds {
            left: top_left.x,
            top: top_left.y,
            right: bottom_right.x,
            bottom: bottom_right.y,
        }
    }

    /// Returns where chunk `coord` lands on the display, in display pixels.
    ///
    /// Saturates for chunks far outside the required bounds.
    #[must_use]
    pub fn screen_offset(&self, coord: ChunkCoord, block_size: u32, px: u32) -> (i64, i64) {
        let bounds = self.required_bounds(block_size);
        let size = i64::from(block_size.max(1));
        let px = i64::from(px);
        let axis = |chunk: i64, first: i64, camera: i64| {
            chunk
                .saturating_sub(first)
                .saturating_mul(size)
                .saturating_sub(camera.rem_euclid(size))
                .saturating_mul(px)
        };
        (
            axis(coord.x, bounds.left, self.camera_x),
            axis(coord.y, bounds.top, self.camera_y),
        )
    }

    /// Moves the camera by `axis * speed` on each axis, stopping at the edge
    /// of the `i64` pixel range.
    pub fn pan(&mut self, horizontal: i64, vertical: i64, speed: i64) {
        self.camera_x = self.camera_x.saturating_add(horizontal.saturating_mul(speed));
        self.camera_y = self.camera_y.saturating_add(vertical.saturating_mul(speed));
    }

    /// Advances the cinematic drift by one frame.
    pub fn drift(&mut self) {
        self.camera_x = self.camera_x.saturating_add(CINEMATIC_DRIFT.0);
        self.camera_y = self.camera_y.saturating_add(CINEMATIC_DRIFT.1);
    }

    /// Halves or doubles the scale, keeping the noise-space point under the
    /// window centre fixed.
    pub fn zoom(&mut self, zoom: Zoom) -> TerrainResult<()> {
        let scale = TerrainError::check_scale(self.scale)?;
        let half_w = f64::from(self.width) / 2.0;
        let half_h = f64::from(self.height) / 2.0;
        let center_x = (self.camera_x as f64 + half_w) * scale;
        let center_y = (self.camera_y as f64 + half_h) * scale;

        let new_scale = match zoom {
            Zoom::In => scale / 2.0,
            Zoom::Out => scale * 2.0,
        };
        let new_scale = TerrainError::check_scale(new_scale)?;

        self.scale = new_scale;
        self.camera_x = (center_x / new_scale - half_w) as i64;
        self.camera_y = (center_y / new_scale - half_h) as i64;
        Ok(())
    }

    /// Jumps the camera to a random point in `[-RESET_RANGE, RESET_RANGE]²`.
    pub fn reset(&mut self, rng: &mut fastrand::Rng) {
        self.camera_x = rng.i64(-RESET_RANGE..=RESET_RANGE);
        self.camera_y = rng.i64(-RESET_RANGE..=RESET_RANGE);
    }
}

/// Closed chunk rectangle `[left, right] × [top, bottom]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkBounds {
    /// Leftmost chunk column
    pub left: i64,
    /// Rightmost chunk column
    pub right: i64,
    /// Top chunk row
    pub top: i64,
    /// Bottom chunk row
    pub bottom: i64,
}

impl ChunkBounds {
    /// Checks whether a chunk lies inside the rectangle.
    #[must_use]
    pub const fn contains(&self, coord: ChunkCoord) -> bool {
        coord.x >= self.left && coord.x <= self.right && coord.y >= self.top && coord.y <= self.bottom
    }

    /// Number of columns.
    #[must_use]
    pub const fn columns(&self) -> usize {
        span(self.left, self.right)
    }

    /// Number of rows.
    #[must_use]
    pub const fn rows(&self) -> usize {
        span(self.top, self.bottom)
    }

    /// Number of chunks in the rectangle.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.columns().saturating_mul(self.rows())
    }

    /// Always false: the rectangle holds at least one chunk.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Iterates the chunks column by column (x outer, y inner).
    pub fn iter(&self) -> impl Iterator<Item = ChunkCoord> {
        let ChunkBounds {
            left,
            right,
            top,
            bottom,
        } = *self;
        (left..=right).flat_map(move |x| (top..=bottom).map(move |y| ChunkCoord::new(x, y)))
    }
}

/// Cells in the closed range `[first, last]`, saturating at `usize::MAX`.
const fn span(first: i64, last: i64) -> usize {
    let cells = last.abs_diff(first).saturating_add(1);
    if cells > usize::MAX as u64 {
        usize::MAX
    } else {
        cells as usize
    }
}
