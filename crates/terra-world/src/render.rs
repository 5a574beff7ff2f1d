//! Chunk renderer: elevation field to upscaled RGB pixel block.
//!
//! Colour comes from the elevation band, slope shading picks cliff colours
//! on steep forest and mountain cells, and a per-chunk random stream adds
//! water shine, shoreline rocks and meadow flowers. The stream is seeded from
//! the chunk coordinate alone, so a chunk looks the same no matter when or in
//! which order it is rendered.

use terra_common::{ChunkCoord, TerrainConfig, TerrainResult};

use crate::field::{RenderedChunk, TerrainField};
use crate::palette::{self, Band, Rgb};

/// Row stride used to fold a chunk coordinate into one decoration seed.
pub const DECORATION_SEED_STRIDE: i64 = 200;

/// Exponent of the slope unit distance, `2 * scale^0.92`.
const UNIT_DIST_EXPONENT: f64 = 0.92;

/// Centre of the shoreline rock outcrop band.
const ROCK_LINE: f64 = 0.420;

/// Width of each rock sub-band.
const ROCK_BAND: f64 = 0.005;

/// Position period of water shine.
const SHINE_PERIOD: i64 = 10;

/// Abyss shine probability.
const ABYSS_SHINE_CHANCE: f64 = 0.7;

/// Deep sea shine probability.
const DEEP_SEA_SHINE_CHANCE: f64 = 0.4;

/// Probability of a rock in the outer rock sub-bands.
const ROCK_CHANCE: f64 = 0.4;

/// Wildflower probability on even cells.
const WILDFLOWER_CHANCE: f64 = 0.05;

/// Returns the decoration seed of a chunk, wrapping on overflow.
#[must_use]
pub fn decoration_seed(coord: ChunkCoord) -> u64 {
    coord
        .x
        .wrapping_add(DECORATION_SEED_STRIDE.wrapping_mul(coord.y)) as u64
}

/// Returns the finite-difference unit distance for a scale.
#[must_use]
pub fn unit_distance(scale: f64) -> f64 {
    2.0 * scale.powf(UNIT_DIST_EXPONENT)
}

/// Converts terrain fields into pixel blocks.
#[derive(Debug, Clone)]
pub struct ChunkRenderer {
    /// Display pixels per cell
    px: u32,
    /// Squared slope above which cliffs appear
    cliff_threshold: f64,
    /// Squared slope below which meadows count as flats
    flats_threshold: f64,
}

impl Default for ChunkRenderer {
    fn default() -> Self {
        Self::from_valid(&TerrainConfig::default())
    }
}

impl ChunkRenderer {
    /// Creates a renderer from the given config, rejecting configs whose
    /// chunks are too small for slope estimation or too large to allocate.
    pub fn new(config: &TerrainConfig) -> TerrainResult<Self> {
        config.validate()?;
        Ok(Self::from_valid(config))
    }

    fn from_valid(config: &TerrainConfig) -> Self {
        Self {
            px: config.px,
            cliff_threshold: config.cliff_threshold,
            flats_threshold: config.flats_threshold,
        }
    }

    /// Returns display pixels per cell.
    #[must_use]
    pub const fn px(&self) -> u32 {
        self.px
    }

    /// Renders a field into a pixel block of `size * px` pixels square.
    #[must_use]
    pub fn render(&self, field: &TerrainField) -> RenderedChunk {
        let size = field.size();
        let px = self.px;
        let side = size * px;
        let unit = unit_distance(field.scale());
        let mut rng = fastrand::Rng::with_seed(decoration_seed(field.coord()));
        let mut pixels = vec![0u8; side as usize * side as usize * 3];

        // Column-major walk: the draw order of the decoration stream is part
        // of the output.
        for x in 0..size {
            for y in 0..size {
                let value = cell(field, x, y).clamp(0.0, 1.0);
                let (xslope, yslope) = slope(field, x, y, unit);
                let gradient_sqr = xslope * xslope + yslope * yslope;

                let color = self.decorate(value, gradient_sqr, x, y, &mut rng);
                fill_block(&mut pixels, side, x * px, y * px, px, color);
            }
        }

        RenderedChunk::from_pixels(field.coord(), side, pixels)
    }

    /// Picks the final colour of one cell, drawing from `rng` only when a
    /// positional or elevation gate passes.
    fn decorate(
        &self,
        value: f64,
        gradient_sqr: f64,
        x: u32,
        y: u32,
        rng: &mut fastrand::Rng,
    ) -> Rgb {
        let band = Band::classify(value);
        let (x, y) = (i64::from(x), i64::from(y));
        let shine_cell = (2 * x + y) % SHINE_PERIOD == 0;

        match band {
            Band::Void if shine_cell => palette::VOID_SHINE,
            Band::Abyss if shine_cell && rng.f64() < ABYSS_SHINE_CHANCE => palette::ABYSS_SHINE,
            Band::DeepSea if shine_cell && rng.f64() < DEEP_SEA_SHINE_CHANCE => {
                palette::DEEP_SEA_SHINE
            },
            Band::Shoreline => {
                let outer = (ROCK_LINE - ROCK_BAND < value && value < ROCK_LINE)
                    || (ROCK_LINE + ROCK_BAND < value && value < ROCK_LINE + 2.0 * ROCK_BAND);
                let inner = ROCK_LINE < value && value < ROCK_LINE + ROCK_BAND;
                if (outer && rng.f64() < ROCK_CHANCE) || inner {
                    palette::ROCK
                } else {
                    palette::SHORELINE
                }
            },
            Band::Meadow => {
                let mut color = palette::MEADOW;
                if gradient_sqr < self.flats_threshold {
                    color = palette::FLOWER;
                }
                if (x + y) % 2 == 0 && rng.f64() < WILDFLOWER_CHANCE {
                    color = palette::WILDFLOWER;
                }
                color
            },
            _ => match band.cliff_color() {
                Some(cliff) if gradient_sqr > self.cliff_threshold => cliff,
                _ => band.base_color(),
            },
        }
    }
}

#[inline]
fn cell(field: &TerrainField, x: u32, y: u32) -> f64 {
    field.values()[(y * field.size() + x) as usize]
}

/// Finite-difference slope: centred inside the grid, one-sided on its edges.
fn slope(field: &TerrainField, x: u32, y: u32, unit: f64) -> (f64, f64) {
    let last = field.size() - 1;

    let xslope = if x > 0 && x < last {
        (cell(field, x + 1, y) - cell(field, x - 1, y)) / 2.0 / unit
    } else if x == 0 {
        (cell(field, x + 1, y) - cell(field, x, y)) / unit
    } else {
        (cell(field, x, y) - cell(field, x - 1, y)) / unit
    };

    let yslope = if y > 0 && y < last {
        (cell(field, x, y + 1) - cell(field, x, y - 1)) / 2.0 / unit
    } else if y == 0 {
        (cell(field, x, y + 1) - cell(field, x, y)) / unit
    } else {
        (cell(field, x, y) - cell(field, x, y - 1)) / unit
    };

    (xslope, yslope)
}

/// Writes `color` into the `px × px` pixel square at `(left, top)`.
fn fill_block(pixels: &mut [u8], side: u32, left: u32, top: u32, px: u32, color: Rgb) {
    for row in top..top + px {
        let start = (row as usize * side as usize + left as usize) * 3;
        for chunk in pixels[start..start + px as usize * 3].chunks_exact_mut(3) {
            chunk.copy_from_slice(&color);
        }
    }
}
