//! Fixed generation constants and the configuration value carrying them.
//!
//! The core never reads these from the environment. The defaults are the
//! values the colour bands and slope thresholds were tuned against, so
//! changing them changes the look of the world.

use serde::{Deserialize, Serialize};

use crate::error::{TerrainError, TerrainResult};

/// Chunk edge length in world cells.
pub const BLOCK_SIZE: u32 = 20;

/// Display pixels per world cell.
pub const PX: u32 = 3;

/// Default world-to-noise scale.
pub const DEFAULT_SCALE: f64 = 0.005;

/// Fractal noise octave count.
pub const OCTAVES: u32 = 7;

/// Amplitude multiplier per octave.
pub const PERSISTENCE: f64 = 0.4;

/// Frequency multiplier per octave.
pub const LACUNARITY: f64 = 3.0;

/// Squared slope above which forest and mountain cells become cliffs.
pub const CLIFF_THRESHOLD: f64 = 0.65;

/// Squared slope below which meadow cells count as flats.
pub const FLATS_THRESHOLD: f64 = 0.09;

/// Permutation table seed.
pub const PERMUTATION_SEED: u64 = 42;

/// Generation and rendering parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// Chunk edge length in world cells
    pub block_size: u32,
    /// Display pixels per world cell
    pub px: u32,
    /// Initial world-to-noise scale
    pub scale: f64,
    /// Fractal noise octaves
    pub octaves: u32,
    /// Amplitude multiplier per octave
    pub persistence: f64,
    /// Frequency multiplier per octave
    pub lacunarity: f64,
    /// Cliff slope threshold (squared gradient)
    pub cliff_threshold: f64,
    /// Flats slope threshold (squared gradient)
    pub flats_threshold: f64,
    /// Permutation table seed
    pub seed: u64,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            block_size: BLOCK_SIZE,
            px: PX,
            scale: DEFAULT_SCALE,
            octaves: OCTAVES,
            persistence: PERSISTENCE,
            lacunarity: LACUNARITY,
            cliff_threshold: CLIFF_THRESHOLD,
            flats_threshold: FLATS_THRESHOLD,
            seed: PERMUTATION_SEED,
        }
    }
}

impl TerrainConfig {
    /// Returns the default configuration with a different permutation seed.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    /// Rejects values the generator cannot work with.
    ///
    /// Scale problems are reported as `InvalidScale`, never clamped.
    pub fn validate(&self) -> TerrainResult<()> {
        TerrainError::check_scale(self.scale)?;
        if self.block_size < 2 {
            return Err(TerrainError::InvalidConfig(format!(
                "block_size must be at least 2, got {}",
                self.block_size
            )));
        }
        if self.block_size > u32::from(u16::MAX) {
            return Err(TerrainError::InvalidConfig(format!(
                "block_size {} exceeds the {} cell limit",
                self.block_size,
                u16::MAX
            )));
        }
        if self.px == 0 {
            return Err(TerrainError::InvalidConfig("px must be positive".into()));
        }
        if self
            .block_size
            .checked_mul(self.px)
            .map_or(true, |side| side > u32::from(u16::MAX))
        {
            return Err(TerrainError::InvalidConfig(format!(
                "chunk edge of {} x {} pixels exceeds the {} pixel limit",
                self.block_size,
                self.px,
                u16::MAX
            )));
        }
        if self.octaves == 0 {
            return Err(TerrainError::InvalidConfig(
                "octaves must be positive".into(),
            ));
        }
        for (name, value) in [
            ("persistence", self.persistence),
            ("lacunarity", self.lacunarity),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(TerrainError::InvalidConfig(format!(
                    "{name} must be finite and positive, got {value}"
                )));
            }
        }
        Ok(())
    }

    /// Edge length of a rendered chunk in display pixels.
    #[must_use]
    pub const fn chunk_pixels(&self) -> u32 {
        self.block_size * self.px
    }
}
