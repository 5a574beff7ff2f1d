//! Error types for Terra.

use thiserror::Error;

/// Top-level error type for terrain generation and streaming.
#[derive(Debug, Error)]
pub enum TerrainError {
    /// Generation scale is non-positive or non-finite
    #[error("Invalid generation scale: {0} (must be finite and > 0)")]
    InvalidScale(f64),

    /// A cache query named a chunk outside the current required set
    #[error("Chunk ({x}, {y}) is outside the required set")]
    OutOfScopeAccess {
        /// X coordinate
        x: i64,
        /// Y coordinate
        y: i64,
    },

    /// Configuration value out of its domain
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Image encoding errors
    #[error("Image error: {0}")]
    Image(String),
}

impl TerrainError {
    /// Checks a generation scale, returning `InvalidScale` when it is unusable.
    pub fn check_scale(scale: f64) -> TerrainResult<f64> {
        if scale.is_finite() && scale > 0.0 {
            Ok(scale)
        } else {
            Err(Self::InvalidScale(scale))
        }
    }
}

/// Result type alias for terrain operations.
pub type TerrainResult<T> = Result<T, TerrainError>;
