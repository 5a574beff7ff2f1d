//! # Terra World
//!
//! Infinite procedural terrain streamed as chunks around a moving viewport.
//!
//! This crate handles:
//! - Gradient and fractal noise
//! - Terrain field generation per chunk
//! - Chunk rendering with elevation bands and slope shading
//! - Chunk caching, eviction and rescale invalidation
//! - The display collaborator interface

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod display;
pub mod field;
pub mod generation;
pub mod noise;
pub mod palette;
pub mod render;
pub mod streaming;
pub mod viewport;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::display::*;
    pub use crate::field::*;
    pub use crate::generation::*;
    pub use crate::noise::{FractalParams, PermutationTable};
    pub use crate::palette::Band;
    pub use crate::render::*;
    pub use crate::streaming::*;
    pub use crate::viewport::*;
}

pub use prelude::*;
