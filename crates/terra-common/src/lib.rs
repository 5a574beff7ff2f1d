//! # Terra Common
//!
//! Shared types for the Terra terrain streamer.
//!
//! This crate provides the foundational pieces used by the world and engine
//! crates:
//! - Coordinate types (world pixel, chunk)
//! - Fixed generation constants and `TerrainConfig`
//! - Common error types
//! - Prelude for convenient imports

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod config;
pub mod coords;
pub mod error;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::*;
    pub use crate::coords::*;
    pub use crate::error::*;
}

pub use prelude::*;
