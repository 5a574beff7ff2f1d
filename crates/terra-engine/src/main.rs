//! # Terra
//!
//! Headless viewer for the infinite procedural terrain streamer.
//!
//! Reads `terra.toml` (or the path given as the first argument), runs the
//! frame loop with scripted input and writes the final frame as a PNG.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

mod app;
mod config;
mod input;
mod timing;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::EngineConfig;

/// Main entry point.
fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("terra=info".parse()?))
        .init();

    info!("Terra starting...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let mut config = std::env::args()
        .nth(1)
        .map_or_else(EngineConfig::load, EngineConfig::load_from);
    config.validate();

    let summary = app::run(&config)?;
    info!(
        "Stopped after {} frames at camera ({}, {}), scale {}",
        summary.frames,
        summary.viewport.camera_x,
        summary.viewport.camera_y,
        summary.viewport.scale
    );
    info!(
        "{} chunks generated, {} rendered, {} resident; final frame {}x{}",
        summary.chunks_generated,
        summary.chunks_rendered,
        summary.resident,
        summary.frame.width(),
        summary.frame.height()
    );

    info!("Terra shutdown complete");
    Ok(())
}
