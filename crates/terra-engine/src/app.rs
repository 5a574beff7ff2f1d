//! Headless viewer loop.
//!
//! Each frame applies scripted input, reconciles the chunk cache against the
//! viewport (new chunks reach the framebuffer as they are rendered), redraws
//! the visible chunks and paces itself to the target FPS.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use terra_world::{ChunkCache, Framebuffer, Viewport};
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::input::InputState;
use crate::timing::{FpsCounter, FrameTiming};

/// Outcome of a viewer run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// Frames completed
    pub frames: u64,
    /// Viewport after the last frame
    pub viewport: Viewport,
    /// Terrain fields generated over the run
    pub chunks_generated: u64,
    /// Chunks rendered over the run
    pub chunks_rendered: u64,
    /// Chunks resident at exit
    pub resident: usize,
    /// Final frame
    pub frame: Framebuffer,
}

/// Runs the viewer with `config` until the frame count or a quit command.
pub fn run(config: &EngineConfig) -> Result<RunSummary> {
    let terrain = &config.terrain;
    let mut cache = ChunkCache::new(terrain)
        .context("invalid terrain configuration")?
        .with_parallel_noise(config.parallel_noise);

    let mut rng = config
        .camera_seed
        .map_or_else(fastrand::Rng::new, fastrand::Rng::with_seed);
    let mut viewport =
        Viewport::new(config.window_width, config.window_height).with_scale(terrain.scale);
    match config.start_camera {
        Some([x, y]) => viewport = viewport.at(x, y),
        None => viewport.reset(&mut rng),
    }

    let (Some(display_width), Some(display_height)) = (
        config.window_width.checked_mul(terrain.px),
        config.window_height.checked_mul(terrain.px),
    ) else {
        bail!(
            "display of {}x{} world pixels at {} px per cell is too large",
            config.window_width,
            config.window_height,
            terrain.px
        );
    };
    let mut display = Framebuffer::new(display_width, display_height);
    let mut input = InputState::new(config.script.clone(), config.pan_speed, config.cinematic);
    let mut timing = FrameTiming::new(config.target_fps);
    let mut fps = FpsCounter::new(Duration::from_millis(config.fps_log_interval_ms));

    info!(
        "Viewer {}x{} at camera ({}, {}), scale {}, target {} fps, cinematic {}",
        viewport.width,
        viewport.height,
        viewport.camera_x,
        viewport.camera_y,
        viewport.scale,
        timing.target_fps(),
        input.cinematic()
    );

    let mut frames = 0;
    while frames < config.frames {
        timing.begin_frame();

        let actions = input
            .apply(frames, &mut viewport, &mut rng)
            .with_context(|| format!("input failed at frame {frames}"))?;
        if actions.quit {
            info!("Quit requested at frame {frames}");
            break;
        }
        if actions.zoomed {
            cache.mark_rescaled();
        }

        let stats = cache
            .reconcile(&viewport, &mut display)
            .with_context(|| format!("reconcile failed at frame {frames}"))?;
        if stats.generated > 0 || stats.evicted > 0 {
            debug!(
                "Frame {frames}: +{} -{} chunks ({} resident)",
                stats.generated,
                stats.evicted,
                cache.len()
            );
        }
        cache.present_all(&viewport, &mut display)?;
        frames += 1;

        if let Some((current, frame_ms)) = fps.tick() {
            info!(
                "{current:.0} fps ({frame_ms:.2} ms), camera ({}, {}), {} chunks",
                viewport.camera_x,
                viewport.camera_y,
                cache.len()
            );
        }
        timing.sleep_remainder();
    }

    info!(
        "Ran {frames} frames at ~{:.0} fps ({:.2} ms avg, last report {:.0} fps); generated {} chunks, rendered {}",
        timing.current_fps(),
        timing.average_frame_time_ms(),
        fps.fps(),
        cache.total_generated(),
        cache.total_rendered()
    );

    if let Some(path) = &config.output {
        display
            .save_png(path)
            .with_context(|| format!("failed to save frame to {}", path.display()))?;
    }

    Ok(RunSummary {
        frames,
        viewport,
        chunks_generated: cache.total_generated(),
        chunks_rendered: cache.total_rendered(),
        resident: cache.len(),
        frame: display,
    })
}
