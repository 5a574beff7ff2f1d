//! Input handling for the headless viewer.
//!
//! There is no window to poll, so key presses arrive as a frame-stamped
//! script. Discrete commands (zoom, reset, cinematic toggle) fire once on
//! their frame; `move` sets held axes that keep panning until changed.

use serde::{Deserialize, Serialize};
use terra_common::TerrainResult;
use terra_world::{Viewport, Zoom};
use tracing::{debug, info};

/// A viewer command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Command {
    /// Hold the movement axes (each clamped to -1, 0 or 1)
    Move {
        /// Right is positive
        horizontal: i64,
        /// Down is positive
        vertical: i64,
    },
    /// Halve the scale around the window centre
    ZoomIn,
    /// Double the scale around the window centre
    ZoomOut,
    /// Jump to a random camera position
    Reset,
    /// Switch between manual panning and cinematic drift
    ToggleCinematic,
    /// Stop the frame loop
    Quit,
}

/// A command scheduled for a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptedInput {
    /// Frame index the command fires on
    pub frame: u64,
    /// What to do
    pub command: Command,
}

/// What happened while applying one frame of input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameActions {
    /// The scale changed this frame
    pub zoomed: bool,
    /// A quit was requested
    pub quit: bool,
}

/// Replays scripted input and tracks held axes.
#[derive(Debug, Clone)]
pub struct InputState {
    /// Commands sorted by frame
    script: Vec<ScriptedInput>,
    /// Next command to fire
    cursor: usize,
    /// Held horizontal axis
    horizontal: i64,
    /// Held vertical axis
    vertical: i64,
    /// Cinematic drift enabled
    cinematic: bool,
    /// World pixels per frame per axis
    pan_speed: i64,
}

impl InputState {
    /// Creates the input state. Commands sharing a frame keep their order.
    #[must_use]
    pub fn new(mut script: Vec<ScriptedInput>, pan_speed: i64, cinematic: bool) -> Self {
        script.sort_by_key(|input| input.frame);
        Self {
            script,
            cursor: 0,
            horizontal: 0,
            vertical: 0,
            cinematic,
            pan_speed,
        }
    }

    /// Whether cinematic drift is active.
    #[must_use]
    pub const fn cinematic(&self) -> bool {
        self.cinematic
    }

    /// Fires every command due by `frame`, then moves the camera.
    ///
    /// Cinematic drift replaces manual panning while enabled.
    pub fn apply(
        &mut self,
        frame: u64,
        viewport: &mut Viewport,
        rng: &mut fastrand::Rng,
    ) -> TerrainResult<FrameActions> {
        let mut actions = FrameActions::default();

        while let Some(input) = self.script.get(self.cursor).copied() {
            if input.frame > frame {
                break;
            }
            self.cursor += 1;
            debug!("Frame {frame}: {:?}", input.command);

            match input.command {
                Command::Move {
                    horizontal,
                    vertical,
                } => {
                    self.horizontal = horizontal.signum();
                    self.vertical = vertical.signum();
                },
                Command::ZoomIn => {
                    viewport.zoom(Zoom::In)?;
                    actions.zoomed = true;
                    info!("Zoomed in, scale {}", viewport.scale);
                },
                Command::ZoomOut => {
                    viewport.zoom(Zoom::Out)?;
                    actions.zoomed = true;
                    info!("Zoomed out, scale {}", viewport.scale);
                },
                Command::Reset => {
                    viewport.reset(rng);
                    info!(
                        "Camera reset to ({}, {})",
                        viewport.camera_x, viewport.camera_y
                    );
                },
                Command::ToggleCinematic => {
                    self.cinematic = !self.cinematic;
                    info!("Cinematic mode {}", if self.cinematic { "on" } else { "off" });
                },
                Command::Quit => actions.quit = true,
            }
        }

        if self.cinematic {
            viewport.drift();
        } else {
            viewport.pan(self.horizontal, self.vertical, self.pan_speed);
        }

        Ok(actions)
    }
}
