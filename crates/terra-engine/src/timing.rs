//! Frame timing and FPS tracking.
//!
//! Caps the frame loop at a target rate and measures the rate actually
//! achieved over recent frames.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Frame pacing for the viewer loop.
#[derive(Debug)]
pub struct FrameTiming {
    /// Target frames per second (0 = uncapped)
    target_fps: u32,
    /// Time budget per frame, if capped
    frame_budget: Option<Duration>,
    /// Start of the current frame
    last_frame: Instant,
    /// Recent frame times in seconds
    frame_times: VecDeque<f32>,
    /// Maximum samples for averaging
    max_samples: usize,
}

impl Default for FrameTiming {
    fn default() -> Self {
        Self::new(60)
    }
}

impl FrameTiming {
    /// Creates a frame timer. A target of 0 disables the cap.
    #[must_use]
    pub fn new(target_fps: u32) -> Self {
        Self {
            target_fps,
            frame_budget: (target_fps > 0)
                .then(|| Duration::from_secs_f64(1.0 / f64::from(target_fps))),
            last_frame: Instant::now(),
            frame_times: VecDeque::with_capacity(120),
            max_samples: 120,
        }
    }

    /// Marks the start of a frame and returns the time since the previous one.
    pub fn begin_frame(&mut self) -> f32 {
        let now = Instant::now();
        let dt = (now - self.last_frame).as_secs_f32();
        self.last_frame = now;

        self.frame_times.push_back(dt);
        if self.frame_times.len() > self.max_samples {
            self.frame_times.pop_front();
        }
        dt
    }

    /// Sleeps for whatever is left of the frame budget.
    pub fn sleep_remainder(&self) {
        let Some(budget) = self.frame_budget else {
            return;
        };

        let elapsed = self.last_frame.elapsed();
        if elapsed < budget {
            let sleep_time = budget - elapsed;
            if sleep_time > Duration::from_millis(1) {
                std::thread::sleep(sleep_time - Duration::from_millis(1));
            }
            while self.last_frame.elapsed() < budget {
                std::hint::spin_loop();
            }
        }
    }

    /// FPS averaged over recent frames.
    #[must_use]
    pub fn current_fps(&self) -> f32 {
        let avg = self.average_frame_time();
        if avg > 0.0 {
            1.0 / avg
        } else {
            0.0
        }
    }

    /// Average frame time in milliseconds.
    #[must_use]
    pub fn average_frame_time_ms(&self) -> f32 {
        self.average_frame_time() * 1000.0
    }

    /// Target FPS (0 = uncapped).
    #[must_use]
    pub const fn target_fps(&self) -> u32 {
        self.target_fps
    }

    fn average_frame_time(&self) -> f32 {
        if self.frame_times.is_empty() {
            return 0.0;
        }
        self.frame_times.iter().sum::<f32>() / self.frame_times.len() as f32
    }
}

/// Periodic FPS reporter.
#[derive(Debug)]
pub struct FpsCounter {
    /// Frames since the last report
    frame_count: u32,
    /// Time of the last report
    last_update: Instant,
    /// Report interval
    update_interval: Duration,
    /// Last measured FPS
    current_fps: f32,
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new(Duration::from_millis(500))
    }
}

impl FpsCounter {
    /// Creates a counter reporting every `update_interval`.
    #[must_use]
    pub fn new(update_interval: Duration) -> Self {
        Self {
            frame_count: 0,
            last_update: Instant::now(),
            update_interval,
            current_fps: 0.0,
        }
    }

    /// Counts a frame. Returns `(fps, frame_time_ms)` when a new measurement
    /// is ready.
    pub fn tick(&mut self) -> Option<(f32, f32)> {
        self.frame_count += 1;

        let elapsed = self.last_update.elapsed();
        if elapsed < self.update_interval {
            return None;
        }

        let secs = elapsed.as_secs_f32();
        self.current_fps = self.frame_count as f32 / secs;
        let frame_time = (secs / self.frame_count as f32) * 1000.0;
        self.frame_count = 0;
        self.last_update = Instant::now();
        Some((self.current_fps, frame_time))
    }

    /// Last measured FPS.
    #[must_use]
    pub const fn fps(&self) -> f32 {
        self.current_fps
    }
}
