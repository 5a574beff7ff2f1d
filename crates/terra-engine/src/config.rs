//! Viewer configuration.
//!
//! Window, pacing, camera and scripted input settings plus the terrain
//! parameters handed to the core. Loaded from and saved to TOML.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use terra_common::TerrainConfig;
use terra_world::DEFAULT_PAN_SPEED;
use tracing::{info, warn};

use crate::input::ScriptedInput;

/// Configuration file name.
pub const CONFIG_FILE: &str = "terra.toml";

/// Viewer configuration parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    // === Window Settings ===
    /// Window width in world pixels
    pub window_width: u32,
    /// Window height in world pixels
    pub window_height: u32,
    /// Target frames per second (0 = uncapped)
    pub target_fps: u32,
    /// Frames to run before exiting
    pub frames: u64,
    /// FPS log interval in milliseconds
    pub fps_log_interval_ms: u64,

    // === Camera Settings ===
    /// Start in cinematic drift
    pub cinematic: bool,
    /// Manual pan speed in world pixels per frame
    pub pan_speed: i64,
    /// Starting camera (None = random)
    pub start_camera: Option<[i64; 2]>,
    /// Seed for camera resets (None = random)
    pub camera_seed: Option<u64>,

    // === Generation Settings ===
    /// Evaluate chunk noise on the rayon pool
    pub parallel_noise: bool,
    /// Where to write the final frame (None = don't save)
    pub output: Option<PathBuf>,
    /// Terrain parameters
    pub terrain: TerrainConfig,

    // === Input ===
    /// Frame-stamped commands
    pub script: Vec<ScriptedInput>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            // Window
            window_width: 300,
            window_height: 300,
            target_fps: 60,
            frames: 600,
            fps_log_interval_ms: 1000,

            // Camera
            cinematic: false,
            pan_speed: DEFAULT_PAN_SPEED,
            start_camera: None,
            camera_seed: None,

            // Generation
            parallel_noise: false,
            output: Some(PathBuf::from("terra.png")),
            terrain: TerrainConfig::default(),

            script: Vec::new(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from the default file location.
    /// Returns default config if file doesn't exist.
    pub fn load() -> Self {
        Self::load_from(Self::config_path())
    }

    /// Load configuration from a specific path.
    /// Returns default config if file doesn't exist or is invalid.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            info!("Config file {} not found, using defaults", path.display());
            return Self::default();
        }

        match fs::File::open(path) {
            Ok(mut file) => {
                let mut contents = String::new();
                if let Err(e) = file.read_to_string(&mut contents) {
                    warn!("Failed to read config file: {e}");
                    return Self::default();
                }

                match toml::from_str(&contents) {
                    Ok(config) => {
                        info!("Loaded config from {}", path.display());
                        config
                    },
                    Err(e) => {
                        warn!("Failed to parse config file: {e}");
                        Self::default()
                    },
                }
            },
            Err(e) => {
                warn!("Failed to open config file: {e}");
                Self::default()
            },
        }
    }

    /// Save configuration to a specific path.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        let mut file = fs::File::create(path)?;
        file.write_all(contents.as_bytes())?;

        info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Default configuration path: `terra.toml` in the working directory if
    /// present, otherwise the platform config directory.
    fn config_path() -> PathBuf {
        let local = PathBuf::from(CONFIG_FILE);
        if local.exists() {
            return local;
        }
        dirs::config_dir().map_or(local, |dir| dir.join("terra").join(CONFIG_FILE))
    }

    /// Clamp viewer settings to sensible ranges.
    ///
    /// Terrain parameters are left alone; the core rejects bad ones.
    pub fn validate(&mut self) {
        self.window_width = self.window_width.clamp(20, 4096);
        self.window_height = self.window_height.clamp(20, 4096);
        if self.target_fps > 0 {
            self.target_fps = self.target_fps.clamp(10, 240);
        }
        self.frames = self.frames.max(1);
        self.fps_log_interval_ms = self.fps_log_interval_ms.clamp(100, 60_000);
        self.pan_speed = self.pan_speed.clamp(1, 100);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Command;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.window_width, 300);
        assert_eq!(config.window_height, 300);
        assert_eq!(config.target_fps, 60);
        assert_eq!(config.pan_speed, 6);
        assert_eq!(config.terrain.scale, 0.005);
        assert!(config.start_camera.is_none());
    }

    #[test]
    fn test_config_validation() {
        let mut config = EngineConfig::default();
        config.window_width = 1;
        config.target_fps = 1000;
        config.pan_speed = -4;
        config.frames = 0;
        config.terrain.scale = -1.0;

        config.validate();

        assert_eq!(config.window_width, 20);
        assert_eq!(config.target_fps, 240);
        assert_eq!(config.pan_speed, 1);
        assert_eq!(config.frames, 1);
        // Scale is reported by the core, not clamped here.
        assert_eq!(config.terrain.scale, -1.0);
    }

    #[test]
    fn test_uncapped_fps_survives_validation() {
        let mut config = EngineConfig::default();
        config.target_fps = 0;
        config.validate();
        assert_eq!(config.target_fps, 0);
    }

    #[test]
    fn test_config_save_load() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("nested").join("terra.toml");

        let mut config = EngineConfig::default();
        config.window_width = 240;
        config.cinematic = true;
        config.start_camera = Some([-1200, 450]);
        config.camera_seed = Some(12345);
        config.terrain.seed = 7;
        config.script = vec![
            ScriptedInput {
                frame: 10,
                command: Command::ZoomIn,
            },
            ScriptedInput {
                frame: 20,
                command: Command::Move {
                    horizontal: 1,
                    vertical: 0,
                },
            },
        ];

        config.save_to(&config_path).expect("Failed to save config");

        let loaded = EngineConfig::load_from(&config_path);
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_config_path_uses_platform_dir() {
        if Path::new(CONFIG_FILE).exists() {
            return;
        }
        let expected = dirs::config_dir().map_or_else(
            || PathBuf::from(CONFIG_FILE),
            |dir| dir.join("terra").join(CONFIG_FILE),
        );
        assert_eq!(EngineConfig::config_path(), expected);
    }

    #[test]
    fn test_config_load_missing_file() {
        let config = EngineConfig::load_from("/nonexistent/path/terra.toml");
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_config_load_invalid_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("terra.toml");
        fs::write(&config_path, "window_width = \"wide\"").expect("write");

        let config = EngineConfig::load_from(&config_path);
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("terra.toml");
        fs::write(
            &config_path,
            "frames = 5\n\n[terrain]\nscale = 0.01\n",
        )
        .expect("write");

        let config = EngineConfig::load_from(&config_path);
        assert_eq!(config.frames, 5);
        assert_eq!(config.terrain.scale, 0.01);
        assert_eq!(config.terrain.block_size, 20);
        assert_eq!(config.window_width, 300);
    }
}
