//! Demo settings with persistence
//!
//! Settings are read from `~/.config/hopper/settings.toml` unless a path is
//! given on the command line.

use std::fs;
use std::path::{Path, PathBuf};

use hopper_core::TimeConfig;
use hopper_game::{CharacterConfig, DemoLevel, FollowCameraConfig};
use hopper_physics::{BackendKind, PhysicsConfig};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// All demo settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoSettings {
    pub physics: PhysicsSettings,
    pub time: TimeConfig,
    pub character: CharacterConfig,
    pub camera: FollowCameraConfig,
    pub level: DemoLevel,
    pub run: RunSettings,
}

impl DemoSettings {
    /// Get the default settings file path
    fn settings_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("hopper").join("settings.toml"))
    }

    /// Parse and validate settings from TOML text
    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let settings: Self = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check every section is usable
    pub fn validate(&self) -> anyhow::Result<()> {
        self.physics.config.validate()?;
        self.time.validate()?;
        self.character.validate()?;
        if !(self.run.frame_delta.is_finite() && self.run.frame_delta > 0.0) {
            anyhow::bail!("run.frame_delta must be positive, got {}", self.run.frame_delta);
        }
        Ok(())
    }

    /// Load settings from `path` (or the default location), falling back to
    /// defaults if the file is missing or invalid
    pub fn load(path: Option<&Path>) -> Self {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match Self::settings_path() {
                Some(path) => path,
                None => {
                    warn!("Could not determine config directory");
                    return Self::default();
                }
            },
        };

        if !path.exists() {
            info!("No settings file found at {:?}, using defaults", path);
            return Self::default();
        }

        match fs::read_to_string(&path) {
            Ok(content) => match Self::from_toml(&content) {
                Ok(settings) => {
                    info!("Loaded settings from {:?}", path);
                    settings
                }
                Err(e) => {
                    warn!("Failed to load settings: {}, using defaults", e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read settings file: {}, using defaults", e);
                Self::default()
            }
        }
    }

    /// Save settings to `path`, or the default location when none is given
    pub fn save(&self, path: Option<&Path>) -> anyhow::Result<PathBuf> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match Self::settings_path() {
                Some(path) => path,
                None => anyhow::bail!("Could not determine config directory"),
            },
        };

        // Create config directory if it doesn't exist
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                fs::create_dir_all(dir)?;
            }
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        info!("Saved settings to {:?}", path);
        Ok(path)
    }
}

/// Physics backend selection
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsSettings {
    /// Which backend to bring up
    pub backend: BackendKind,
    #[serde(flatten)]
    pub config: PhysicsConfig,
}

/// How the headless demo run is driven
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunSettings {
    /// Frames to simulate
    pub frames: u32,
    /// Wall-clock seconds per simulated frame
    pub frame_delta: f32,
    /// Log a snapshot every N frames (0 = never)
    pub log_every: u32,
    /// Print snapshots as JSON lines on stdout instead of log lines
    pub json: bool,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            frames: 600,
            frame_delta: 1.0 / 60.0,
            log_every: 30,
            json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(DemoSettings::default().validate().is_ok());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let settings = DemoSettings::from_toml(
            r#"
            [physics]
            backend = "simple"
            gravity = [0.0, -20.0, 0.0]

            [character]
            move_speed = 7.5
            coyote_time = 0.2
            "#,
        )
        .unwrap();

        assert_eq!(settings.physics.backend, BackendKind::Simple);
        assert_eq!(settings.physics.config.gravity, glam::Vec3::new(0.0, -20.0, 0.0));
        assert_eq!(settings.character.move_speed, 7.5);
        assert_eq!(settings.character.coyote_time, 0.2);
        assert_eq!(settings.character.jump_force, CharacterConfig::default().jump_force);
        assert_eq!(settings.run.frames, 600);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let err = DemoSettings::from_toml("[character]\njump_buffer = -1.0\n").unwrap_err();
        assert!(err.to_string().contains("jump_buffer"), "{}", err);

        assert!(DemoSettings::from_toml("[time]\nfixed_timestep = 0.0\n").is_err());
        assert!(DemoSettings::from_toml("[run]\nframe_delta = 0.0\n").is_err());
        assert!(DemoSettings::from_toml("[physics]\nbackend = \"bullet\"\n").is_err());
    }

    #[test]
    fn test_round_trips_through_toml() {
        let mut settings = DemoSettings::default();
        settings.physics.backend = BackendKind::Rapier;
        settings.run.json = true;
        let text = toml::to_string_pretty(&settings).unwrap();
        let parsed = DemoSettings::from_toml(&text).unwrap();
        assert_eq!(parsed.physics.backend, BackendKind::Rapier);
        assert!(parsed.run.json);
        assert_eq!(parsed.level, settings.level);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let settings = DemoSettings::load(Some(Path::new("/nonexistent/hopper/settings.toml")));
        assert_eq!(settings.run.frames, RunSettings::default().frames);
    }

    #[test]
    fn test_save_writes_to_given_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("demo.toml");

        let mut settings = DemoSettings::default();
        settings.physics.backend = BackendKind::Simple;
        settings.run.frames = 42;
        assert_eq!(settings.save(Some(&path)).unwrap(), path);

        let loaded = DemoSettings::load(Some(&path));
        assert_eq!(loaded.physics.backend, BackendKind::Simple);
        assert_eq!(loaded.run.frames, 42);
    }
}
