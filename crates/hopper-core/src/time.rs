//! Frame time for the Hopper demo
//!
//! Turns raw wall-clock deltas into clamped, scaled frame deltas and feeds a
//! fixed-timestep accumulator for physics stepping.

use serde::{Deserialize, Serialize};

/// Errors produced when validating a [`TimeConfig`]
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TimeConfigError {
    #[error("fixed timestep must be positive and finite, got {0}")]
    InvalidFixedTimestep(f32),

    #[error("max delta time must be positive and finite, got {0}")]
    InvalidMaxDelta(f32),

    #[error("time scale must be non-negative and finite, got {0}")]
    InvalidTimeScale(f32),
}

/// Configuration for frame time
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeConfig {
    /// How many simulated seconds pass per real second
    pub time_scale: f32,
    /// Fixed timestep for physics (in seconds)
    pub fixed_timestep: f32,
    /// Ceiling for a single frame's delta (tab backgrounding, debugger pauses)
    pub max_delta_time: f32,
    /// Maximum number of physics steps run in one frame
    pub max_fixed_steps: u32,
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            time_scale: 1.0,
            fixed_timestep: 1.0 / 60.0,
            max_delta_time: 0.1,
            max_fixed_steps: 8,
        }
    }
}

impl TimeConfig {
    /// Check that all values are usable
    pub fn validate(&self) -> Result<(), TimeConfigError> {
        if !(self.fixed_timestep.is_finite() && self.fixed_timestep > 0.0) {
            return Err(TimeConfigError::InvalidFixedTimestep(self.fixed_timestep));
        }
        if !(self.max_delta_time.is_finite() && self.max_delta_time > 0.0) {
            return Err(TimeConfigError::InvalidMaxDelta(self.max_delta_time));
        }
        if !(self.time_scale.is_finite() && self.time_scale >= 0.0) {
            return Err(TimeConfigError::InvalidTimeScale(self.time_scale));
        }
        Ok(())
    }
}

/// Game time tracking
#[derive(Debug, Clone)]
pub struct GameTime {
    /// Configuration
    pub config: TimeConfig,
    /// Simulated time since start in seconds
    pub total_time: f64,
    /// Delta time for this frame (clamped and scaled)
    pub delta_time: f32,
    /// Clamped but unscaled delta time
    pub unscaled_delta_time: f32,
    /// Frame counter
    pub frame_count: u64,
    /// Whether simulation is paused
    pub paused: bool,
    /// Accumulated time for fixed timestep
    fixed_accumulator: f32,
}

impl Default for GameTime {
    fn default() -> Self {
        Self::new(TimeConfig::default())
    }
}

impl GameTime {
    /// Create a new game time with custom config
    pub fn new(config: TimeConfig) -> Self {
        Self {
            config,
            total_time: 0.0,
            delta_time: 0.0,
            unscaled_delta_time: 0.0,
            frame_count: 0,
            paused: false,
            fixed_accumulator: 0.0,
        }
    }

    /// Update with the raw delta from the previous frame.
    ///
    /// Negative or non-finite deltas count as zero.
    pub fn update(&mut self, raw_delta: f32) {
        let raw_delta = if raw_delta.is_finite() { raw_delta.max(0.0) } else { 0.0 };
        self.unscaled_delta_time = raw_delta.min(self.config.max_delta_time);
        self.frame_count += 1;

        if self.paused {
            self.delta_time = 0.0;
            return;
        }

        self.delta_time = self.unscaled_delta_time * self.config.time_scale;
        self.total_time += self.delta_time as f64;
        self.fixed_accumulator += self.delta_time;
    }

    /// Get the number of fixed timesteps to process this frame.
    ///
    /// Anything beyond `max_fixed_steps` is dropped rather than carried over.
    pub fn fixed_steps(&mut self) -> u32 {
        let mut steps = 0;
        while self.fixed_accumulator >= self.config.fixed_timestep {
            self.fixed_accumulator -= self.config.fixed_timestep;
            steps += 1;
            if steps >= self.config.max_fixed_steps {
                self.fixed_accumulator = 0.0;
                break;
            }
        }
        steps
    }

    /// Pause the simulation
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Toggle pause state
    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }
}
