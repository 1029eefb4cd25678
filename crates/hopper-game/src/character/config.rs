//! Character tuning values

use glam::Vec3;
use hopper_physics::CharacterBodyDesc;
use serde::{Deserialize, Serialize};

/// Errors found while validating a [`CharacterConfig`]
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("{field} must be finite and non-negative, got {value}")]
    Negative { field: &'static str, value: f32 },

    #[error("{field} must be finite and positive, got {value}")]
    NotPositive { field: &'static str, value: f32 },
}

/// Movement, jump and capsule configuration for one character
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterConfig {
    /// Horizontal speed in meters per second at full input
    pub move_speed: f32,
    /// Upward impulse applied when a jump fires
    pub jump_force: f32,
    /// Seconds before another jump may fire
    pub jump_cooldown: f32,
    /// Grace period after leaving ground where you can still jump
    pub coyote_time: f32,
    /// How long a jump input is remembered before landing
    pub jump_buffer: f32,
    /// Ceiling on horizontal speed magnitude
    pub max_horizontal_speed: f32,
    /// Ceiling on vertical speed in either direction
    pub max_vertical_speed: f32,
    /// Capsule height including both caps (default: 1.8m)
    pub height: f32,
    /// Capsule radius (default: 0.4m)
    pub radius: f32,
    /// Body mass
    pub mass: f32,
    /// How far below the capsule the ground probe reaches
    pub ground_probe_distance: f32,
}

impl Default for CharacterConfig {
    fn default() -> Self {
        Self {
            move_speed: 5.0,
            jump_force: 6.0,
            jump_cooldown: 0.2,
            coyote_time: 0.15,
            jump_buffer: 0.15,
            max_horizontal_speed: 10.0,
            max_vertical_speed: 20.0,
            height: 1.8,
            radius: 0.4,
            mass: 1.0,
            ground_probe_distance: 0.2,
        }
    }
}

impl CharacterConfig {
    /// Check every value is usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        let non_negative = [
            ("move_speed", self.move_speed),
            ("jump_force", self.jump_force),
            ("jump_cooldown", self.jump_cooldown),
            ("coyote_time", self.coyote_time),
            ("jump_buffer", self.jump_buffer),
            ("max_horizontal_speed", self.max_horizontal_speed),
            ("max_vertical_speed", self.max_vertical_speed),
            ("ground_probe_distance", self.ground_probe_distance),
        ];
        for (field, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::Negative { field, value });
            }
        }

        let positive = [("height", self.height), ("radius", self.radius), ("mass", self.mass)];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::NotPositive { field, value });
            }
        }
        Ok(())
    }

    /// Physics body description for a capsule spawned at `position`
    pub fn body_desc(&self, position: Vec3) -> CharacterBodyDesc {
        CharacterBodyDesc {
            position,
            radius: self.radius,
            half_height: ((self.height - 2.0 * self.radius) / 2.0).max(0.0),
            mass: self.mass,
            ground_probe_distance: self.ground_probe_distance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CharacterConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.height, 1.8);
        assert_eq!(config.radius, 0.4);
    }

    #[test]
    fn test_validate_rejects_negative_timer() {
        let config = CharacterConfig {
            coyote_time: -0.1,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::Negative {
                field: "coyote_time",
                value: -0.1
            })
        );
    }

    #[test]
    fn test_validate_rejects_zero_mass() {
        let config = CharacterConfig {
            mass: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NotPositive { field: "mass", .. })
        ));
    }

    #[test]
    fn test_body_desc() {
        let desc = CharacterConfig::default().body_desc(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(desc.position, Vec3::new(1.0, 2.0, 3.0));
        assert!((desc.half_height - 0.5).abs() < 1e-6);
        assert!((desc.half_extent() - 0.9).abs() < 1e-6);
    }
}
