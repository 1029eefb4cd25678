//! Camera configuration

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Follow camera configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FollowCameraConfig {
    /// Camera position relative to the character
    pub offset: Vec3,
    /// Height above the character centre the camera looks at
    pub look_height: f32,
    /// Follow stiffness per second (higher = snappier, 0 = frozen)
    pub smoothing: f32,
}

impl Default for FollowCameraConfig {
    fn default() -> Self {
        Self {
            offset: Vec3::new(0.0, 3.0, 6.0),
            look_height: 0.5,
            smoothing: 8.0,
        }
    }
}
