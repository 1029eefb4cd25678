//! Camera that trails the character

use glam::{Mat4, Vec3};

use super::FollowCameraConfig;

/// Camera controller
#[derive(Debug, Clone)]
pub struct FollowCamera {
    /// Configuration
    pub config: FollowCameraConfig,
    /// Camera world position
    position: Vec3,
    /// Point the camera is looking at
    target: Vec3,
    /// Whether the first update has happened
    initialized: bool,
}

impl FollowCamera {
    /// Create a new follow camera
    pub fn new() -> Self {
        Self::with_config(FollowCameraConfig::default())
    }

    /// Create a follow camera with custom config
    pub fn with_config(config: FollowCameraConfig) -> Self {
        Self {
            config,
            position: Vec3::ZERO,
            target: Vec3::ZERO,
            initialized: false,
        }
    }

    /// Get the camera's current world position
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Get the point the camera is looking at
    pub fn target(&self) -> Vec3 {
        self.target
    }

    /// Get the view matrix
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    /// Skip smoothing on the next update (after a teleport or respawn)
    pub fn snap(&mut self) {
        self.initialized = false;
    }

    /// Move towards the resting spot for `focus` (call each frame)
    pub fn update(&mut self, focus: Vec3, dt: f32) {
        let desired = focus + self.config.offset;
        self.target = focus + Vec3::Y * self.config.look_height;

        if !self.initialized {
            self.position = desired;
            self.initialized = true;
            return;
        }

        // Exponential approach, independent of frame rate
        let t = 1.0 - (-self.config.smoothing.max(0.0) * dt.max(0.0)).exp();
        if t.is_finite() {
            self.position = self.position.lerp(desired, t);
        }
    }
}

impl Default for FollowCamera {
    fn default() -> Self {
        Self::new()
    }
}
