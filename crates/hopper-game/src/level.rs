//! Static demo level: a ground plane and a few platforms to jump onto

use glam::Vec3;
use hopper_physics::PhysicsBackend;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A static box in the level
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    /// Half size along each axis
    pub half_extents: Vec3,
    /// Box centre
    pub position: Vec3,
}

impl Platform {
    /// Height of the walkable top face
    pub fn top(&self) -> f32 {
        self.position.y + self.half_extents.y
    }
}

/// Layout of the demo level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoLevel {
    /// Height of the ground plane, or `None` for a bottomless level
    pub ground_height: Option<f32>,
    /// Static platforms
    pub platforms: Vec<Platform>,
    /// Where the character (re)spawns, as capsule centre
    pub spawn_point: Vec3,
    /// Falling below this height respawns the character
    pub kill_height: f32,
}

impl Default for DemoLevel {
    fn default() -> Self {
        Self {
            ground_height: Some(0.0),
            platforms: vec![
                Platform {
                    half_extents: Vec3::new(1.5, 0.25, 1.5),
                    position: Vec3::new(5.0, 0.75, 0.0),
                },
                Platform {
                    half_extents: Vec3::new(1.5, 0.25, 1.5),
                    position: Vec3::new(9.0, 1.75, 0.0),
                },
                Platform {
                    half_extents: Vec3::new(1.0, 0.25, 1.0),
                    position: Vec3::new(13.0, 2.75, 3.0),
                },
            ],
            spawn_point: Vec3::new(0.0, 2.0, 0.0),
            kill_height: -20.0,
        }
    }
}

impl DemoLevel {
    /// Add the level's static geometry to a physics world
    pub fn build(&self, physics: &mut dyn PhysicsBackend) {
        if let Some(y) = self.ground_height {
            physics.add_ground(y);
        }
        for platform in &self.platforms {
            physics.add_static_box(platform.half_extents, platform.position);
        }
        debug!(
            "Built demo level with {} platforms on {}",
            self.platforms.len(),
            physics.name()
        );
    }

    /// Whether a character at `position` has fallen out of the level
    pub fn is_out_of_bounds(&self, position: Vec3) -> bool {
        position.y < self.kill_height
    }
}
