//! Frame driver
//!
//! One call to [`FrameDriver::frame`] is one rendered frame: clamp the raw
//! delta, step physics at the fixed rate, run character control once, then
//! move the camera and report where everything ended up.

use glam::Vec3;
use hopper_core::{GameTime, TimeConfig};
use hopper_physics::{PhysicsBackend, PhysicsError};
use serde::Serialize;
use tracing::{info, warn};

use crate::camera::{FollowCamera, FollowCameraConfig};
use crate::character::{CharacterConfig, CharacterControl, CharacterState};
use crate::input::InputSource;
use crate::level::DemoLevel;

/// What presentation needs after a frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FrameSnapshot {
    /// Frame counter
    pub frame: u64,
    /// Simulated seconds since start
    pub time: f64,
    /// Physics steps run this frame
    pub physics_steps: u32,
    /// Character capsule centre
    pub position: Vec3,
    /// Camera position
    pub camera_position: Vec3,
    /// Camera look target
    pub camera_target: Vec3,
    /// Character control state
    pub character: CharacterState,
}

/// Owns the physics world and runs the per-frame loop
pub struct FrameDriver {
    physics: Box<dyn PhysicsBackend>,
    time: GameTime,
    character: CharacterControl,
    camera: FollowCamera,
    level: DemoLevel,
    last_steps: u32,
    respawns: u32,
}

impl FrameDriver {
    /// Build the level into `physics` and spawn the character
    pub fn new(
        mut physics: Box<dyn PhysicsBackend>,
        time: TimeConfig,
        character: CharacterConfig,
        camera: FollowCameraConfig,
        level: DemoLevel,
    ) -> Result<Self, PhysicsError> {
        level.build(physics.as_mut());
        let mut character = CharacterControl::with_config(character);
        character.spawn(physics.as_mut(), level.spawn_point)?;

        Ok(Self {
            physics,
            time: GameTime::new(time),
            character,
            camera: FollowCamera::with_config(camera),
            level,
            last_steps: 0,
            respawns: 0,
        })
    }

    /// Run one frame with the raw wall-clock delta since the last one
    pub fn frame(&mut self, input: &(impl InputSource + ?Sized), raw_delta: f32) -> FrameSnapshot {
        self.time.update(raw_delta);

        let steps = self.time.fixed_steps();
        let fixed = self.time.config.fixed_timestep;
        for _ in 0..steps {
            self.physics.step(fixed);
        }
        self.last_steps = steps;

        if !self.time.paused {
            let dt = self.time.delta_time;
            self.character.update(self.physics.as_mut(), input, dt);

            let position = self.character.position(self.physics.as_ref());
            if self.level.is_out_of_bounds(position) {
                info!("Character fell out of the level at {}, respawning", position);
                if let Err(e) = self.respawn() {
                    warn!("Respawn failed: {}", e);
                }
            }
            self.camera
                .update(self.character.position(self.physics.as_ref()), dt);
        }

        self.snapshot()
    }

    /// Put the character back at the spawn point with fresh state
    pub fn respawn(&mut self) -> Result<(), PhysicsError> {
        self.character
            .spawn(self.physics.as_mut(), self.level.spawn_point)?;
        self.camera.snap();
        self.respawns += 1;
        Ok(())
    }

    /// Current state without advancing anything
    pub fn snapshot(&self) -> FrameSnapshot {
        FrameSnapshot {
            frame: self.time.frame_count,
            time: self.time.total_time,
            physics_steps: self.last_steps,
            position: self.character.position(self.physics.as_ref()),
            camera_position: self.camera.position(),
            camera_target: self.camera.target(),
            character: self.character.state(),
        }
    }

    /// Frame time
    pub fn time(&self) -> &GameTime {
        &self.time
    }

    /// Frame time, for pausing and time scale
    pub fn time_mut(&mut self) -> &mut GameTime {
        &mut self.time
    }

    /// The character controller
    pub fn character(&self) -> &CharacterControl {
        &self.character
    }

    /// The physics backend in use
    pub fn physics(&self) -> &dyn PhysicsBackend {
        self.physics.as_ref()
    }

    /// How many times the character has been respawned
    pub fn respawns(&self) -> u32 {
        self.respawns
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::CharacterInput;
    use glam::Vec2;
    use hopper_physics::{create_backend, BackendKind, PhysicsConfig};

    const FRAME: f32 = 1.0 / 60.0;

    fn driver(kind: BackendKind, level: DemoLevel) -> FrameDriver {
        let physics = create_backend(kind, &PhysicsConfig::default()).unwrap();
        FrameDriver::new(
            physics,
            TimeConfig::default(),
            CharacterConfig::default(),
            FollowCameraConfig::default(),
            level,
        )
        .unwrap()
    }

    fn run(driver: &mut FrameDriver, input: CharacterInput, frames: u32) -> FrameSnapshot {
        let mut last = driver.snapshot();
        for _ in 0..frames {
            last = driver.frame(&input, FRAME);
        }
        last
    }

    #[test]
    fn test_settles_on_ground() {
        let mut driver = driver(BackendKind::Simple, DemoLevel::default());
        let snapshot = run(&mut driver, CharacterInput::default(), 90);
        assert!(snapshot.character.is_grounded);
        assert!((snapshot.position.y - 0.9).abs() < 0.01, "y = {}", snapshot.position.y);
        assert_eq!(snapshot.physics_steps, 1);
    }

    #[test]
    fn test_walks_forward() {
        let mut driver = driver(BackendKind::Simple, DemoLevel::default());
        run(&mut driver, CharacterInput::default(), 60);
        let start = driver.snapshot().position;

        let forward = CharacterInput::moving(Vec2::new(0.0, -1.0));
        let end = run(&mut driver, forward, 60).position;

        // Roughly one second at 5 m/s
        let travelled = start.z - end.z;
        assert!(travelled > 4.0 && travelled < 5.5, "travelled {}", travelled);
        assert!((end.x - start.x).abs() < 1e-3);
    }

    fn jump_round_trip(kind: BackendKind) {
        let mut driver = driver(kind, DemoLevel::default());
        let rest = run(&mut driver, CharacterInput::default(), 120).position.y;

        let snapshot = driver.frame(&CharacterInput::default().with_jump(), FRAME);
        assert!(snapshot.character.is_jumping);

        let mut apex = rest;
        let mut landed_after = None;
        for frame in 0..180 {
            let snapshot = driver.frame(&CharacterInput::default(), FRAME);
            apex = apex.max(snapshot.position.y);
            if !snapshot.character.is_jumping {
                landed_after = Some(frame);
                break;
            }
        }

        // v = 6 m/s under 9.81 m/s^2 peaks around 1.8m
        assert!(apex - rest > 1.2, "apex only {} above rest", apex - rest);
        assert!(apex - rest < 2.4, "apex {} above rest", apex - rest);
        let landed_after = landed_after.expect("never landed");
        assert!(landed_after > 30, "landed after {} frames", landed_after);
    }

    #[test]
    fn test_jump_round_trip_simple() {
        jump_round_trip(BackendKind::Simple);
    }

    #[test]
    fn test_jump_round_trip_rapier() {
        jump_round_trip(BackendKind::Rapier);
    }

    #[test]
    fn test_jump_onto_platform() {
        let mut driver = driver(BackendKind::Simple, DemoLevel::default());
        run(&mut driver, CharacterInput::default(), 60);

        // First platform: top at 1.0, spans x 3.5..6.5
        let right = CharacterInput::moving(Vec2::X);
        run(&mut driver, right, 13);
        run(&mut driver, right.with_jump(), 1);
        let snapshot = run(&mut driver, right, 40);
        assert!(snapshot.position.x > 3.5, "x = {}", snapshot.position.x);
        assert!(snapshot.character.is_jumping);

        let snapshot = run(&mut driver, CharacterInput::default(), 60);
        assert!(snapshot.character.is_grounded);
        assert!(!snapshot.character.is_jumping);
        assert!((snapshot.position.y - 1.9).abs() < 0.01, "y = {}", snapshot.position.y);
    }

    #[test]
    fn test_respawns_after_falling_out() {
        let level = DemoLevel {
            ground_height: None,
            platforms: Vec::new(),
            spawn_point: Vec3::new(0.0, 5.0, 0.0),
            kill_height: -5.0,
        };
        let mut driver = driver(BackendKind::Simple, level);
        run(&mut driver, CharacterInput::default(), 180);
        assert!(driver.respawns() >= 1);
        assert!(driver.snapshot().position.y > -5.0);
    }

    #[test]
    fn test_hitch_is_clamped() {
        let mut driver = driver(BackendKind::Simple, DemoLevel::default());
        let snapshot = driver.frame(&CharacterInput::default(), 3.0);
        assert_eq!(driver.time().delta_time, 0.1);
        assert!(snapshot.physics_steps <= 6);
    }

    #[test]
    fn test_fixed_timestep_drives_physics_steps() {
        let physics = create_backend(BackendKind::Simple, &PhysicsConfig::default()).unwrap();
        let time = TimeConfig {
            fixed_timestep: 1.0 / 120.0,
            ..Default::default()
        };
        let mut driver = FrameDriver::new(
            physics,
            time,
            CharacterConfig::default(),
            FollowCameraConfig::default(),
            DemoLevel::default(),
        )
        .unwrap();
        let snapshot = driver.frame(&CharacterInput::default(), FRAME);
        assert_eq!(snapshot.physics_steps, 2);
    }

    #[test]
    fn test_pause_freezes_character() {
        let mut driver = driver(BackendKind::Simple, DemoLevel::default());
        run(&mut driver, CharacterInput::default(), 60);
        let before = driver.snapshot();

        driver.time_mut().pause();
        let forward = CharacterInput::moving(Vec2::new(0.0, -1.0)).with_jump();
        let after = run(&mut driver, forward, 30);
        assert_eq!(after.position, before.position);
        assert_eq!(after.character, before.character);
        assert_eq!(after.physics_steps, 0);
    }

    #[test]
    fn test_camera_follows() {
        let mut driver = driver(BackendKind::Simple, DemoLevel::default());
        let snapshot = run(&mut driver, CharacterInput::default(), 120);
        let offset = FollowCameraConfig::default().offset;
        assert!((snapshot.camera_position - (snapshot.position + offset)).length() < 0.05);
    }

    #[test]
    fn test_snapshot_before_first_frame() {
        let driver = driver(BackendKind::Simple, DemoLevel::default());
        let snapshot = driver.snapshot();
        assert_eq!(snapshot.frame, 0);
        assert_eq!(snapshot.position, Vec3::new(0.0, 2.0, 0.0));
        assert_eq!(driver.physics().name(), "simple");
    }
}
