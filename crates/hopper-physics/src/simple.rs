//! Simplified in-process physics
//!
//! Integrates each character explicitly under gravity and resolves overlaps
//! against static ground planes and boxes. The capsule is treated as its
//! bounding box for collision and as a single centre column for the ground
//! probe.

use glam::Vec3;
use tracing::debug;

use crate::{BodyHandle, CharacterBodyDesc, PhysicsBackend, PhysicsConfig, PhysicsError};

#[derive(Debug, Clone, Copy)]
struct SimpleBody {
    position: Vec3,
    velocity: Vec3,
    desc: CharacterBodyDesc,
}

impl SimpleBody {
    fn half_extents(&self) -> Vec3 {
        Vec3::new(self.desc.radius, self.desc.half_extent(), self.desc.radius)
    }

    fn bottom(&self) -> f32 {
        self.position.y - self.desc.half_extent()
    }
}

#[derive(Debug, Clone, Copy)]
enum StaticShape {
    Ground { y: f32 },
    Box { min: Vec3, max: Vec3 },
}

#[derive(Debug, Default)]
struct Slot {
    generation: u32,
    body: Option<SimpleBody>,
}

/// Fallback physics world with explicit position integration
pub struct SimplePhysics {
    /// Configuration
    pub config: PhysicsConfig,
    slots: Vec<Slot>,
    statics: Vec<StaticShape>,
}

impl SimplePhysics {
    /// Create a world with default configuration
    pub fn new() -> Self {
        Self {
            config: PhysicsConfig::default(),
            slots: Vec::new(),
            statics: Vec::new(),
        }
    }

    /// Create a world with custom configuration
    pub fn with_config(config: PhysicsConfig) -> Result<Self, PhysicsError> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::new()
        })
    }

    fn body(&self, handle: BodyHandle) -> Option<&SimpleBody> {
        let (index, generation) = handle.into_raw_parts();
        let slot = self.slots.get(index as usize)?;
        if slot.generation != generation {
            return None;
        }
        slot.body.as_ref()
    }

    fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut SimpleBody> {
        let (index, generation) = handle.into_raw_parts();
        let slot = self.slots.get_mut(index as usize)?;
        if slot.generation != generation {
            return None;
        }
        slot.body.as_mut()
    }

    /// Push a body out of a static shape, killing velocity into the surface
    fn resolve(body: &mut SimpleBody, shape: &StaticShape) {
        match *shape {
            StaticShape::Ground { y } => {
                let depth = y - body.bottom();
                if depth > 0.0 {
                    body.position.y += depth;
                    body.velocity.y = body.velocity.y.max(0.0);
                }
            }
            StaticShape::Box { min, max } => {
                let half = body.half_extents();
                let body_min = body.position - half;
                let body_max = body.position + half;
                // Penetration towards the negative and positive side of each axis
                let push_neg = body_max - min;
                let push_pos = max - body_min;
                if push_neg.min_element() <= 0.0 || push_pos.min_element() <= 0.0 {
                    return;
                }

                let mut best = (f32::MAX, 0usize, 0.0f32);
                for axis in 0..3 {
                    if push_neg[axis] < best.0 {
                        best = (push_neg[axis], axis, -1.0);
                    }
                    if push_pos[axis] < best.0 {
                        best = (push_pos[axis], axis, 1.0);
                    }
                }
                let (depth, axis, sign) = best;
                body.position[axis] += depth * sign;
                if body.velocity[axis] * sign < 0.0 {
                    body.velocity[axis] = 0.0;
                }
            }
        }
    }

    /// Whether the downward probe from `body` reaches `shape`
    fn probe_hits(body: &SimpleBody, shape: &StaticShape) -> bool {
        let probe_end = body.position.y - body.desc.probe_length();
        match *shape {
            StaticShape::Ground { y } => y >= probe_end,
            StaticShape::Box { min, max } => {
                let p = body.position;
                let in_column = p.x >= min.x && p.x <= max.x && p.z >= min.z && p.z <= max.z;
                in_column && max.y >= probe_end && min.y <= p.y
            }
        }
    }
}

impl Default for SimplePhysics {
    fn default() -> Self {
        Self::new()
    }
}

impl PhysicsBackend for SimplePhysics {
    fn name(&self) -> &'static str {
        "simple"
    }

    fn create_character_body(
        &mut self,
        desc: &CharacterBodyDesc,
    ) -> Result<BodyHandle, PhysicsError> {
        desc.validate()?;
        let body = SimpleBody {
            position: desc.position,
            velocity: Vec3::ZERO,
            desc: *desc,
        };

        let index = match self.slots.iter().position(|slot| slot.body.is_none()) {
            Some(index) => index,
            None => {
                self.slots.push(Slot::default());
                self.slots.len() - 1
            }
        };
        let slot = &mut self.slots[index];
        slot.body = Some(body);

        debug!("Spawned simple character body at {}", desc.position);
        Ok(BodyHandle::from_raw_parts(index as u32, slot.generation))
    }

    fn remove_body(&mut self, body: BodyHandle) -> bool {
        let (index, generation) = body.into_raw_parts();
        match self.slots.get_mut(index as usize) {
            Some(slot) if slot.generation == generation && slot.body.is_some() => {
                slot.body = None;
                slot.generation = slot.generation.wrapping_add(1);
                true
            }
            _ => false,
        }
    }

    fn add_ground(&mut self, y: f32) {
        self.statics.push(StaticShape::Ground { y });
    }

    fn add_static_box(&mut self, half_extents: Vec3, position: Vec3) {
        let half_extents = half_extents.abs();
        self.statics.push(StaticShape::Box {
            min: position - half_extents,
            max: position + half_extents,
        });
    }

    fn step(&mut self, dt: f32) {
        if !(dt.is_finite() && dt > 0.0) {
            return;
        }
        let gravity = self.config.gravity;
        let statics = &self.statics;

        for body in self.slots.iter_mut().filter_map(|slot| slot.body.as_mut()) {
            body.velocity += gravity * dt;
            body.position += body.velocity * dt;
            for shape in statics {
                Self::resolve(body, shape);
            }
        }
    }

    fn is_grounded(&self, body: BodyHandle) -> Option<bool> {
        let body = self.body(body)?;
        Some(self.statics.iter().any(|shape| Self::probe_hits(body, shape)))
    }

    fn velocity(&self, body: BodyHandle) -> Option<Vec3> {
        self.body(body).map(|b| b.velocity)
    }

    fn set_velocity(&mut self, body: BodyHandle, velocity: Vec3) -> bool {
        match self.body_mut(body) {
            Some(b) => {
                b.velocity = velocity;
                true
            }
            None => false,
        }
    }

    fn apply_impulse(&mut self, body: BodyHandle, impulse: Vec3) -> bool {
        match self.body_mut(body) {
            Some(b) => {
                b.velocity += impulse / b.desc.mass;
                true
            }
            None => false,
        }
    }

    fn position(&self, body: BodyHandle) -> Option<Vec3> {
        self.body(body).map(|b| b.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spawn(physics: &mut SimplePhysics, position: Vec3) -> BodyHandle {
        physics
            .create_character_body(&CharacterBodyDesc {
                position,
                ..Default::default()
            })
            .unwrap()
    }

    #[test]
    fn test_body_falls_onto_ground() {
        let mut physics = SimplePhysics::new();
        physics.add_ground(0.0);
        let body = spawn(&mut physics, Vec3::new(0.0, 5.0, 0.0));
        assert_eq!(physics.is_grounded(body), Some(false));

        for _ in 0..120 {
            physics.step(1.0 / 60.0);
        }

        let position = physics.position(body).unwrap();
        assert!((position.y - 0.9).abs() < 1e-4, "rest height {}", position.y);
        assert!(physics.velocity(body).unwrap().y.abs() < 0.2);
        assert_eq!(physics.is_grounded(body), Some(true));
    }

    #[test]
    fn test_lands_on_box_top() {
        let mut physics = SimplePhysics::new();
        physics.add_static_box(Vec3::new(1.0, 0.5, 1.0), Vec3::new(0.0, 0.5, 0.0));
        let body = spawn(&mut physics, Vec3::new(0.0, 3.0, 0.0));
        for _ in 0..120 {
            physics.step(1.0 / 60.0);
        }
        let position = physics.position(body).unwrap();
        assert!((position.y - 1.9).abs() < 1e-3, "rest height {}", position.y);
        assert_eq!(physics.is_grounded(body), Some(true));
    }

    #[test]
    fn test_wall_stops_horizontal_motion() {
        let mut physics = SimplePhysics::with_config(PhysicsConfig { gravity: Vec3::ZERO })
        .unwrap();
        physics.add_static_box(Vec3::new(0.5, 5.0, 5.0), Vec3::new(2.0, 0.0, 0.0));
        let body = spawn(&mut physics, Vec3::ZERO);
        physics.set_velocity(body, Vec3::new(3.0, 0.0, 0.0));
        for _ in 0..60 {
            physics.step(1.0 / 60.0);
        }
        let position = physics.position(body).unwrap();
        assert!((position.x - 1.1).abs() < 1e-3, "stopped at {}", position.x);
        assert_eq!(physics.velocity(body).unwrap().x, 0.0);
    }

    #[test]
    fn test_probe_misses_beyond_tolerance() {
        let mut physics = SimplePhysics::new();
        physics.add_ground(0.0);
        // Bottom at 0.3, probe reaches 0.2 below it
        let body = spawn(&mut physics, Vec3::new(0.0, 1.2, 0.0));
        assert_eq!(physics.is_grounded(body), Some(false));
        let close = spawn(&mut physics, Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(physics.is_grounded(close), Some(true));
    }

    #[test]
    fn test_impulse_respects_mass() {
        let mut physics = SimplePhysics::new();
        let body = physics
            .create_character_body(&CharacterBodyDesc {
                mass: 2.0,
                ..Default::default()
            })
            .unwrap();
        physics.apply_impulse(body, Vec3::new(0.0, 6.0, 0.0));
        assert_eq!(physics.velocity(body), Some(Vec3::new(0.0, 3.0, 0.0)));
    }

    #[test]
    fn test_stale_handle_after_slot_reuse() {
        let mut physics = SimplePhysics::new();
        let first = spawn(&mut physics, Vec3::ZERO);
        assert!(physics.remove_body(first));
        let second = spawn(&mut physics, Vec3::ONE);
        assert_ne!(first, second);
        assert_eq!(physics.position(first), None);
        assert_eq!(physics.position(second), Some(Vec3::ONE));
    }

    #[test]
    fn test_bad_step_is_ignored() {
        let mut physics = SimplePhysics::new();
        let body = spawn(&mut physics, Vec3::ZERO);
        physics.step(f32::NAN);
        physics.step(-1.0);
        assert_eq!(physics.position(body), Some(Vec3::ZERO));
        assert_eq!(physics.velocity(body), Some(Vec3::ZERO));
    }
}
