//! Hopper Physics - the physics capability used by the character controller
//!
//! The controller only talks to [`PhysicsBackend`]. Two implementations exist:
//! `RapierPhysics` on top of rapier3d (the default `rapier` feature), and
//! [`SimplePhysics`], an in-process fallback with explicit integration and box
//! overlap tests. Which one runs is decided once at startup by
//! [`create_backend`].

#[cfg(feature = "rapier")]
mod rapier;
mod simple;

#[cfg(feature = "rapier")]
pub use rapier::RapierPhysics;
pub use simple::SimplePhysics;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Physics world configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Gravity vector (default: -9.81 on Y axis)
    pub gravity: Vec3,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: Vec3::new(0.0, -9.81, 0.0),
        }
    }
}

impl PhysicsConfig {
    /// Check that all values are usable by every backend
    pub fn validate(&self) -> Result<(), PhysicsError> {
        if !self.gravity.is_finite() {
            return Err(PhysicsError::InvalidGravity(self.gravity));
        }
        Ok(())
    }
}

/// Errors raised while bringing up a physics backend
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PhysicsError {
    #[error("gravity must be finite, got {0}")]
    InvalidGravity(Vec3),

    #[error("{0} backend is not compiled in")]
    BackendUnavailable(&'static str),

    #[error("character body description is invalid: {0}")]
    InvalidBody(String),
}

/// Which backend to bring up at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Try rapier first, fall back to the simple backend
    #[default]
    Auto,
    /// Require the rapier3d backend
    Rapier,
    /// Require the simple fallback backend
    Simple,
}

/// Opaque reference to a character body owned by a backend.
///
/// A handle stays valid until the body is removed; afterwards every query
/// made with it reports the body as absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyHandle {
    index: u32,
    generation: u32,
}

impl BodyHandle {
    /// Build a handle from a backend's slot index and generation
    pub fn from_raw_parts(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Split a handle back into slot index and generation
    pub fn into_raw_parts(self) -> (u32, u32) {
        (self.index, self.generation)
    }
}

/// Shape and probe settings for a character capsule
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CharacterBodyDesc {
    /// Capsule centre at spawn
    pub position: Vec3,
    /// Capsule radius
    pub radius: f32,
    /// Half the height of the cylindrical section
    pub half_height: f32,
    /// Body mass (an impulse of `mass` changes velocity by one unit)
    pub mass: f32,
    /// How far below the capsule bottom the ground probe reaches
    pub ground_probe_distance: f32,
}

impl Default for CharacterBodyDesc {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            radius: 0.4,
            half_height: 0.5,
            mass: 1.0,
            ground_probe_distance: 0.2,
        }
    }
}

impl CharacterBodyDesc {
    /// Distance from the capsule centre to its bottom
    pub fn half_extent(&self) -> f32 {
        self.half_height + self.radius
    }

    /// Length of the downward ground probe measured from the capsule centre
    pub fn probe_length(&self) -> f32 {
        self.half_extent() + self.ground_probe_distance
    }

    /// Check the description can be turned into a body
    pub fn validate(&self) -> Result<(), PhysicsError> {
        let positive = |v: f32| v.is_finite() && v > 0.0;
        if !self.position.is_finite() {
            return Err(PhysicsError::InvalidBody(format!(
                "position {} is not finite",
                self.position
            )));
        }
        if !positive(self.radius) || !(self.half_height.is_finite() && self.half_height >= 0.0) {
            return Err(PhysicsError::InvalidBody(format!(
                "capsule radius {} / half height {} out of range",
                self.radius, self.half_height
            )));
        }
        if !positive(self.mass) {
            return Err(PhysicsError::InvalidBody(format!("mass {} out of range", self.mass)));
        }
        if !(self.ground_probe_distance.is_finite() && self.ground_probe_distance >= 0.0) {
            return Err(PhysicsError::InvalidBody(format!(
                "ground probe distance {} out of range",
                self.ground_probe_distance
            )));
        }
        Ok(())
    }
}

/// The operations the character controller needs from a physics engine.
///
/// Queries return `None` and commands return `false` when the body is absent.
pub trait PhysicsBackend {
    /// Short name for logs
    fn name(&self) -> &'static str;

    /// Create a dynamic capsule body for a character
    fn create_character_body(
        &mut self,
        desc: &CharacterBodyDesc,
    ) -> Result<BodyHandle, PhysicsError>;

    /// Remove a body; returns `false` if it was already gone
    fn remove_body(&mut self, body: BodyHandle) -> bool;

    /// Add an infinite static ground plane at height `y`
    fn add_ground(&mut self, y: f32);

    /// Add a static axis-aligned box
    fn add_static_box(&mut self, half_extents: Vec3, position: Vec3);

    /// Advance the simulation by `dt` seconds
    fn step(&mut self, dt: f32);

    /// Probe straight down from the body, ignoring the body itself
    fn is_grounded(&self, body: BodyHandle) -> Option<bool>;

    /// Current linear velocity
    fn velocity(&self, body: BodyHandle) -> Option<Vec3>;

    /// Overwrite the linear velocity
    fn set_velocity(&mut self, body: BodyHandle, velocity: Vec3) -> bool;

    /// Apply an instantaneous impulse
    fn apply_impulse(&mut self, body: BodyHandle, impulse: Vec3) -> bool;

    /// Current position of the capsule centre
    fn position(&self, body: BodyHandle) -> Option<Vec3>;
}

/// Bring up a physics backend.
///
/// With [`BackendKind::Auto`] the rapier backend is tried first and the simple
/// backend is used if this build does not include rapier.
pub fn create_backend(
    kind: BackendKind,
    config: &PhysicsConfig,
) -> Result<Box<dyn PhysicsBackend>, PhysicsError> {
    let backend = match kind {
        BackendKind::Rapier => rapier_backend(config)?,
        BackendKind::Simple => simple_backend(config)?,
        BackendKind::Auto => match rapier_backend(config) {
            Ok(rapier) => rapier,
            Err(PhysicsError::BackendUnavailable(name)) => {
                warn!("{} backend unavailable, using simple physics", name);
                simple_backend(config)?
            }
            Err(e) => return Err(e),
        },
    };
    info!("Physics backend: {}", backend.name());
    Ok(backend)
}

fn simple_backend(config: &PhysicsConfig) -> Result<Box<dyn PhysicsBackend>, PhysicsError> {
    Ok(Box::new(SimplePhysics::with_config(config.clone())?))
}

#[cfg(feature = "rapier")]
fn rapier_backend(config: &PhysicsConfig) -> Result<Box<dyn PhysicsBackend>, PhysicsError> {
    Ok(Box::new(RapierPhysics::with_config(config.clone())?))
}

#[cfg(not(feature = "rapier"))]
fn rapier_backend(_config: &PhysicsConfig) -> Result<Box<dyn PhysicsBackend>, PhysicsError> {
    Err(PhysicsError::BackendUnavailable("rapier"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_physics_config_default() {
        let config = PhysicsConfig::default();
        assert_eq!(config.gravity, Vec3::new(0.0, -9.81, 0.0));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_body_desc_validation() {
        assert!(CharacterBodyDesc::default().validate().is_ok());
        let desc = CharacterBodyDesc {
            mass: 0.0,
            ..Default::default()
        };
        assert!(matches!(desc.validate(), Err(PhysicsError::InvalidBody(_))));
        let desc = CharacterBodyDesc {
            position: Vec3::new(f32::NAN, 0.0, 0.0),
            ..Default::default()
        };
        assert!(desc.validate().is_err());
    }

    #[test]
    fn test_probe_length() {
        let desc = CharacterBodyDesc::default();
        assert!((desc.half_extent() - 0.9).abs() < 1e-6);
        assert!((desc.probe_length() - 1.1).abs() < 1e-6);
    }

    #[test]
    #[cfg(feature = "rapier")]
    fn test_create_backend_kinds() {
        let config = PhysicsConfig::default();
        assert_eq!(create_backend(BackendKind::Rapier, &config).unwrap().name(), "rapier");
        assert_eq!(create_backend(BackendKind::Simple, &config).unwrap().name(), "simple");
        assert_eq!(create_backend(BackendKind::Auto, &config).unwrap().name(), "rapier");
    }

    #[test]
    #[cfg(not(feature = "rapier"))]
    fn test_auto_falls_back_to_simple() {
        let config = PhysicsConfig::default();
        assert_eq!(
            create_backend(BackendKind::Rapier, &config).err(),
            Some(PhysicsError::BackendUnavailable("rapier"))
        );
        assert_eq!(create_backend(BackendKind::Auto, &config).unwrap().name(), "simple");
        assert_eq!(create_backend(BackendKind::Simple, &config).unwrap().name(), "simple");
    }

    #[test]
    fn test_bad_gravity_fails_everywhere() {
        let config = PhysicsConfig {
            gravity: Vec3::new(0.0, f32::NAN, 0.0),
        };
        // Auto must not hide a bad config behind the fallback
        for kind in [BackendKind::Auto, BackendKind::Simple] {
            assert!(matches!(
                create_backend(kind, &config).err(),
                Some(PhysicsError::InvalidGravity(_))
            ));
        }
    }
}
