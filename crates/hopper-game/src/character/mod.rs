//! Character control
//!
//! A physics-driven capsule with platformer jump assists: coyote time, jump
//! buffering and a cooldown, layered over whatever [`PhysicsBackend`] runs.
//!
//! [`PhysicsBackend`]: hopper_physics::PhysicsBackend

mod config;
mod controller;
mod state;

pub use config::{CharacterConfig, ConfigError};
pub use controller::CharacterControl;
pub use state::{CharacterState, JumpPhase};
