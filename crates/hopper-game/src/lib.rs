//! Hopper Game - character control and the per-frame loop
//!
//! Provides the character controller, input mapping, follow camera, demo
//! level and the frame driver that ties them to a physics backend.

pub mod camera;
pub mod character;
pub mod driver;
pub mod input;
pub mod level;

pub use camera::{FollowCamera, FollowCameraConfig};
pub use character::{CharacterConfig, CharacterControl, CharacterState, ConfigError, JumpPhase};
pub use driver::{FrameDriver, FrameSnapshot};
pub use input::{CharacterInput, InputAction, InputBindings, InputHandler, InputSource, InputState};
pub use level::{DemoLevel, Platform};
