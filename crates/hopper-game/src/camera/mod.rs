//! Follow camera module

mod config;
mod controller;

pub use config::FollowCameraConfig;
pub use controller::FollowCamera;
