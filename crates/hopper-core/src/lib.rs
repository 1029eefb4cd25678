//! Hopper Core - shared types for the Hopper demo
//!
//! Frame time with delta clamping, pause, time scale and a fixed-step
//! accumulator for physics stepping.

pub mod time;

pub use time::{GameTime, TimeConfig, TimeConfigError};
