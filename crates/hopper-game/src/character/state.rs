//! Per-character control state

use glam::Vec3;
use serde::Serialize;

/// Coarse classification of where the jump logic stands, for overlays and logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum JumpPhase {
    /// Nothing pending and no jump available right now
    #[default]
    Idle,
    /// A jump was asked for but cannot fire yet
    Requested,
    /// Grounded or in coyote time with the cooldown elapsed
    Armed,
    /// A jump fired and the character has not landed since
    Airborne,
}

/// Everything the character controller remembers between frames.
///
/// Timers count down in seconds and never go below zero.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct CharacterState {
    /// Result of this frame's ground probe
    pub is_grounded: bool,
    /// Previous frame's grounded value
    pub was_grounded: bool,
    /// Set when a jump fires, cleared on landing
    pub is_jumping: bool,
    /// Time before another jump may fire
    pub jump_cooldown_timer: f32,
    /// Time left to jump after walking off a ledge
    pub coyote_time_timer: f32,
    /// Time left for an early jump press to fire on touchdown
    pub jump_buffer_timer: f32,
    /// Latched on the press edge, cleared on release or when a jump fires
    pub jump_requested: bool,
    /// Jump input as sampled last frame
    pub jump_held: bool,
    /// Last velocity written to the body
    pub velocity: Vec3,
    /// Derived at the end of every update
    pub phase: JumpPhase,
}

impl CharacterState {
    /// Whether grounding alone (ground or coyote time) would allow a jump
    pub fn has_footing(&self) -> bool {
        self.is_grounded || self.coyote_time_timer > 0.0
    }

    /// Whether the cooldown from the last jump has run out
    pub fn cooldown_ready(&self) -> bool {
        self.jump_cooldown_timer <= 0.0
    }

    pub(crate) fn classify(&self) -> JumpPhase {
        if self.is_jumping {
            JumpPhase::Airborne
        } else if self.jump_requested || self.jump_buffer_timer > 0.0 {
            JumpPhase::Requested
        } else if self.has_footing() && self.cooldown_ready() {
            JumpPhase::Armed
        } else {
            JumpPhase::Idle
        }
    }
}
