//! Character control state machine
//!
//! Each update reads the ground probe and velocity from the physics backend,
//! advances the jump timers, shapes a new velocity from input and writes it
//! back together with at most one jump impulse.

use glam::{Vec2, Vec3};
use hopper_physics::{BodyHandle, PhysicsBackend, PhysicsError};
use tracing::{debug, trace};

use crate::input::InputSource;

use super::{CharacterConfig, CharacterState};

/// Timers closer to zero than this count as expired
const TIMER_EPSILON: f32 = 1e-6;

/// Upward speed above which a jumping character is still rising
const RISE_EPSILON: f32 = 0.05;

/// What made a jump fire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JumpTrigger {
    /// Fresh press while grounded or in coyote time
    Immediate,
    /// Earlier press remembered until touchdown
    Buffered,
}

/// Count a timer down, snapping to zero at the end
fn tick(timer: f32, dt: f32) -> f32 {
    let remaining = timer - dt;
    if remaining <= TIMER_EPSILON {
        0.0
    } else {
        remaining
    }
}

/// Unit-or-shorter direction; garbage input means no movement
fn sanitize_direction(direction: Vec2) -> Vec2 {
    if !direction.is_finite() {
        Vec2::ZERO
    } else if direction.length_squared() > 1.0 {
        direction.normalize()
    } else {
        direction
    }
}

/// Scale horizontal speed down uniformly and cap vertical speed
fn clamp_velocity(velocity: Vec3, max_horizontal: f32, max_vertical: f32) -> Vec3 {
    let horizontal = Vec2::new(velocity.x, velocity.z).clamp_length_max(max_horizontal);
    Vec3::new(
        horizontal.x,
        velocity.y.clamp(-max_vertical, max_vertical),
        horizontal.y,
    )
}

/// Shrink a jump impulse so the body leaves no faster than the vertical cap
fn cap_jump_impulse(impulse: Vec3, vertical: f32, config: &CharacterConfig) -> Vec3 {
    let headroom = (config.max_vertical_speed - vertical).max(0.0) * config.mass.max(0.0);
    Vec3::new(impulse.x, impulse.y.min(headroom), impulse.z)
}

/// Drives one character body from input
#[derive(Debug, Clone)]
pub struct CharacterControl {
    config: CharacterConfig,
    state: CharacterState,
    body: Option<BodyHandle>,
}

impl CharacterControl {
    /// Create a controller with default tuning
    pub fn new() -> Self {
        Self::with_config(CharacterConfig::default())
    }

    /// Create a controller with custom tuning
    pub fn with_config(config: CharacterConfig) -> Self {
        Self {
            config,
            state: CharacterState::default(),
            body: None,
        }
    }

    /// Tuning values in use
    pub fn config(&self) -> &CharacterConfig {
        &self.config
    }

    /// The physics body, if spawned
    pub fn body(&self) -> Option<BodyHandle> {
        self.body
    }

    /// Create the capsule body at `position`, replacing any previous one
    pub fn spawn(
        &mut self,
        physics: &mut dyn PhysicsBackend,
        position: Vec3,
    ) -> Result<BodyHandle, PhysicsError> {
        self.despawn(physics);
        let body = physics.create_character_body(&self.config.body_desc(position))?;
        self.body = Some(body);
        self.state = CharacterState::default();
        debug!("Character spawned at {} on {}", position, physics.name());
        Ok(body)
    }

    /// Remove the body; returns `false` if there was none
    pub fn despawn(&mut self, physics: &mut dyn PhysicsBackend) -> bool {
        self.state = CharacterState::default();
        match self.body.take() {
            Some(body) => physics.remove_body(body),
            None => false,
        }
    }

    /// Current position of the capsule centre, or zero without a body
    pub fn position(&self, physics: &dyn PhysicsBackend) -> Vec3 {
        self.body
            .and_then(|body| physics.position(body))
            .unwrap_or(Vec3::ZERO)
    }

    /// Snapshot of the control state
    pub fn state(&self) -> CharacterState {
        self.state
    }

    /// Run one frame of character control.
    ///
    /// Negative or non-finite `delta_time` skips the frame entirely. Without a
    /// live body nothing happens.
    pub fn update(
        &mut self,
        physics: &mut dyn PhysicsBackend,
        input: &(impl InputSource + ?Sized),
        delta_time: f32,
    ) {
        if !(delta_time.is_finite() && delta_time >= 0.0) {
            trace!(delta_time, "Skipping character update with invalid delta");
            return;
        }
        let Some(body) = self.body else {
            return;
        };
        let (Some(probe_hit), Some(current)) = (physics.is_grounded(body), physics.velocity(body))
        else {
            return;
        };

        let config = &self.config;
        let state = &mut self.state;
        let vertical = if current.y.is_finite() { current.y } else { 0.0 };

        // A probe hit right after takeoff is the floor we are leaving
        let rising = state.is_jumping && vertical > RISE_EPSILON;
        state.was_grounded = state.is_grounded;
        state.is_grounded = probe_hit && !rising;

        state.jump_cooldown_timer = tick(state.jump_cooldown_timer, delta_time);
        state.jump_buffer_timer = tick(state.jump_buffer_timer, delta_time);
        if state.was_grounded && !state.is_grounded {
            state.coyote_time_timer = config.coyote_time;
        } else {
            state.coyote_time_timer = tick(state.coyote_time_timer, delta_time);
        }

        let pressed = input.is_jump_pressed();
        if pressed && !state.jump_held {
            state.jump_requested = true;
            if !state.is_grounded && state.coyote_time_timer <= 0.0 {
                state.jump_buffer_timer = config.jump_buffer;
            }
        } else if !pressed {
            state.jump_requested = false;
        }
        state.jump_held = pressed;

        if state.is_grounded && state.is_jumping {
            state.is_jumping = false;
            debug!("Character landed");
        }

        let direction = sanitize_direction(input.movement_direction()) * config.move_speed;
        let mut velocity = Vec3::new(direction.x, vertical, direction.y);

        // Immediate wins over buffered; both set the cooldown, so one per update
        let trigger = if state.jump_requested && state.has_footing() && state.cooldown_ready() {
            Some(JumpTrigger::Immediate)
        } else if state.jump_buffer_timer > 0.0 && state.is_grounded && state.cooldown_ready() {
            Some(JumpTrigger::Buffered)
        } else {
            None
        };

        let impulse = trigger.map(|trigger| {
            state.is_jumping = true;
            state.is_grounded = false;
            state.coyote_time_timer = 0.0;
            state.jump_cooldown_timer = config.jump_cooldown;
            state.jump_requested = false;
            state.jump_buffer_timer = 0.0;
            // Falling speed would eat into a coyote jump
            velocity.y = velocity.y.max(0.0);
            debug!(?trigger, "Jump fired");
            Vec3::Y * config.jump_force
        });

        let mut velocity = clamp_velocity(
            velocity,
            config.max_horizontal_speed,
            config.max_vertical_speed,
        );
        physics.set_velocity(body, velocity);
        if let Some(impulse) = impulse {
            let impulse = cap_jump_impulse(impulse, velocity.y, config);
            physics.apply_impulse(body, impulse);
            if config.mass > 0.0 {
                velocity += impulse / config.mass;
            }
        }

        state.velocity = velocity;
        state.phase = state.classify();
    }
}

impl Default for CharacterControl {
    fn default() -> Self {
        Self::new()
    }
}
