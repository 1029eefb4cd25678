//! Input system with action-based mapping
//!
//! Raw key events become [`InputAction`]s held in an [`InputState`]. The
//! character controller never sees keys: it reads an [`InputSource`], which
//! boils the state down to a movement direction and a jump flag.

use std::collections::{HashMap, HashSet};

use glam::Vec2;
use serde::{Deserialize, Serialize};
use winit::event::ElementState;
use winit::keyboard::{KeyCode, PhysicalKey};

/// What the character controller samples once per frame
pub trait InputSource {
    /// Movement direction on the ground plane as (x, z), unit length or zero
    fn movement_direction(&self) -> Vec2;

    /// Whether jump is held this frame (edge detection is up to the caller)
    fn is_jump_pressed(&self) -> bool;
}

/// Game actions that can be triggered by input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputAction {
    /// Move forward (W by default)
    MoveForward,
    /// Move backward (S by default)
    MoveBackward,
    /// Move left (A by default)
    MoveLeft,
    /// Move right (D by default)
    MoveRight,
    /// Jump (Space by default)
    Jump,
    /// Pause/unpause (Escape by default)
    Pause,
}

/// Current state of all inputs for a frame
#[derive(Debug, Clone, Default)]
pub struct InputState {
    /// Actions currently held down
    pub held: HashSet<InputAction>,
    /// Actions that were just pressed this frame
    pub just_pressed: HashSet<InputAction>,
    /// Actions that were just released this frame
    pub just_released: HashSet<InputAction>,
}

impl InputState {
    /// Create a new empty input state
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if an action is currently held
    pub fn is_held(&self, action: InputAction) -> bool {
        self.held.contains(&action)
    }

    /// Check if an action was just pressed this frame
    pub fn is_just_pressed(&self, action: InputAction) -> bool {
        self.just_pressed.contains(&action)
    }

    /// Check if an action was just released this frame
    pub fn is_just_released(&self, action: InputAction) -> bool {
        self.just_released.contains(&action)
    }

    /// Clear frame-specific data (call at end of frame)
    pub fn clear_frame(&mut self) {
        self.just_pressed.clear();
        self.just_released.clear();
    }

    /// Clear all input state
    pub fn clear_all(&mut self) {
        self.held.clear();
        self.just_pressed.clear();
        self.just_released.clear();
    }

    fn press(&mut self, action: InputAction) {
        if !self.held.contains(&action) {
            self.just_pressed.insert(action);
        }
        self.held.insert(action);
    }

    fn release(&mut self, action: InputAction) {
        if self.held.remove(&action) {
            self.just_released.insert(action);
        }
    }
}

impl InputSource for InputState {
    fn movement_direction(&self) -> Vec2 {
        let mut direction = Vec2::ZERO;
        if self.is_held(InputAction::MoveForward) {
            direction.y -= 1.0;
        }
        if self.is_held(InputAction::MoveBackward) {
            direction.y += 1.0;
        }
        if self.is_held(InputAction::MoveLeft) {
            direction.x -= 1.0;
        }
        if self.is_held(InputAction::MoveRight) {
            direction.x += 1.0;
        }
        direction.normalize_or_zero()
    }

    fn is_jump_pressed(&self) -> bool {
        self.is_held(InputAction::Jump)
    }
}

/// A plain per-frame input sample
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CharacterInput {
    /// Movement direction as (x, z)
    pub movement: Vec2,
    /// Jump held
    pub jump: bool,
}

impl CharacterInput {
    /// Capture the current frame of any input source
    pub fn sample(source: &(impl InputSource + ?Sized)) -> Self {
        Self {
            movement: source.movement_direction(),
            jump: source.is_jump_pressed(),
        }
    }

    /// Movement only
    pub fn moving(movement: Vec2) -> Self {
        Self {
            movement: movement.normalize_or_zero(),
            jump: false,
        }
    }

    /// Same movement, with the jump button held
    pub fn with_jump(mut self) -> Self {
        self.jump = true;
        self
    }
}

impl InputSource for CharacterInput {
    fn movement_direction(&self) -> Vec2 {
        self.movement
    }

    fn is_jump_pressed(&self) -> bool {
        self.jump
    }
}

/// Maps physical keys to game actions
#[derive(Debug, Clone)]
pub struct InputBindings {
    /// Key to action mappings
    bindings: HashMap<KeyCode, InputAction>,
    /// Reverse lookup: action to all keys
    reverse: HashMap<InputAction, Vec<KeyCode>>,
}

impl Default for InputBindings {
    fn default() -> Self {
        let mut bindings = Self {
            bindings: HashMap::new(),
            reverse: HashMap::new(),
        };

        // Default WASD bindings
        bindings.bind(KeyCode::KeyW, InputAction::MoveForward);
        bindings.bind(KeyCode::KeyS, InputAction::MoveBackward);
        bindings.bind(KeyCode::KeyA, InputAction::MoveLeft);
        bindings.bind(KeyCode::KeyD, InputAction::MoveRight);

        // Arrow keys as alternative
        bindings.bind(KeyCode::ArrowUp, InputAction::MoveForward);
        bindings.bind(KeyCode::ArrowDown, InputAction::MoveBackward);
        bindings.bind(KeyCode::ArrowLeft, InputAction::MoveLeft);
        bindings.bind(KeyCode::ArrowRight, InputAction::MoveRight);

        bindings.bind(KeyCode::Space, InputAction::Jump);
        bindings.bind(KeyCode::Escape, InputAction::Pause);

        bindings
    }
}

impl InputBindings {
    /// Create new input bindings with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a key to an action, replacing whatever the key did before
    pub fn bind(&mut self, key: KeyCode, action: InputAction) {
        self.unbind(key);
        self.bindings.insert(key, action);
        self.reverse.entry(action).or_default().push(key);
    }

    /// Unbind a key
    pub fn unbind(&mut self, key: KeyCode) {
        if let Some(action) = self.bindings.remove(&key) {
            if let Some(keys) = self.reverse.get_mut(&action) {
                keys.retain(|k| *k != key);
            }
        }
    }

    /// Get the action for a key, if any
    pub fn get_key_action(&self, key: KeyCode) -> Option<InputAction> {
        self.bindings.get(&key).copied()
    }

    /// All keys bound to an action
    pub fn keys_for(&self, action: InputAction) -> &[KeyCode] {
        self.reverse.get(&action).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Input handler that processes raw events and updates state
#[derive(Debug, Default)]
pub struct InputHandler {
    /// Current input state
    pub state: InputState,
    /// Input bindings
    pub bindings: InputBindings,
}

impl InputHandler {
    /// Create a new input handler with default bindings
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle a keyboard event
    pub fn handle_keyboard(&mut self, physical_key: PhysicalKey, element_state: ElementState) {
        if let PhysicalKey::Code(key_code) = physical_key {
            if let Some(action) = self.bindings.get_key_action(key_code) {
                match element_state {
                    ElementState::Pressed => self.state.press(action),
                    ElementState::Released => self.state.release(action),
                }
            }
        }
    }

    /// Drop all held keys (window lost focus)
    pub fn focus_lost(&mut self) {
        self.state.clear_all();
    }

    /// Clear frame-specific input data
    pub fn end_frame(&mut self) {
        self.state.clear_frame();
    }
}

impl InputSource for InputHandler {
    fn movement_direction(&self) -> Vec2 {
        self.state.movement_direction()
    }

    fn is_jump_pressed(&self) -> bool {
        self.state.is_jump_pressed()
    }
}
