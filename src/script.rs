//! Scripted keyboard input for the headless demo run

use winit::event::ElementState;
use winit::keyboard::KeyCode;

/// A key changing state on a given frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyEvent {
    pub frame: u64,
    pub key: KeyCode,
    pub state: ElementState,
}

/// Timeline of key presses and releases, replayed frame by frame
#[derive(Debug, Clone, Default)]
pub struct InputScript {
    events: Vec<KeyEvent>,
    cursor: usize,
}

impl InputScript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hold `key` from frame `from` until it is released on frame `to`
    pub fn hold(mut self, key: KeyCode, from: u64, to: u64) -> Self {
        self.push(KeyEvent {
            frame: from,
            key,
            state: ElementState::Pressed,
        });
        self.push(KeyEvent {
            frame: to.max(from + 1),
            key,
            state: ElementState::Released,
        });
        self
    }

    /// Tap `key` for a single frame
    pub fn tap(self, key: KeyCode, frame: u64) -> Self {
        self.hold(key, frame, frame + 1)
    }

    fn push(&mut self, event: KeyEvent) {
        // Stable insert keeps same-frame events in the order they were added
        let at = self.events.partition_point(|e| e.frame <= event.frame);
        self.events.insert(at, event);
    }

    /// The demo course at 60 frames per second: settle, hop up the first two
    /// platforms, walk off the far edge and use coyote time, then a held jump
    /// and a pause in the middle.
    pub fn demo() -> Self {
        Self::new()
            // Right towards the first platform, jumping just before its edge
            .hold(KeyCode::KeyD, 60, 150)
            .hold(KeyCode::Space, 73, 80)
            // Pressed while still rising off the first platform's lip; the
            // buffer carries it to touchdown
            .hold(KeyCode::Space, 112, 118)
            // Off the back of the second platform, jumping a few frames late
            .hold(KeyCode::ArrowRight, 180, 230)
            .hold(KeyCode::Space, 214, 220)
            // Holding jump only fires once
            .hold(KeyCode::Space, 300, 360)
            .tap(KeyCode::Escape, 400)
            .hold(KeyCode::KeyA, 410, 470)
            .tap(KeyCode::Escape, 440)
    }

    /// Events due on or before `frame` that have not been replayed yet
    pub fn drain(&mut self, frame: u64) -> impl Iterator<Item = (KeyCode, ElementState)> + '_ {
        let start = self.cursor;
        let end = start + self.events[start..].partition_point(|e| e.frame <= frame);
        self.cursor = end;
        self.events[start..end].iter().map(|e| (e.key, e.state))
    }

    /// Whether every event has been replayed
    pub fn is_finished(&self) -> bool {
        self.cursor >= self.events.len()
    }

    /// Frame of the last scripted event
    pub fn last_frame(&self) -> Option<u64> {
        self.events.last().map(|e| e.frame)
    }
}
