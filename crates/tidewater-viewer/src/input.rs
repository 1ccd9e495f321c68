//! Keyboard and scroll state fed by winit events

use std::collections::HashSet;
use winit::keyboard::KeyCode;

/// Held keys plus scroll accumulated since the last frame
#[derive(Debug, Default)]
pub struct InputState {
    keys_down: HashSet<KeyCode>,
    scroll: f32,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn process_key_down(&mut self, key: KeyCode) {
        self.keys_down.insert(key);
    }

    pub fn process_key_up(&mut self, key: KeyCode) {
        self.keys_down.remove(&key);
    }

    /// Add a scroll delta in lines; positive scrolls up
    pub fn process_scroll(&mut self, lines: f32) {
        self.scroll += lines;
    }

    pub fn is_key_down(&self, key: KeyCode) -> bool {
        self.keys_down.contains(&key)
    }

    /// Scroll since the last call, then reset it
    pub fn take_scroll(&mut self) -> f32 {
        std::mem::take(&mut self.scroll)
    }

    /// Forget held keys, e.g. when the window loses focus
    pub fn clear(&mut self) {
        self.keys_down.clear();
        self.scroll = 0.0;
    }
}
