use std::collections::HashSet;

use super::types::{InputEvent, Key, MouseButton, TextEvent};

/// What happened since the last [`Window::poll_and_swap`](crate::window::Window::poll_and_swap).
///
/// Held state lives in [`InputState`](super::InputState); this is the delta.
#[derive(Debug, Default)]
pub struct InputFrame {
    /// Arrival order.
    pub events: Vec<InputEvent>,

    pub keys_pressed: HashSet<Key>,
    pub keys_released: HashSet<Key>,

    pub buttons_pressed: HashSet<MouseButton>,
    pub buttons_released: HashSet<MouseButton>,

    pub text: Vec<TextEvent>,
}

impl InputFrame {
    pub fn clear(&mut self) {
        self.events.clear();
        self.keys_pressed.clear();
        self.keys_released.clear();
        self.buttons_pressed.clear();
        self.buttons_released.clear();
        self.text.clear();
    }

    #[inline]
    pub fn push_event(&mut self, ev: InputEvent) {
        self.events.push(ev);
    }

    #[inline]
    pub fn key_pressed(&self, key: Key) -> bool {
        self.keys_pressed.contains(&key)
    }

    #[inline]
    pub fn button_pressed(&self, btn: MouseButton) -> bool {
        self.buttons_pressed.contains(&btn)
    }
}
