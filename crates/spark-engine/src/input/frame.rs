use std::collections::HashSet;

use super::types::{InputEvent, Key};

/// What changed during one frame. Cleared by the runtime after `on_frame`.
///
/// Held state lives in `InputState`; this only carries transitions and
/// accumulated deltas.
#[derive(Debug, Default)]
pub struct InputFrame {
    /// Every event applied this frame, in arrival order.
    pub events: Vec<InputEvent>,

    pub keys_pressed: HashSet<Key>,
    pub keys_released: HashSet<Key>,

    /// Summed raw mouse motion, +Y down.
    pub mouse_delta: (f32, f32),

    /// Summed vertical wheel movement in lines.
    pub wheel_lines: f32,
}

impl InputFrame {
    pub fn key_pressed(&self, key: Key) -> bool {
        self.keys_pressed.contains(&key)
    }

    pub fn push_event(&mut self, ev: InputEvent) {
        self.events.push(ev);
    }

    /// Empties the frame, keeping its allocations.
    pub fn clear(&mut self) {
        self.events.clear();
        self.keys_pressed.clear();
        self.keys_released.clear();
        self.mouse_delta = (0.0, 0.0);
        self.wheel_lines = 0.0;
    }
}
