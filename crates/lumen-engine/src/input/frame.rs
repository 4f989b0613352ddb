use std::collections::HashSet;

use super::types::Key;

/// Per-frame input deltas.
///
/// `InputState` answers "is it held"; `InputFrame` answers "did it change this
/// frame". Cleared by the runtime after each frame.
#[derive(Debug, Default)]
pub struct InputFrame {
    pub keys_pressed: HashSet<Key>,
    pub keys_released: HashSet<Key>,
}

impl InputFrame {
    pub fn clear(&mut self) {
        self.keys_pressed.clear();
        self.keys_released.clear();
    }

    /// True if `key` went down during this frame (repeats excluded).
    pub fn pressed(&self, key: Key) -> bool {
        self.keys_pressed.contains(&key)
    }

    pub fn released(&self, key: Key) -> bool {
        self.keys_released.contains(&key)
    }
}
