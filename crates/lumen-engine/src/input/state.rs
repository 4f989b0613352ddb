use std::collections::HashSet;

use super::frame::InputFrame;
use super::types::{InputEvent, Key, KeyState};

/// Current keyboard state for the window.
#[derive(Debug, Default)]
pub struct InputState {
    pub focused: bool,
    pub keys_down: HashSet<Key>,
}

impl InputState {
    /// Applies an event to the held-key set and records transitions in `frame`.
    pub fn apply_event(&mut self, frame: &mut InputFrame, ev: InputEvent) {
        match &ev {
            InputEvent::Focused(f) => {
                self.focused = *f;
                if !*f {
                    // Releases are not delivered to unfocused windows.
                    self.keys_down.clear();
                }
            }

            InputEvent::Key { key, state, .. } => match state {
                KeyState::Pressed => {
                    if self.keys_down.insert(*key) {
                        frame.keys_pressed.insert(*key);
                    }
                }
                KeyState::Released => {
                    if self.keys_down.remove(key) {
                        frame.keys_released.insert(*key);
                    }
                }
            },
        }
    }

    pub fn key_down(&self, key: Key) -> bool {
        self.keys_down.contains(&key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(key: Key, state: KeyState, repeat: bool) -> InputEvent {
        InputEvent::Key { key, state, repeat }
    }

    #[test]
    fn press_then_release() {
        let mut st = InputState::default();
        let mut fr = InputFrame::default();

        st.apply_event(&mut fr, key(Key::Escape, KeyState::Pressed, false));
        assert!(st.key_down(Key::Escape));
        assert!(fr.pressed(Key::Escape));

        fr.clear();
        st.apply_event(&mut fr, key(Key::Escape, KeyState::Released, false));
        assert!(!st.key_down(Key::Escape));
        assert!(fr.released(Key::Escape));
        assert!(!fr.pressed(Key::Escape));
    }

    #[test]
    fn repeat_press_is_not_a_new_transition() {
        let mut st = InputState::default();
        let mut fr = InputFrame::default();

        st.apply_event(&mut fr, key(Key::Space, KeyState::Pressed, false));
        fr.clear();
        st.apply_event(&mut fr, key(Key::Space, KeyState::Pressed, true));

        assert!(st.key_down(Key::Space));
        assert!(!fr.pressed(Key::Space));
    }

    #[test]
    fn focus_loss_releases_held_keys() {
        let mut st = InputState::default();
        let mut fr = InputFrame::default();

        st.apply_event(&mut fr, InputEvent::Focused(true));
        st.apply_event(&mut fr, key(Key::ArrowUp, KeyState::Pressed, false));
        st.apply_event(&mut fr, InputEvent::Focused(false));

        assert!(!st.focused);
        assert!(st.keys_down.is_empty());
    }

    #[test]
    fn release_without_press_is_ignored() {
        let mut st = InputState::default();
        let mut fr = InputFrame::default();

        st.apply_event(&mut fr, key(Key::ArrowDown, KeyState::Released, false));
        assert!(!fr.released(Key::ArrowDown));
    }
}
