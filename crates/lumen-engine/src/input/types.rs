use std::fmt;

use winit::keyboard::{KeyCode, PhysicalKey};

/// Keyboard key identifier.
///
/// Only the keys the demos react to get their own variant. Everything else is
/// `Key::Unknown` carrying the platform key code.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Key {
    Escape,
    Space,
    ArrowUp,
    ArrowDown,

    Unknown(u32),
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Unknown(code) => write!(f, "Unknown({code:#x})"),
            other => write!(f, "{other:?}"),
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum KeyState {
    Pressed,
    Released,
}

/// Input events emitted by the runtime.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    Key {
        key: Key,
        state: KeyState,
        /// True for auto-repeat presses.
        repeat: bool,
    },

    /// Window focus change.
    Focused(bool),
}

pub(crate) fn map_key_code(pk: PhysicalKey) -> Key {
    let PhysicalKey::Code(code) = pk else {
        return Key::Unknown(0);
    };

    match code {
        KeyCode::Escape => Key::Escape,
        KeyCode::Space => Key::Space,
        KeyCode::ArrowUp => Key::ArrowUp,
        KeyCode::ArrowDown => Key::ArrowDown,
        other => Key::Unknown(other as u32),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_maps_to_escape() {
        assert_eq!(map_key_code(PhysicalKey::Code(KeyCode::Escape)), Key::Escape);
    }

    #[test]
    fn demo_controls_have_their_own_keys() {
        assert_eq!(map_key_code(PhysicalKey::Code(KeyCode::Space)), Key::Space);
        assert_eq!(map_key_code(PhysicalKey::Code(KeyCode::ArrowUp)), Key::ArrowUp);
        assert_eq!(map_key_code(PhysicalKey::Code(KeyCode::ArrowDown)), Key::ArrowDown);
        assert!(matches!(map_key_code(PhysicalKey::Code(KeyCode::Enter)), Key::Unknown(_)));
    }

    #[test]
    fn unmapped_keys_keep_their_code() {
        let key = map_key_code(PhysicalKey::Code(KeyCode::KeyQ));
        assert_eq!(key, Key::Unknown(KeyCode::KeyQ as u32));
    }

    #[test]
    fn display_unknown_is_hex() {
        assert_eq!(Key::Unknown(16).to_string(), "Unknown(0x10)");
        assert_eq!(Key::Space.to_string(), "Space");
    }
}
