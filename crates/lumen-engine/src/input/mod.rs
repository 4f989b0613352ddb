//! Keyboard input.
//!
//! Public API is platform-agnostic; the runtime translates winit events into
//! `InputEvent`s and feeds them through `InputState::apply_event`.

mod frame;
mod state;
mod types;

pub use frame::InputFrame;
pub use state::InputState;
pub use types::{InputEvent, Key, KeyState};

pub(crate) use types::map_key_code;
