//! Input subsystem.
//!
//! The runtime translates winit events into [`InputEvent`]s (see `platform`)
//! and applies them to an [`InputState`] (what is held now) and an
//! [`InputFrame`] (what changed during the current frame).

mod frame;
pub(crate) mod platform;
mod state;
mod types;

pub use frame::InputFrame;
pub use state::InputState;
pub use types::{ButtonState, InputEvent, Key, Modifiers, MouseWheelDelta};
