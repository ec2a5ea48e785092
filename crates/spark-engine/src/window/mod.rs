//! Window and event loop.
//!
//! [`Runtime`] owns the `winit` event loop, the window and its GPU context,
//! and drives an [`crate::core::App`] once per frame.

mod runtime;

pub use runtime::{Runtime, RuntimeConfig};
