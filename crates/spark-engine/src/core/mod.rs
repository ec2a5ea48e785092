//! The contract between the runtime loop and the application.
//!
//! The runtime owns the window, GPU and input; the app only sees them through
//! a [`FrameCtx`] for the duration of one frame.

mod app;
mod ctx;

pub use app::{App, AppControl};
pub use ctx::{FrameCtx, WindowCtx};
