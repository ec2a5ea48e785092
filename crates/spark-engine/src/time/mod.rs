//! Frame timing.
//!
//! The runtime ticks one [`FrameClock`] per redraw and passes the resulting
//! [`FrameTime`] to the app, which may feed it to an [`FpsCounter`].

mod fps;
mod frame_clock;

pub use fps::{FpsCounter, FpsReport};
pub use frame_clock::{FrameClock, FrameTime};
