//! Small value types shared between the runtime and renderers.
//!
//! - `Viewport` is the drawable surface size in physical pixels.
//! - `ColorRgba` is a linear clear/tint color.

mod color;
mod viewport;

pub use color::ColorRgba;
pub use viewport::Viewport;
