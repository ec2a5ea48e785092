//! Spark engine crate.
//!
//! This crate owns the platform + GPU runtime pieces used by the particle demo:
//! the winit event loop, the window and its wgpu device/surface, platform-agnostic
//! input, frame timing and logging.

pub mod device;
pub mod window;
pub mod input;
pub mod time;
pub mod core;

pub mod logging;
pub mod coords;
pub mod render;
