//! Per-frame recording handles.
//!
//! Renderers keep their own pipelines and buffers and record passes into the
//! encoder that `core::FrameCtx::render` hands them.

mod ctx;

pub use ctx::{RenderCtx, RenderTarget};
