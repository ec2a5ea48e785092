//! wgpu device and window surface.
//!
//! One [`Gpu`] is bound to one window. It selects the adapter, owns the
//! device/queue pair, keeps the surface configured across resizes and hands
//! out one [`GpuFrame`] per presented frame.

mod context;
mod init;
mod surface;

pub use context::{Gpu, GpuFrame};
pub use init::GpuInit;
pub use surface::SurfaceErrorAction;
