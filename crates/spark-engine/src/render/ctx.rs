use crate::coords::Viewport;

/// GPU handles a renderer needs while recording a frame.
pub struct RenderCtx<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    /// Pipelines drawing to the surface must target this format.
    pub surface_format: wgpu::TextureFormat,
    /// Surface size in physical pixels; size-dependent attachments follow it.
    pub viewport: Viewport,
}

impl<'a> RenderCtx<'a> {
    pub fn new(
        device: &'a wgpu::Device,
        queue: &'a wgpu::Queue,
        surface_format: wgpu::TextureFormat,
        viewport: Viewport,
    ) -> Self {
        Self { device, queue, surface_format, viewport }
    }
}

/// The frame's encoder and swapchain view.
///
/// Nothing clears the view beforehand; the first pass loads with `clear`.
pub struct RenderTarget<'a> {
    pub encoder: &'a mut wgpu::CommandEncoder,
    pub color_view: &'a wgpu::TextureView,
    pub clear: wgpu::Color,
}

impl<'a> RenderTarget<'a> {
    pub fn new(
        encoder: &'a mut wgpu::CommandEncoder,
        color_view: &'a wgpu::TextureView,
        clear: wgpu::Color,
    ) -> Self {
        Self { encoder, color_view, clear }
    }
}
