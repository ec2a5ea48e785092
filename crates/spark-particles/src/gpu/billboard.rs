use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use wgpu::util::DeviceExt;

use spark_engine::coords::Viewport;
use spark_engine::render::{RenderCtx, RenderTarget};

use crate::camera::Camera;
use crate::particle::Particle;

use super::buffer::ParticleBuffer;
use super::texture::SpriteTexture;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

// ── camera uniform ────────────────────────────────────────────────────────

/// Matrices and basis vectors consumed by the billboard vertex stage.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct CameraUniform {
    pub model: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    pub position: [f32; 4],
    pub right: [f32; 4],
    pub up: [f32; 4],
}

impl CameraUniform {
    pub fn new(camera: &Camera, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            model: Mat4::IDENTITY.to_cols_array_2d(),
            view: camera.view_matrix().to_cols_array_2d(),
            projection: camera.projection(aspect, near, far).to_cols_array_2d(),
            position: camera.position.extend(1.0).to_array(),
            right: camera.right().extend(0.0).to_array(),
            up: camera.up().extend(0.0).to_array(),
        }
    }
}

// ── quad vertex ───────────────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct QuadVertex {
    corner: [f32; 2], // -0.5..0.5
    uv: [f32; 2],
}

impl QuadVertex {
    const ATTRS: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x2];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<QuadVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

// Two triangles, counter-clockwise; uv y points down.
const QUAD_VERTICES: [QuadVertex; 6] = [
    QuadVertex { corner: [-0.5, -0.5], uv: [0.0, 1.0] },
    QuadVertex { corner: [0.5, -0.5], uv: [1.0, 1.0] },
    QuadVertex { corner: [0.5, 0.5], uv: [1.0, 0.0] },
    QuadVertex { corner: [-0.5, -0.5], uv: [0.0, 1.0] },
    QuadVertex { corner: [0.5, 0.5], uv: [1.0, 0.0] },
    QuadVertex { corner: [-0.5, 0.5], uv: [0.0, 0.0] },
];

// ── size-dependent targets ────────────────────────────────────────────────

struct FrameTargets {
    viewport: Viewport,
    depth: wgpu::TextureView,
    msaa: Option<wgpu::TextureView>,
}

/// Draws every particle as a camera-facing sprite.
///
/// Owns the depth buffer and, when multisampling, the multisampled color
/// target. Both are recreated whenever the surface size changes.
pub struct BillboardRenderer {
    sample_count: u32,

    pipeline_format: Option<wgpu::TextureFormat>,
    pipeline: Option<wgpu::RenderPipeline>,

    bind_group_layout: wgpu::BindGroupLayout,
    bind_group: wgpu::BindGroup,
    camera_ubo: wgpu::Buffer,
    quad_vbo: wgpu::Buffer,

    targets: Option<FrameTargets>,
}

impl BillboardRenderer {
    pub fn new(device: &wgpu::Device, sprite: &SpriteTexture, sample_count: u32) -> Self {
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("spark billboard bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: wgpu::BufferSize::new(
                            std::mem::size_of::<CameraUniform>() as u64,
                        ),
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let camera_ubo = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("spark billboard camera ubo"),
            size: std::mem::size_of::<CameraUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("spark billboard bind group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: camera_ubo.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(sprite.view()),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(sprite.sampler()),
                },
            ],
        });

        let quad_vbo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("spark billboard quad vbo"),
            contents: bytemuck::cast_slice(&QUAD_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });

        Self {
            sample_count,
            pipeline_format: None,
            pipeline: None,
            bind_group_layout,
            bind_group,
            camera_ubo,
            quad_vbo,
            targets: None,
        }
    }

    /// Clears the target, then draws `particles` instanced over the quad.
    pub fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        particles: &ParticleBuffer,
        camera: &CameraUniform,
    ) {
        self.ensure_pipeline(ctx);
        self.ensure_targets(ctx);

        ctx.queue.write_buffer(&self.camera_ubo, 0, bytemuck::bytes_of(camera));

        let Some(pipeline) = self.pipeline.as_ref() else { return };
        let Some(targets) = self.targets.as_ref() else { return };

        // With MSAA the multisampled target is drawn and resolved into the
        // surface; its own contents are not needed afterwards.
        let (view, resolve_target, store) = match targets.msaa.as_ref() {
            Some(msaa) => (msaa, Some(target.color_view), wgpu::StoreOp::Discard),
            None => (target.color_view, None, wgpu::StoreOp::Store),
        };

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("spark billboard pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(target.clear),
                    store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &targets.depth,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Discard,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(0, &self.bind_group, &[]);
        rpass.set_vertex_buffer(0, self.quad_vbo.slice(..));
        rpass.set_vertex_buffer(1, particles.buffer().slice(..));
        rpass.draw(0..QUAD_VERTICES.len() as u32, 0..particles.count());
    }

    // ── private helpers ────────────────────────────────────────────────────

    fn ensure_pipeline(&mut self, ctx: &RenderCtx<'_>) {
        if self.pipeline_format == Some(ctx.surface_format) && self.pipeline.is_some() {
            return;
        }

        let shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("spark billboard shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/billboard.wgsl").into()),
        });

        let pipeline_layout = ctx.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("spark billboard pipeline layout"),
            bind_group_layouts: &[&self.bind_group_layout],
            immediate_size: 0,
        });

        let pipeline = ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("spark billboard pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[QuadVertex::layout(), Particle::instance_layout()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.surface_format,
                    // Cutout sprites: the fragment stage discards the transparent part.
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState {
                count: self.sample_count,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview_mask: None,
            cache: None,
        });

        self.pipeline_format = Some(ctx.surface_format);
        self.pipeline = Some(pipeline);
        // The multisampled target shares the surface format.
        self.targets = None;
    }

    fn ensure_targets(&mut self, ctx: &RenderCtx<'_>) {
        if self.targets.as_ref().is_some_and(|t| t.viewport == ctx.viewport) {
            return;
        }

        let size = wgpu::Extent3d {
            width: ctx.viewport.width.max(1),
            height: ctx.viewport.height.max(1),
            depth_or_array_layers: 1,
        };

        let depth = ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("spark billboard depth"),
            size,
            mip_level_count: 1,
            sample_count: self.sample_count,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });

        let msaa = (self.sample_count > 1).then(|| {
            ctx.device
                .create_texture(&wgpu::TextureDescriptor {
                    label: Some("spark billboard msaa color"),
                    size,
                    mip_level_count: 1,
                    sample_count: self.sample_count,
                    dimension: wgpu::TextureDimension::D2,
                    format: ctx.surface_format,
                    usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                    view_formats: &[],
                })
                .create_view(&wgpu::TextureViewDescriptor::default())
        });

        log::debug!(
            "billboard targets resized to {}x{} ({}x msaa)",
            size.width,
            size.height,
            self.sample_count
        );

        self.targets = Some(FrameTargets {
            viewport: ctx.viewport,
            depth: depth.create_view(&wgpu::TextureViewDescriptor::default()),
            msaa,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn camera_uniform_is_240_bytes() {
        assert_eq!(std::mem::size_of::<CameraUniform>(), 240);
    }

    #[test]
    fn camera_uniform_carries_basis() {
        let camera = Camera::new(Vec3::new(0.0, 0.0, 3.0));
        let u = CameraUniform::new(&camera, 16.0 / 9.0, 0.1, 10_000.0);

        assert_eq!(u.model, Mat4::IDENTITY.to_cols_array_2d());
        assert_eq!(u.position, [0.0, 0.0, 3.0, 1.0]);
        assert!((u.right[0] - 1.0).abs() < 1e-5);
        assert!((u.up[1] - 1.0).abs() < 1e-5);
        assert_eq!(u.right[3], 0.0);
    }

    #[test]
    fn quad_covers_unit_square_centered_on_origin() {
        let (min, max) = QUAD_VERTICES.iter().fold(
            ([f32::MAX; 2], [f32::MIN; 2]),
            |(lo, hi), v| {
                (
                    [lo[0].min(v.corner[0]), lo[1].min(v.corner[1])],
                    [hi[0].max(v.corner[0]), hi[1].max(v.corner[1])],
                )
            },
        );
        assert_eq!(min, [-0.5, -0.5]);
        assert_eq!(max, [0.5, 0.5]);
        // uv follows the corner, with v flipped.
        for v in QUAD_VERTICES {
            assert_eq!(v.uv, [v.corner[0] + 0.5, 0.5 - v.corner[1]]);
        }
    }
}
