use bytemuck::{Pod, Zeroable};
use spark_engine::time::FrameTime;

use crate::particle::{DispatchPlan, Particle};

use super::buffer::ParticleBuffer;

/// Per-frame simulation parameters (binding 1).
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct SimUniform {
    pub bounds: [f32; 4], // xyz = half extents
    pub time: f32,
    pub dt: f32,
    pub _pad: [f32; 2], // 16-byte alignment
}

impl SimUniform {
    pub fn new(bounds: [f32; 3], time: &FrameTime) -> Self {
        Self {
            bounds: [bounds[0], bounds[1], bounds[2], 0.0],
            time: time.elapsed,
            dt: time.dt,
            _pad: [0.0; 2],
        }
    }
}

/// Integrates the particle buffer in place, one invocation per particle.
pub struct ComputePass {
    pipeline: wgpu::ComputePipeline,
    bind_group: wgpu::BindGroup,
    sim_ubo: wgpu::Buffer,
    plan: DispatchPlan,
}

impl ComputePass {
    pub fn new(device: &wgpu::Device, particles: &ParticleBuffer, plan: DispatchPlan) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("spark simulate shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/simulate.wgsl").into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("spark simulate bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: false },
                        has_dynamic_offset: false,
                        min_binding_size: wgpu::BufferSize::new(Particle::STRIDE),
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: wgpu::BufferSize::new(
                            std::mem::size_of::<SimUniform>() as u64,
                        ),
                    },
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("spark simulate pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        // The workgroup size is a pipeline-overridable constant in the shader.
        let constants = [("WORKGROUP_SIZE", f64::from(plan.workgroup_size))];

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("spark simulate pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: Some("cs_main"),
            compilation_options: wgpu::PipelineCompilationOptions {
                constants: &constants,
                ..Default::default()
            },
            cache: None,
        });

        let sim_ubo = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("spark simulate ubo"),
            size: std::mem::size_of::<SimUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("spark simulate bind group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: particles.buffer().as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: sim_ubo.as_entire_binding(),
                },
            ],
        });

        log::info!(
            "compute pipeline ready: {} workgroups x {} invocations",
            plan.workgroup_count,
            plan.workgroup_size
        );

        Self {
            pipeline,
            bind_group,
            sim_ubo,
            plan,
        }
    }

    /// Records one simulation step. Must precede any pass that reads the
    /// particle buffer in the same encoder.
    pub fn dispatch(&self, queue: &wgpu::Queue, encoder: &mut wgpu::CommandEncoder, sim: &SimUniform) {
        queue.write_buffer(&self.sim_ubo, 0, bytemuck::bytes_of(sim));

        let mut cpass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("spark simulate pass"),
            timestamp_writes: None,
        });
        cpass.set_pipeline(&self.pipeline);
        cpass.set_bind_group(0, &self.bind_group, &[]);
        cpass.dispatch_workgroups(self.plan.workgroup_count, 1, 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn sim_uniform_is_32_bytes() {
        assert_eq!(std::mem::size_of::<SimUniform>(), 32);
    }

    #[test]
    fn sim_uniform_carries_frame_time() {
        let time = FrameTime {
            dt: 0.016,
            elapsed: 2.5,
            now: Instant::now(),
            frame_index: 10,
        };
        let sim = SimUniform::new([1.0, 2.0, 3.0], &time);
        assert_eq!(sim.bounds, [1.0, 2.0, 3.0, 0.0]);
        assert_eq!(sim.time, 2.5);
        assert_eq!(sim.dt, 0.016);
    }
}
