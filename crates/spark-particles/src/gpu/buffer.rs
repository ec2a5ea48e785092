use wgpu::util::DeviceExt;

use crate::particle::Particle;

/// Fixed-length particle storage on the GPU.
///
/// Written once at creation; the CPU never reads it back.
pub struct ParticleBuffer {
    buffer: wgpu::Buffer,
    count: u32,
}

impl ParticleBuffer {
    pub fn upload(device: &wgpu::Device, particles: &[Particle]) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("spark particle buffer"),
            contents: bytemuck::cast_slice(particles),
            usage: wgpu::BufferUsages::STORAGE
                | wgpu::BufferUsages::VERTEX
                | wgpu::BufferUsages::COPY_DST,
        });

        log::debug!(
            "uploaded {} particles ({} bytes)",
            particles.len(),
            std::mem::size_of_val(particles)
        );

        Self {
            buffer,
            count: particles.len() as u32,
        }
    }

    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    pub fn count(&self) -> u32 {
        self.count
    }
}
