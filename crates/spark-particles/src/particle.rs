//! Particle record, dispatch sizing and deterministic seeding.

use bytemuck::{Pod, Zeroable};

use crate::config::SeedConfig;
use crate::noise::NoiseField;

/// One particle as laid out in the GPU buffer (48 bytes).
///
///  offset  0  position_size  [f32; 4]  xyz = position, w = billboard size
///  offset 16  velocity_mass  [f32; 4]  xyz = velocity, w = mass
///  offset 32  accel_mass     [f32; 4]  xyz = acceleration, w = mass
///
/// The same buffer is a `read_write` storage array for the compute stage and
/// an instance-rate vertex buffer for the billboard stage.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct Particle {
    pub position_size: [f32; 4],
    pub velocity_mass: [f32; 4],
    pub accel_mass: [f32; 4],
}

impl Particle {
    pub const STRIDE: u64 = std::mem::size_of::<Particle>() as u64;

    // velocity_mass and accel_mass are only read by the compute stage.
    const ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![
        2 => Float32x4 // position_size
    ];

    pub fn instance_layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: Self::STRIDE,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRS,
        }
    }
}

/// Compute dispatch shape. The particle count is always an exact multiple of
/// the workgroup size, so every invocation owns one particle.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct DispatchPlan {
    pub workgroup_size: u32,
    pub workgroup_count: u32,
}

impl DispatchPlan {
    pub const fn new(workgroup_size: u32, workgroup_count: u32) -> Self {
        Self {
            workgroup_size,
            workgroup_count,
        }
    }

    pub const fn particle_count(self) -> u32 {
        self.workgroup_size * self.workgroup_count
    }

    pub const fn buffer_bytes(self) -> u64 {
        self.particle_count() as u64 * Particle::STRIDE
    }
}

/// Produces the initial particle set from a noise field.
///
/// Each particle is a pure function of its index, so the same seed and count
/// always yield a byte-identical buffer.
pub struct ParticleSeeder {
    field: NoiseField,
    spread: f32,
    size_scale: f32,
    velocity_scale: f32,
}

impl ParticleSeeder {
    /// Distance walked through noise space per particle index.
    const STEP: f32 = 0.005;

    /// Mass scale applied to noise remapped to `[0, 2]`.
    const MASS_SCALE: f32 = 0.075;

    /// Acceleration is the x velocity scaled down by this factor on all axes.
    const ACCEL_DIVISOR: f32 = 1000.0;

    pub fn new(config: &SeedConfig) -> Self {
        Self {
            field: NoiseField::new(config.seed, config.frequency),
            spread: config.spread,
            size_scale: config.size_scale,
            velocity_scale: config.velocity_scale,
        }
    }

    pub fn particle_at(&self, index: u32) -> Particle {
        let inc = index as f32 * Self::STEP;
        let n = &self.field;

        // Each coordinate feeds the next sample, which decorrelates the axes.
        let x = n.get3(inc, inc, inc) * self.spread;
        let y = n.get3(x, inc, inc) * self.spread;
        let z = n.get3(x, y, 0.0) * self.spread;
        let size = (n.get3(x, y, z) + 1.0) * 0.5 * self.size_scale;

        let vx = n.get2(inc, inc) * self.velocity_scale;
        let vy = n.get2(vx, inc) * self.velocity_scale;
        let vz = n.get2(inc, vy) * self.velocity_scale;
        let mass = (n.get3(vx, vy, vz) + 1.0) * Self::MASS_SCALE;

        let a = vx / Self::ACCEL_DIVISOR;

        Particle {
            position_size: [x, y, z, size],
            velocity_mass: [vx, vy, vz, mass],
            accel_mass: [a, a, a, mass],
        }
    }

    pub fn seed(&self, count: u32) -> Vec<Particle> {
        (0..count).map(|i| self.particle_at(i)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeder() -> ParticleSeeder {
        ParticleSeeder::new(&SeedConfig::default())
    }

    #[test]
    fn layout_matches_gpu_struct() {
        assert_eq!(Particle::STRIDE, 48);
        assert_eq!(std::mem::align_of::<Particle>(), 4);
        assert_eq!(std::mem::offset_of!(Particle, position_size), 0);
        assert_eq!(std::mem::offset_of!(Particle, velocity_mass), 16);
        assert_eq!(std::mem::offset_of!(Particle, accel_mass), 32);
    }

    #[test]
    fn instance_layout_binds_position_only() {
        let layout = Particle::instance_layout();
        assert_eq!(layout.array_stride, 48);
        assert_eq!(layout.step_mode, wgpu::VertexStepMode::Instance);
        assert_eq!(layout.attributes.len(), 1);
        assert_eq!(layout.attributes[0].shader_location, 2);
        assert_eq!(layout.attributes[0].offset, 0);
    }

    #[test]
    fn dispatch_plan_sizes_buffer() {
        let plan = DispatchPlan::new(256, 8000);
        assert_eq!(plan.particle_count(), 2_048_000);
        assert_eq!(plan.buffer_bytes(), 2_048_000 * 48);
    }

    #[test]
    fn seeding_is_deterministic() {
        let a = seeder().seed(512);
        let b = seeder().seed(512);
        assert_eq!(bytemuck::cast_slice::<_, u8>(&a), bytemuck::cast_slice::<_, u8>(&b));
    }

    #[test]
    fn seeded_count_matches_request() {
        assert_eq!(seeder().seed(1024).len(), 1024);
        assert!(seeder().seed(0).is_empty());
    }

    #[test]
    fn seeded_values_respect_scales() {
        let cfg = SeedConfig::default();
        for p in seeder().seed(2048) {
            let [x, y, z, size] = p.position_size;
            for c in [x, y, z] {
                assert!(c.abs() <= cfg.spread, "position {c}");
            }
            assert!((0.0..=cfg.size_scale).contains(&size), "size {size}");

            let [vx, vy, vz, mass] = p.velocity_mass;
            for v in [vx, vy, vz] {
                assert!(v.abs() <= cfg.velocity_scale, "velocity {v}");
            }
            assert!((0.0..=0.15).contains(&mass), "mass {mass}");

            assert_eq!(p.accel_mass[3], mass);
            assert_eq!(p.accel_mass[0], vx / 1000.0);
            assert_eq!(p.accel_mass[0], p.accel_mass[1]);
            assert_eq!(p.accel_mass[1], p.accel_mass[2]);
        }
    }

    #[test]
    fn particles_are_spread_out() {
        let particles = seeder().seed(4096);
        let first = particles[0].position_size;
        let distinct = particles.iter().filter(|p| p.position_size != first).count();
        assert!(distinct > 4000);
    }

    #[test]
    fn each_sample_feeds_the_next() {
        let cfg = SeedConfig::default();
        let s = seeder();
        let n = NoiseField::new(cfg.seed, cfg.frequency);

        for index in [0, 1, 17, 400, 2047] {
            let inc = index as f32 * 0.005;

            let x = n.get3(inc, inc, inc) * cfg.spread;
            let y = n.get3(x, inc, inc) * cfg.spread;
            let z = n.get3(x, y, 0.0) * cfg.spread;
            let size = (n.get3(x, y, z) + 1.0) * 0.5 * cfg.size_scale;

            let vx = n.get2(inc, inc) * cfg.velocity_scale;
            let vy = n.get2(vx, inc) * cfg.velocity_scale;
            let vz = n.get2(inc, vy) * cfg.velocity_scale;
            let mass = (n.get3(vx, vy, vz) + 1.0) * 0.075;
            let a = vx / 1000.0;

            let expected = Particle {
                position_size: [x, y, z, size],
                velocity_mass: [vx, vy, vz, mass],
                accel_mass: [a, a, a, mass],
            };
            assert_eq!(s.particle_at(index), expected, "particle {index}");
        }
    }

    #[test]
    fn extreme_scales_seed_without_overflow() {
        for (spread, frequency) in [(1e12, 0.005), (1920.0, 1e9), (3e38, 3e38)] {
            let cfg = SeedConfig {
                spread,
                frequency,
                ..SeedConfig::default()
            };
            let particles = ParticleSeeder::new(&cfg).seed(64);
            assert_eq!(particles.len(), 64);
        }
    }

    #[test]
    fn random_access_matches_bulk_seed() {
        let s = seeder();
        let bulk = s.seed(300);
        assert_eq!(bulk[299], s.particle_at(299));
    }
}
