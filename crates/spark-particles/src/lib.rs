//! GPU particle demo.
//!
//! A large particle buffer is seeded from simplex noise on the CPU, advanced
//! by a compute pass every frame and drawn as camera-facing sprites.

pub mod app;
pub mod camera;
pub mod config;
pub mod gpu;
pub mod noise;
pub mod particle;
pub mod sprite;

use anyhow::{Context, Result};
use winit::dpi::LogicalSize;

use spark_engine::device::GpuInit;
use spark_engine::window::{Runtime, RuntimeConfig};

use crate::app::ParticlesApp;
use crate::config::ParticlesConfig;
use crate::particle::ParticleSeeder;
use crate::sprite::{PROCEDURAL_SIZE, SpriteImage};

/// Validates `config`, prepares the particle set and sprite, then runs the
/// window loop until it exits.
pub fn run(config: ParticlesConfig) -> Result<()> {
    config.validate().context("invalid configuration")?;

    let plan = config.dispatch_plan();
    log::info!(
        "{} particles ({} workgroups x {}), {} MiB buffer",
        plan.particle_count(),
        plan.workgroup_count,
        plan.workgroup_size,
        plan.buffer_bytes() >> 20
    );

    let particles = ParticleSeeder::new(&config.seed).seed(plan.particle_count());
    log::debug!("seeded {} particles with seed {}", particles.len(), config.seed.seed);

    let sprite = match &config.render.sprite {
        Some(path) => SpriteImage::load(path)?,
        None => SpriteImage::procedural_circle(PROCEDURAL_SIZE),
    };

    let runtime = RuntimeConfig {
        title: config.window.title.clone(),
        initial_size: LogicalSize::new(f64::from(config.window.width), f64::from(config.window.height)),
        capture_cursor: config.window.capture_cursor,
    };
    let gpu_init = GpuInit::default().with_vsync(config.window.vsync);

    Runtime::run(runtime, gpu_init, ParticlesApp::new(config, particles, sprite))
}
