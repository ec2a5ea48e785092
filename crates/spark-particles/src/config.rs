//! Demo configuration.
//!
//! Every field has a default matching the stock demo, so a config file only
//! needs to name what it changes. The file is TOML and loaded once at startup.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::particle::{DispatchPlan, Particle};

/// Largest particle buffer the demo will allocate.
///
/// Matches wgpu's default `max_storage_buffer_binding_size`, so the default
/// device limits are always sufficient.
pub const MAX_PARTICLE_BUFFER_BYTES: u64 = 128 << 20;

/// wgpu's default `max_compute_invocations_per_workgroup`.
pub const MAX_WORKGROUP_SIZE: u32 = 256;

/// wgpu's default `max_compute_workgroups_per_dimension`.
pub const MAX_WORKGROUP_COUNT: u32 = 65_535;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParticlesConfig {
    pub window: WindowConfig,
    pub simulation: SimulationConfig,
    pub seed: SeedConfig,
    pub camera: CameraConfig,
    pub render: RenderConfig,
    /// `env_logger` filter; overrides `RUST_LOG` when set.
    pub log_filter: Option<String>,
    /// Frames between FPS log lines. Zero disables the report.
    pub fps_report_interval: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub vsync: bool,
    /// 1 disables multisampling; 4 is the only other supported count.
    pub msaa_samples: u32,
    pub capture_cursor: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Invocations per compute workgroup.
    pub workgroup_size: u32,
    /// Workgroups dispatched per frame. Particle count is `size * count`.
    pub workgroup_count: u32,
    /// Half extents of the box particles bounce inside.
    pub bounds: [f32; 3],
    pub start_paused: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SeedConfig {
    pub seed: u64,
    /// Noise frequency applied to every sample coordinate.
    pub frequency: f32,
    /// Scale from noise output to world units for positions.
    pub spread: f32,
    /// Largest billboard size.
    pub size_scale: f32,
    pub velocity_scale: f32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CameraConfig {
    pub position: [f32; 3],
    pub near: f32,
    pub far: f32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    pub clear_color: [f32; 4],
    /// Sprite image drawn on each billboard. A generated circle is used when unset.
    pub sprite: Option<PathBuf>,
}

impl Default for ParticlesConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            simulation: SimulationConfig::default(),
            seed: SeedConfig::default(),
            camera: CameraConfig::default(),
            render: RenderConfig::default(),
            log_filter: None,
            fps_report_interval: 1000,
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Particles".to_string(),
            width: 1920,
            height: 1080,
            vsync: true,
            msaa_samples: 4,
            capture_cursor: true,
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            workgroup_size: 256,
            workgroup_count: 8000,
            bounds: [1920.0; 3],
            start_paused: true,
        }
    }
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            seed: 1337,
            frequency: 0.005,
            spread: 1920.0,
            size_scale: 3.0,
            velocity_scale: 0.015,
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: [0.0, 0.0, 3.0],
            near: 0.1,
            far: 10_000.0,
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            clear_color: [0.0, 0.0, 0.0, 1.0],
            sprite: None,
        }
    }
}

impl ParticlesConfig {
    /// Reads and parses a TOML config file. Does not validate.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("failed to parse TOML")
    }

    pub fn dispatch_plan(&self) -> DispatchPlan {
        DispatchPlan::new(self.simulation.workgroup_size, self.simulation.workgroup_count)
    }

    /// Rejects values that would fail later on the GPU or produce NaNs.
    pub fn validate(&self) -> Result<()> {
        let w = &self.window;
        anyhow::ensure!(w.width > 0 && w.height > 0, "window size must be non-zero");
        anyhow::ensure!(
            w.msaa_samples == 1 || w.msaa_samples == 4,
            "msaa_samples must be 1 or 4, got {}",
            w.msaa_samples
        );

        let sim = &self.simulation;
        anyhow::ensure!(
            (1..=MAX_WORKGROUP_SIZE).contains(&sim.workgroup_size),
            "workgroup_size must be in 1..={MAX_WORKGROUP_SIZE}, got {}",
            sim.workgroup_size
        );
        anyhow::ensure!(
            (1..=MAX_WORKGROUP_COUNT).contains(&sim.workgroup_count),
            "workgroup_count must be in 1..={MAX_WORKGROUP_COUNT}, got {}",
            sim.workgroup_count
        );
        anyhow::ensure!(
            sim.bounds.iter().all(|b| b.is_finite() && *b > 0.0),
            "simulation bounds must be positive and finite"
        );

        let bytes = self.dispatch_plan().buffer_bytes();
        anyhow::ensure!(
            bytes <= MAX_PARTICLE_BUFFER_BYTES,
            "{} particles need {bytes} bytes, more than the {MAX_PARTICLE_BUFFER_BYTES} byte limit \
             ({} bytes per particle)",
            self.dispatch_plan().particle_count(),
            Particle::STRIDE
        );

        let s = &self.seed;
        anyhow::ensure!(
            [s.frequency, s.spread, s.size_scale, s.velocity_scale]
                .iter()
                .all(|v| v.is_finite()),
            "seed scales must be finite"
        );
        anyhow::ensure!(s.frequency > 0.0, "noise frequency must be positive");

        let c = &self.camera;
        anyhow::ensure!(c.position.iter().all(|v| v.is_finite()), "camera position must be finite");
        anyhow::ensure!(
            c.near > 0.0 && c.far > c.near && c.far.is_finite(),
            "camera clip planes must satisfy 0 < near < far"
        );

        anyhow::ensure!(
            self.render.clear_color.iter().all(|v| v.is_finite()),
            "clear_color must be finite"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = ParticlesConfig::default();
        cfg.validate().unwrap();
        assert_eq!(cfg.dispatch_plan().particle_count(), 2_048_000);
        assert!(cfg.simulation.start_paused);
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let cfg = ParticlesConfig::from_toml(
            r#"
            fps_report_interval = 60

            [window]
            vsync = false

            [simulation]
            workgroup_count = 16
            "#,
        )
        .unwrap();

        assert_eq!(cfg.fps_report_interval, 60);
        assert!(!cfg.window.vsync);
        assert_eq!(cfg.window.width, 1920);
        assert_eq!(cfg.simulation.workgroup_count, 16);
        assert_eq!(cfg.simulation.workgroup_size, 256);
        assert_eq!(cfg.seed, SeedConfig::default());
    }

    #[test]
    fn empty_toml_is_default() {
        assert_eq!(ParticlesConfig::from_toml("").unwrap(), ParticlesConfig::default());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(ParticlesConfig::from_toml("[window]\nfullscreen = true\n").is_err());
    }

    #[test]
    fn sprite_path_parses() {
        let cfg = ParticlesConfig::from_toml("[render]\nsprite = \"data/circle.png\"\n").unwrap();
        assert_eq!(cfg.render.sprite, Some(PathBuf::from("data/circle.png")));
    }

    #[test]
    fn oversized_buffer_is_rejected() {
        let mut cfg = ParticlesConfig::default();
        cfg.simulation.workgroup_count = MAX_WORKGROUP_COUNT;
        let err = cfg.validate().unwrap_err().to_string();
        assert!(err.contains("byte limit"), "{err}");
    }

    #[test]
    fn workgroup_limits_are_enforced() {
        let mut cfg = ParticlesConfig::default();
        cfg.simulation.workgroup_size = 1024;
        assert!(cfg.validate().is_err());

        cfg.simulation.workgroup_size = 64;
        cfg.simulation.workgroup_count = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn unsupported_sample_count_is_rejected() {
        let mut cfg = ParticlesConfig::default();
        cfg.window.msaa_samples = 2;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn inverted_clip_planes_are_rejected() {
        let mut cfg = ParticlesConfig::default();
        cfg.camera.near = 10.0;
        cfg.camera.far = 1.0;
        assert!(cfg.validate().is_err());
    }
}
