//! Frame sequencing: input, simulation step, billboard pass, FPS report.

use glam::Vec3;

use spark_engine::core::{App, AppControl, FrameCtx};
use spark_engine::input::{InputFrame, InputState, Key};
use spark_engine::render::RenderCtx;
use spark_engine::time::FpsCounter;

use crate::camera::{Camera, CameraMovement};
use crate::config::ParticlesConfig;
use crate::gpu::{
    BillboardRenderer, CameraUniform, ComputePass, ParticleBuffer, SimUniform, SpriteTexture,
};
use crate::particle::{DispatchPlan, Particle};
use crate::sprite::SpriteImage;

const MOVEMENT_KEYS: [(Key, CameraMovement); 4] = [
    (Key::W, CameraMovement::Forward),
    (Key::S, CameraMovement::Backward),
    (Key::A, CameraMovement::Left),
    (Key::D, CameraMovement::Right),
];

/// CPU-side state driven by input: the camera and the pause flag.
#[derive(Debug, Clone)]
pub struct Scene {
    pub camera: Camera,
    paused: bool,
}

impl Scene {
    pub fn new(config: &ParticlesConfig) -> Self {
        Self {
            camera: Camera::new(Vec3::from_array(config.camera.position)),
            paused: config.simulation.start_paused,
        }
    }

    pub fn paused(&self) -> bool {
        self.paused
    }

    /// Applies this frame's input.
    ///
    /// Escape exits, Q pauses and E resumes the simulation. WASD moves the
    /// camera (Shift boosts), mouse motion turns it and the wheel zooms.
    pub fn handle_input(&mut self, input: &InputState, frame: &InputFrame, dt: f32) -> AppControl {
        if input.key_down(Key::Escape) {
            return AppControl::Exit;
        }

        if input.key_down(Key::Q) && !self.paused {
            self.paused = true;
            log::info!("simulation paused");
        }
        if input.key_down(Key::E) && self.paused {
            self.paused = false;
            log::info!("simulation resumed");
        }

        self.camera.set_boost(input.key_down(Key::Shift));
        for (key, direction) in MOVEMENT_KEYS {
            if input.key_down(key) {
                self.camera.process_keyboard(direction, dt);
            }
        }

        // Window space is +Y down; pitch is +Y up.
        let (dx, dy) = frame.mouse_delta;
        if dx != 0.0 || dy != 0.0 {
            self.camera.process_mouse_movement(dx, -dy, true);
        }

        if frame.wheel_lines != 0.0 {
            self.camera.process_mouse_scroll(frame.wheel_lines);
        }

        AppControl::Continue
    }
}

/// Data prepared on the CPU before the window exists, uploaded on the first frame.
struct PendingUpload {
    particles: Vec<Particle>,
    sprite: SpriteImage,
}

struct GpuState {
    particles: ParticleBuffer,
    compute: ComputePass,
    billboard: BillboardRenderer,
    _sprite: SpriteTexture,
}

impl GpuState {
    fn new(ctx: &RenderCtx<'_>, upload: PendingUpload, plan: DispatchPlan, samples: u32) -> Self {
        let particles = ParticleBuffer::upload(ctx.device, &upload.particles);
        let sprite = SpriteTexture::upload(ctx.device, ctx.queue, &upload.sprite);
        let compute = ComputePass::new(ctx.device, &particles, plan);
        let billboard = BillboardRenderer::new(ctx.device, &sprite, samples);

        log::info!("uploaded {} particles to the GPU", particles.count());

        Self {
            particles,
            compute,
            billboard,
            _sprite: sprite,
        }
    }
}

pub struct ParticlesApp {
    config: ParticlesConfig,
    scene: Scene,
    upload: Option<PendingUpload>,
    gpu: Option<GpuState>,
    fps: FpsCounter,
}

impl ParticlesApp {
    /// `particles` must hold exactly `config.dispatch_plan().particle_count()` entries.
    pub fn new(config: ParticlesConfig, particles: Vec<Particle>, sprite: SpriteImage) -> Self {
        debug_assert_eq!(particles.len(), config.dispatch_plan().particle_count() as usize);

        Self {
            scene: Scene::new(&config),
            fps: FpsCounter::new(config.fps_report_interval),
            upload: Some(PendingUpload { particles, sprite }),
            gpu: None,
            config,
        }
    }
}

impl App for ParticlesApp {
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        let time = ctx.time;

        if self.scene.handle_input(ctx.input, ctx.input_frame, time.dt) == AppControl::Exit {
            log::info!("exit requested");
            return AppControl::Exit;
        }

        let cam = &self.config.camera;
        let camera = CameraUniform::new(
            &self.scene.camera,
            ctx.window.viewport().aspect(),
            cam.near,
            cam.far,
        );
        let sim = (!self.scene.paused()).then(|| SimUniform::new(self.config.simulation.bounds, &time));

        let plan = self.config.dispatch_plan();
        let samples = self.config.window.msaa_samples;
        let gpu = &mut self.gpu;
        let upload = &mut self.upload;

        let control = ctx.render(self.config.render.clear_color.into(), |rctx, target| {
            if gpu.is_none() {
                let Some(pending) = upload.take() else { return };
                *gpu = Some(GpuState::new(rctx, pending, plan, samples));
            }
            let Some(state) = gpu.as_mut() else { return };

            if let Some(sim) = &sim {
                state.compute.dispatch(rctx.queue, target.encoder, sim);
            }
            state.billboard.render(rctx, target, &state.particles, &camera);
        });

        if let Some(report) = self.fps.record(&time) {
            log::info!(
                "{:.1} fps ({} frames in {:.2}s)",
                report.fps,
                report.frames,
                report.seconds
            );
        }

        control
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spark_engine::input::{ButtonState, InputEvent, Modifiers, MouseWheelDelta};

    fn press(state: &mut InputState, frame: &mut InputFrame, key: Key) {
        state.apply_event(
            frame,
            InputEvent::Key {
                key,
                state: ButtonState::Pressed,
                modifiers: Modifiers::default(),
                code: 0,
                repeat: false,
            },
        );
    }

    fn scene() -> Scene {
        Scene::new(&ParticlesConfig::default())
    }

    #[test]
    fn starts_paused_at_configured_position() {
        let s = scene();
        assert!(s.paused());
        assert_eq!(s.camera.position, Vec3::new(0.0, 0.0, 3.0));
    }

    #[test]
    fn escape_exits() {
        let mut s = scene();
        let (mut input, mut frame) = (InputState::default(), InputFrame::default());
        assert_eq!(s.handle_input(&input, &frame, 0.016), AppControl::Continue);

        press(&mut input, &mut frame, Key::Escape);
        assert_eq!(s.handle_input(&input, &frame, 0.016), AppControl::Exit);
    }

    #[test]
    fn e_resumes_and_q_pauses() {
        let mut s = scene();
        let (mut input, mut frame) = (InputState::default(), InputFrame::default());

        press(&mut input, &mut frame, Key::E);
        s.handle_input(&input, &frame, 0.016);
        assert!(!s.paused());

        let mut input = InputState::default();
        press(&mut input, &mut frame, Key::Q);
        s.handle_input(&input, &frame, 0.016);
        assert!(s.paused());
    }

    #[test]
    fn held_w_moves_forward() {
        let mut s = scene();
        let (mut input, mut frame) = (InputState::default(), InputFrame::default());
        press(&mut input, &mut frame, Key::W);

        s.handle_input(&input, &frame, 1.0);
        assert!((s.camera.position.z - (3.0 - crate::camera::SPEED)).abs() < 1e-4);
    }

    #[test]
    fn shift_boosts_movement() {
        let mut s = scene();
        let (mut input, mut frame) = (InputState::default(), InputFrame::default());
        press(&mut input, &mut frame, Key::Shift);
        press(&mut input, &mut frame, Key::D);

        s.handle_input(&input, &frame, 0.01);
        let expected = crate::camera::SPEED * crate::camera::BOOST_MULTIPLIER * 0.01;
        assert!((s.camera.position.x - expected).abs() < 1e-3);
    }

    #[test]
    fn mouse_motion_up_pitches_up() {
        let mut s = scene();
        let (mut input, mut frame) = (InputState::default(), InputFrame::default());
        input.apply_event(&mut frame, InputEvent::MouseMotion { dx: 10.0, dy: -20.0 });

        s.handle_input(&input, &frame, 0.016);
        assert!((s.camera.yaw() - (-89.0)).abs() < 1e-4);
        assert!((s.camera.pitch() - 2.0).abs() < 1e-4);
    }

    #[test]
    fn wheel_zooms_in() {
        let mut s = scene();
        let (mut input, mut frame) = (InputState::default(), InputFrame::default());
        input.apply_event(
            &mut frame,
            InputEvent::MouseWheel {
                delta: MouseWheelDelta::Line { x: 0.0, y: 3.0 },
                modifiers: Modifiers::default(),
            },
        );

        s.handle_input(&input, &frame, 0.016);
        assert_eq!(s.camera.zoom(), 87.0);
    }
}
