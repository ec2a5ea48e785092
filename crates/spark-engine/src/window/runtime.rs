use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{DeviceEvent, DeviceId, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{CursorGrabMode, Window, WindowId};

use crate::core::{App, AppControl, FrameCtx, WindowCtx};
use crate::device::{Gpu, GpuInit};
use crate::input::platform::{translate_device_event, translate_window_event};
use crate::input::{InputFrame, InputState};
use crate::time::FrameClock;

/// Settings for the window opened by [`Runtime::run`].
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
    /// Lock and hide the cursor while the window has focus.
    ///
    /// Raw mouse motion still arrives as `InputEvent::MouseMotion`.
    pub capture_cursor: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "spark".to_string(),
            initial_size: LogicalSize::new(1280.0, 720.0),
            capture_cursor: false,
        }
    }
}

/// Single-window event loop with continuous redraw.
pub struct Runtime;

impl Runtime {
    /// Opens the window, then calls `app` every frame until the window is
    /// closed or the app returns [`AppControl::Exit`].
    ///
    /// A failure to open the window or its GPU context is returned after the
    /// loop has shut down.
    pub fn run<A>(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Result<()>
    where
        A: App + 'static,
    {
        let event_loop = EventLoop::new().context("failed to create event loop")?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut handler = Handler {
            config,
            gpu_init,
            app,
            surface: None,
            input: InputState::default(),
            input_frame: InputFrame::default(),
            clock: FrameClock::new(),
            fatal: None,
        };

        event_loop
            .run_app(&mut handler)
            .context("event loop terminated with an error")?;

        handler.fatal.map_or(Ok(()), Err)
    }
}

/// The window and the GPU context that borrows it.
#[self_referencing]
struct WindowSurface {
    window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

impl WindowSurface {
    fn open(event_loop: &ActiveEventLoop, config: &RuntimeConfig, gpu_init: GpuInit) -> Result<Self> {
        let attrs = Window::default_attributes()
            .with_title(config.title.clone())
            .with_inner_size(config.initial_size);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        WindowSurfaceTryBuilder {
            window,
            gpu_builder: |window| {
                pollster::block_on(Gpu::new(window, gpu_init))
                    .context("failed to initialize GPU for window")
            },
        }
        .try_build()
    }

    fn id(&self) -> WindowId {
        self.with_window(|w| w.id())
    }
}

struct Handler<A: App> {
    config: RuntimeConfig,
    gpu_init: GpuInit,
    app: A,

    surface: Option<WindowSurface>,
    input: InputState,
    input_frame: InputFrame,
    clock: FrameClock,

    fatal: Option<anyhow::Error>,
}

impl<A: App> Handler<A> {
    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(surface) = self.surface.as_mut() else { return };

        let time = self.clock.tick();
        let (app, input, input_frame) = (&mut self.app, &self.input, &self.input_frame);

        let control = surface.with_mut(|fields| {
            let mut ctx = FrameCtx {
                window: WindowCtx {
                    id: fields.window.id(),
                    window: fields.window,
                },
                gpu: fields.gpu,
                input,
                input_frame,
                time,
            };
            app.on_frame(&mut ctx)
        });

        // Per-frame deltas belong to the frame that just ran.
        self.input_frame.clear();

        if control == AppControl::Exit {
            event_loop.exit();
        }
    }
}

impl<A: App> ApplicationHandler for Handler<A> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.surface.is_some() {
            return;
        }

        match WindowSurface::open(event_loop, &self.config, self.gpu_init.clone()) {
            Ok(surface) => {
                if self.config.capture_cursor {
                    surface.with_window(|w| set_cursor_captured(w, true));
                }
                self.input.focused = surface.with_window(|w| w.has_focus());
                surface.with_window(|w| w.request_redraw());
                self.surface = Some(surface);
                self.clock.reset();
            }
            Err(err) => {
                self.fatal = Some(err);
                event_loop.exit();
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(surface) = &self.surface {
            surface.with_window(|w| w.request_redraw());
        }
    }

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _device_id: DeviceId, event: DeviceEvent) {
        // Raw motion has no window; only the focused window consumes it.
        if !self.input.focused {
            return;
        }
        if let Some(ev) = translate_device_event(&event) {
            self.input.apply_event(&mut self.input_frame, ev);
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        let Some(surface) = self.surface.as_mut() else { return };
        if surface.id() != window_id {
            return;
        }

        let translated = surface.with_window(|w| translate_window_event(w, &self.input, &event));
        if let Some(ev) = translated {
            self.input.apply_event(&mut self.input_frame, ev);
        }

        if self.app.on_window_event(&event) == AppControl::Exit {
            event_loop.exit();
            return;
        }

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),

            WindowEvent::Focused(focused) => {
                if self.config.capture_cursor {
                    surface.with_window(|w| set_cursor_captured(w, focused));
                }
            }

            WindowEvent::Resized(size) => {
                surface.with_gpu_mut(|gpu| gpu.resize(size));
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                let size = surface.with_window(|w| w.inner_size());
                surface.with_gpu_mut(|gpu| gpu.resize(size));
            }

            WindowEvent::RedrawRequested => self.redraw(event_loop),

            _ => {}
        }
    }
}

/// Grabs the cursor, preferring a lock and falling back to confining it to
/// the window, and hides it. Releasing restores both.
fn set_cursor_captured(window: &Window, captured: bool) {
    if captured {
        let grabbed = window
            .set_cursor_grab(CursorGrabMode::Locked)
            .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined));
        if let Err(err) = grabbed {
            log::warn!("cursor capture unavailable: {err}");
        }
        window.set_cursor_visible(false);
    } else {
        if let Err(err) = window.set_cursor_grab(CursorGrabMode::None) {
            log::debug!("cursor release failed: {err}");
        }
        window.set_cursor_visible(true);
    }
}
