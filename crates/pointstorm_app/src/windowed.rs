//! Windowed frame loop
//!
//! Owns the window, surface and GPU resources, and drives one frame per
//! redraw. Setup happens in `resumed`: window, surface, device, point upload,
//! then the pipeline. `RenderState` fields are declared so they drop in the
//! reverse of that order.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use pointstorm_core::{PointBuffer, PointstormConfig, Resolution};
use pointstorm_gpu::{ExpansionRenderer, GpuContext, PointUpload, ShaderSources};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::window::{Window, WindowId};

use crate::context::RenderContext;
use crate::fps::FrameCounter;

/// GPU resources bound to the open window
struct RenderState {
    renderer: ExpansionRenderer,
    upload: PointUpload,
    surface_config: wgpu::SurfaceConfiguration,
    gpu: GpuContext,
    surface: wgpu::Surface<'static>,
    window: Arc<Window>,
}

impl RenderState {
    fn reconfigure(&mut self, resolution: Resolution) {
        self.surface_config.width = resolution.width;
        self.surface_config.height = resolution.height;
        self.surface.configure(self.gpu.device(), &self.surface_config);
    }
}

/// Application handler for the point cloud window
pub struct PointstormApp {
    config: PointstormConfig,
    points: Option<PointBuffer>,
    state: Option<RenderState>,
    context: RenderContext,
    fps: FrameCounter,
    error: Option<anyhow::Error>,
}

impl PointstormApp {
    pub fn new(config: PointstormConfig, points: PointBuffer) -> Self {
        let resolution = Resolution::new(config.window.width, config.window.height);
        Self {
            config,
            points: Some(points),
            state: None,
            context: RenderContext::new(resolution),
            fps: FrameCounter::new(),
            error: None,
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<RenderState> {
        let window_config = &self.config.window;
        let attributes = Window::default_attributes()
            .with_title(window_config.title.clone())
            .with_inner_size(LogicalSize::new(window_config.width, window_config.height));
        let window = Arc::new(
            event_loop
                .create_window(attributes)
                .context("Failed to create window")?,
        );

        let (gpu, surface) = pollster::block_on(GpuContext::with_surface(window.clone()))?;

        let size = window.inner_size();
        self.context.on_resize(size.width, size.height);
        let surface_config =
            gpu.surface_config(&surface, self.context.resolution(), window_config.vsync)?;
        surface.configure(gpu.device(), &surface_config);

        // The host copy is released once the device holds the points
        let points = self.points.take().unwrap_or_default();
        let upload = gpu.upload(&points)?;
        drop(points);

        let renderer = ExpansionRenderer::new(
            gpu.device(),
            surface_config.format,
            &self.config.render,
            &ShaderSources::default(),
        )?;

        tracing::info!(
            "Window ready: {}x{} {:?}",
            surface_config.width,
            surface_config.height,
            surface_config.format
        );

        Ok(RenderState {
            renderer,
            upload,
            surface_config,
            gpu,
            surface,
            window,
        })
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        tracing::error!("{error:#}");
        self.error = Some(error);
        event_loop.exit();
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(state) = self.state.as_mut() else {
            return;
        };
        if !self.context.resolution().is_drawable() {
            return;
        }

        let frame = match state.surface.get_current_texture() {
            Ok(f) => f,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                state.surface.configure(state.gpu.device(), &state.surface_config);
                state.window.request_redraw();
                return;
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                self.fail(event_loop, anyhow!("Out of GPU memory"));
                return;
            }
            Err(e) => {
                tracing::warn!("Surface error: {:?}", e);
                return;
            }
        };

        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let inputs = self.context.begin_frame();

        let mut encoder = state
            .gpu
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });
        state.renderer.render(
            state.gpu.queue(),
            &mut encoder,
            &view,
            &state.upload,
            inputs.resolution,
            inputs.elapsed_seconds,
        );
        state.gpu.queue().submit(Some(encoder.finish()));

        state.window.pre_present_notify();
        frame.present();

        if let Some(fps) = self.fps.tick(Instant::now()) {
            tracing::info!("FPS={fps}");
        }
    }
}

impl ApplicationHandler for PointstormApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }

        match self.init(event_loop) {
            Ok(state) => {
                state.window.request_redraw();
                self.state = Some(state);
            }
            Err(e) => self.fail(event_loop, e),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                tracing::info!("Close requested");
                event_loop.exit();
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        logical_key: Key::Named(NamedKey::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => {
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                tracing::debug!("Resized to {}x{}", size.width, size.height);
                self.context.on_resize(size.width, size.height);
                let resolution = self.context.resolution();
                if let Some(state) = self.state.as_mut() {
                    if resolution.is_drawable() {
                        state.reconfigure(resolution);
                    }
                    if self.context.needs_redraw() {
                        state.window.request_redraw();
                    }
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        // The rotation is time driven, so every iteration produces a frame
        if let Some(state) = &self.state {
            state.window.request_redraw();
        }
    }
}

/// Open the window and render until it is closed
pub fn run(config: PointstormConfig, points: PointBuffer) -> Result<()> {
    let event_loop = EventLoop::new().context("Failed to create event loop")?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = PointstormApp::new(config, points);
    event_loop
        .run_app(&mut app)
        .context("Event loop terminated with an error")?;

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
