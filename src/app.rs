//! The render loop controller.
//!
//! [`run`] drives the winit event loop through two states: `Pending` until
//! the first resume creates the window and GPU resources, then `Running`
//! until the quit key or a close request exits. Each `RedrawRequested`
//! executes one frame:
//!
//! 1. delta time from a monotonic clock; quit key checked (honored after
//!    the frame in flight completes)
//! 2. camera consumes input, possibly mutating its pose
//! 3. the accumulator compares the pose against last frame's snapshot and
//!    yields this frame's sample number
//! 4. frame uniforms are uploaded to the trace pass
//! 5. compute dispatch and post-process draw are recorded into one encoder,
//!    so the storage write is ordered before the composite read
//! 6. the sample counter advances, the frame is presented, and per-frame
//!    input state clears

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use glam::Vec3;
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::KeyCode;
use winit::window::{Window, WindowAttributes, WindowId};

use crate::accumulation::Accumulator;
use crate::camera::Camera;
use crate::error::SetupError;
use crate::gpu::GpuContext;
use crate::input::Input;
use crate::mesh::Mesh;
use crate::post_process::PostProcessPass;
use crate::shader::ShaderSource;
use crate::texture::Texture;
use crate::trace_pass::TracePass;
use crate::volume::Volume;

/// Configuration for a renderer run.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Vertical field of view in degrees.
    pub fov_y_degrees: f32,
    pub trace_shader: PathBuf,
    pub post_process_shader: PathBuf,
    pub environment_map: PathBuf,
    pub volume: Volume,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "Clerestory".to_string(),
            width: 1920,
            height: 1080,
            fov_y_degrees: 45.0,
            trace_shader: PathBuf::from("assets/shaders/trace.wgsl"),
            post_process_shader: PathBuf::from("assets/shaders/post_process.wgsl"),
            environment_map: PathBuf::from("assets/hdri/puresky.hdr"),
            volume: Volume::new(Vec3::new(-10.0, -2.0, -10.0), Vec3::new(10.0, 6.0, 10.0)),
        }
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn fov_y(mut self, degrees: f32) -> Self {
        self.fov_y_degrees = degrees;
        self
    }

    pub fn trace_shader(mut self, path: impl Into<PathBuf>) -> Self {
        self.trace_shader = path.into();
        self
    }

    pub fn post_process_shader(mut self, path: impl Into<PathBuf>) -> Self {
        self.post_process_shader = path.into();
        self
    }

    pub fn environment_map(mut self, path: impl Into<PathBuf>) -> Self {
        self.environment_map = path.into();
        self
    }

    pub fn volume(mut self, volume: Volume) -> Self {
        self.volume = volume;
        self
    }
}

/// Runs the renderer until the window closes or the quit key is pressed.
///
/// Setup failures (window, device, assets, shaders) are returned to the
/// caller; there is no recovery path, the only reasonable reaction is to
/// abort the run.
pub fn run(config: AppConfig) -> Result<(), SetupError> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::Pending {
        config: Some(config),
    };
    event_loop.run_app(&mut app)?;

    match app {
        App::Failed(error) => Err(error),
        _ => Ok(()),
    }
}

enum App {
    Pending { config: Option<AppConfig> },
    Running(Box<State>),
    Failed(SetupError),
}

struct State {
    window: Arc<Window>,
    gpu: GpuContext,
    camera: Camera,
    input: Input,
    trace: TracePass,
    post_process: PostProcessPass,
    quad: Mesh,
    accumulator: Accumulator,
    start_time: Instant,
    last_frame: Instant,
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if let App::Pending { config } = self {
            let config = config.take().expect("resumed twice while pending");
            match State::new(event_loop, config) {
                Ok(state) => *self = App::Running(Box::new(state)),
                Err(error) => {
                    *self = App::Failed(error);
                    event_loop.exit();
                }
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let App::Running(state) = self else {
            return;
        };

        state.input.handle_event(&event);

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                state.resize(size.width, size.height);
            }
            WindowEvent::RedrawRequested => {
                state.render_frame(event_loop);
            }
            _ => {}
        }
    }
}

impl State {
    fn new(event_loop: &ActiveEventLoop, config: AppConfig) -> Result<Self, SetupError> {
        let window_attrs = WindowAttributes::default()
            .with_title(&config.title)
            .with_inner_size(winit::dpi::PhysicalSize::new(config.width, config.height));
        let window = Arc::new(event_loop.create_window(window_attrs)?);

        let gpu = GpuContext::new(window.clone())?;

        let camera = Camera::new(config.fov_y_degrees, gpu.width());

        let environment = Texture::from_hdr(&gpu, &config.environment_map)?;
        log::info!(
            "environment map {} ({}x{})",
            config.environment_map.display(),
            environment.width,
            environment.height
        );

        let trace_source = ShaderSource::load(&config.trace_shader)?;
        let trace = TracePass::new(
            &gpu,
            &trace_source,
            environment,
            &config.volume,
            gpu.width(),
            gpu.height(),
        )?;

        let post_source = ShaderSource::load(&config.post_process_shader)?;
        let post_process = PostProcessPass::new(&gpu, &post_source)?;

        let quad = Mesh::quad(&gpu);
        let accumulator = Accumulator::new(camera.transform().model_matrix());

        window.request_redraw();

        Ok(Self {
            window,
            gpu,
            camera,
            input: Input::new(),
            trace,
            post_process,
            quad,
            accumulator,
            start_time: Instant::now(),
            last_frame: Instant::now(),
        })
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.gpu.resize(width, height);
        self.trace.resize(&self.gpu, width, height);
        // Keep the field of view; the focal length depends on the width.
        self.camera.set_fov_y(self.camera.fov_y_degrees(), width);
        self.accumulator.reset();
    }

    fn render_frame(&mut self, event_loop: &ActiveEventLoop) {
        let now = Instant::now();
        let delta_time = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;
        let time = self.start_time.elapsed().as_secs_f32();

        // Quit is checked before rendering and honored after: the event
        // loop exits once this frame has been presented.
        if self.input.key_pressed(KeyCode::Escape) {
            event_loop.exit();
        }

        self.camera.process_input(&self.input, delta_time);

        let sample_num = self
            .accumulator
            .begin_frame(self.camera.transform().model_matrix());

        self.trace
            .write_frame_uniforms(&self.gpu, time, sample_num, &self.camera);

        let output = match self.gpu.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.gpu.resize(self.gpu.width(), self.gpu.height());
                self.window.request_redraw();
                return;
            }
            Err(error) => {
                log::error!("failed to acquire frame: {error}");
                self.window.request_redraw();
                return;
            }
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        self.trace
            .dispatch(&mut encoder, self.gpu.width(), self.gpu.height());

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Composite Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            self.post_process.render(
                &self.gpu,
                &mut render_pass,
                time,
                self.trace.output_view(),
                &self.quad,
            );
        }

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        self.accumulator.end_frame();
        self.input.begin_frame();
        self.window.request_redraw();
    }
}
