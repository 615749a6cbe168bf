use anyhow::{Context as _, Result};
use clap::Parser;
use egui::Context as EguiContext;
use sprig_input::{InputState, Key};
use sprig_render_wgpu::{FrameDriver, RenderError, WgpuBackend};
use sprig_scene::SceneConfig;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{DeviceEvent, ElementState, KeyEvent, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{CursorGrabMode, Window, WindowId};

#[derive(Parser)]
#[command(name = "sprig-desktop", about = "Sprig scene viewer")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Scene configuration (YAML). Defaults are used when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Initial window width
    #[arg(long, default_value_t = 1280)]
    width: u32,

    /// Initial window height
    #[arg(long, default_value_t = 720)]
    height: u32,
}

fn map_key(code: KeyCode) -> Option<Key> {
    match code {
        KeyCode::KeyW => Some(Key::Forward),
        KeyCode::KeyS => Some(Key::Back),
        KeyCode::KeyA => Some(Key::Left),
        KeyCode::KeyD => Some(Key::Right),
        KeyCode::ShiftLeft | KeyCode::ShiftRight => Some(Key::Up),
        KeyCode::KeyC => Some(Key::Down),
        KeyCode::Space => Some(Key::Boost),
        _ => None,
    }
}

const CONTROLS: &str = "WASD: move | Shift/C: up/down | Space: boost\nClick: capture pointer | Esc: release | F1: overlay";

/// Everything that only exists once the window and device are up.
struct Gpu {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    config: wgpu::SurfaceConfiguration,
    driver: FrameDriver,
    egui_winit: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

struct App {
    scene_config: SceneConfig,
    initial_size: PhysicalSize<u32>,
    input: InputState,
    show_overlay: bool,
    egui_ctx: EguiContext,
    gpu: Option<Gpu>,
    fatal: Option<anyhow::Error>,
}

impl App {
    fn new(scene_config: SceneConfig, initial_size: PhysicalSize<u32>) -> Self {
        Self {
            scene_config,
            initial_size,
            input: InputState::new(),
            show_overlay: true,
            egui_ctx: EguiContext::default(),
            gpu: None,
            fatal: None,
        }
    }

    fn init_gpu(&self, event_loop: &ActiveEventLoop) -> Result<Gpu> {
        let attrs = Window::default_attributes()
            .with_title("Sprig")
            .with_inner_size(self.initial_size);
        let window = Arc::new(event_loop.create_window(attrs)?);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window.clone())?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("no suitable GPU adapter")?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("sprig_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))?;

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        // The main program applies gamma itself.
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .context("surface reports no formats")?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);
        let driver = FrameDriver::new(WgpuBackend::new(device, queue), surface_format, &self.scene_config)?;

        let egui_winit = egui_winit::State::new(
            self.egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );

        tracing::info!(
            backend = adapter.get_info().backend.to_str(),
            format = ?surface_format,
            "GPU initialized"
        );

        Ok(Gpu {
            window,
            surface,
            config,
            driver,
            egui_winit,
            egui_renderer,
        })
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        tracing::error!("{err:#}");
        self.fatal = Some(err);
        event_loop.exit();
    }

    fn set_captured(&mut self, captured: bool) {
        self.input.pointer_captured = captured;
        self.input.pointer.take();
        let Some(gpu) = &self.gpu else {
            return;
        };
        let grab = if captured {
            gpu.window
                .set_cursor_grab(CursorGrabMode::Locked)
                .or_else(|_| gpu.window.set_cursor_grab(CursorGrabMode::Confined))
        } else {
            gpu.window.set_cursor_grab(CursorGrabMode::None)
        };
        if let Err(e) = grab {
            tracing::warn!("cursor grab failed: {e}");
        }
        gpu.window.set_cursor_visible(!captured);
    }

    fn handle_key(&mut self, code: KeyCode, pressed: bool) {
        if let Some(key) = map_key(code) {
            self.input.keys.set(key, pressed);
        }
        if !pressed {
            return;
        }
        match code {
            KeyCode::F1 => self.show_overlay = !self.show_overlay,
            KeyCode::Escape => self.set_captured(false),
            _ => {}
        }
    }

    fn redraw(&mut self) -> Result<(), RenderError> {
        let Some(gpu) = &mut self.gpu else {
            return Ok(());
        };

        let output = match gpu.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.surface.configure(gpu.driver.device(), &gpu.config);
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                tracing::warn!("surface timeout, skipping frame");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        gpu.driver
            .frame(&mut self.input, &view, gpu.config.width, gpu.config.height)?;

        let raw_input = gpu.egui_winit.take_egui_input(&gpu.window);
        let show_overlay = self.show_overlay;
        let driver = &gpu.driver;
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            if show_overlay {
                draw_overlay(ctx, driver);
            }
        });
        gpu.egui_winit
            .handle_platform_output(&gpu.window, full_output.platform_output);

        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [gpu.config.width, gpu.config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        let device = gpu.driver.device();
        let queue = gpu.driver.queue();
        for (id, image_delta) in &full_output.textures_delta.set {
            gpu.egui_renderer
                .update_texture(device, queue, *id, image_delta);
        }
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("egui_encoder"),
        });
        gpu.egui_renderer
            .update_buffers(device, queue, &mut encoder, &paint_jobs, &screen_descriptor);
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();
            gpu.egui_renderer
                .render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            gpu.egui_renderer.free_texture(id);
        }

        output.present();
        gpu.window.request_redraw();
        Ok(())
    }
}

fn draw_overlay(ctx: &EguiContext, driver: &FrameDriver) {
    let scene = driver.scene();
    let summary = driver.summary();
    let position = scene.player().position();

    egui::SidePanel::left("overlay")
        .default_width(300.0)
        .show(ctx, |ui| {
            ui.heading("Sprig");
            ui.separator();
            ui.label(driver.stats().to_string());
            ui.label(format!(
                "cubes: {}/{}  elapsed: {:.1}s",
                scene.live_cubes(),
                scene.cubes().len(),
                scene.elapsed_ms() / 1000.0
            ));
            ui.label(format!(
                "player: ({:.1}, {:.1}, {:.1})",
                position.x, position.y, position.z
            ));
            if let Some((main, shadow)) = driver.renderer().draw_counts() {
                ui.label(format!("draws: main={main} shadow={shadow}"));
            }
            ui.separator();

            ui.heading("Pools");
            for pool in &summary.pools {
                ui.monospace(pool.to_string());
            }
            ui.separator();
            ui.small(CONTROLS);
        });
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }
        match self.init_gpu(event_loop) {
            Ok(gpu) => self.gpu = Some(gpu),
            Err(e) => self.fail(event_loop, e.context("GPU initialization failed")),
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let Some(gpu) = &mut self.gpu {
            let response = gpu.egui_winit.on_window_event(&gpu.window, &event);
            if response.consumed && !self.input.pointer_captured {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.config.width = new_size.width.max(1);
                    gpu.config.height = new_size.height.max(1);
                    gpu.surface.configure(gpu.driver.device(), &gpu.config);
                }
            }
            WindowEvent::Focused(false) => {
                self.input.keys.clear();
                self.set_captured(false);
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state,
                        ..
                    },
                ..
            } => {
                self.handle_key(code, state == ElementState::Pressed);
            }
            WindowEvent::MouseInput {
                button: MouseButton::Left,
                state: ElementState::Pressed,
                ..
            } if !self.input.pointer_captured => {
                self.set_captured(true);
            }
            WindowEvent::RedrawRequested => {
                if let Err(e) = self.redraw() {
                    self.fail(event_loop, e.into());
                }
            }
            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta } = event {
            self.input.pointer_moved(delta.0 as f32, delta.1 as f32);
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(gpu) = &self.gpu {
            gpu.window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    let scene_config = match &cli.config {
        Some(path) => SceneConfig::load(path)
            .with_context(|| format!("failed to load scene config {}", path.display()))?,
        None => SceneConfig::default(),
    };

    tracing::info!(seed = scene_config.seed, cubes = scene_config.cube_count, "sprig-desktop starting");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(scene_config, PhysicalSize::new(cli.width, cli.height));
    event_loop.run_app(&mut app)?;

    match app.fatal {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
