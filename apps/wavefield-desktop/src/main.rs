use anyhow::{Context as _, Result};
use clap::Parser;
use egui::Context as EguiContext;
use glam::Vec2;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use wavefield_config::SceneConfig;
use wavefield_field::BoxField;
use wavefield_input::{Action, GestureMapper, PointerEvent, PointerId, PointerPhase};
use wavefield_render_wgpu::{CameraRig, WgpuRenderer};
use wavefield_tools::{FieldInspector, FpsCounter};
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{
    ElementState, KeyEvent, MouseButton, MouseScrollDelta, Touch, TouchPhase, WindowEvent,
};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

/// Pixels per wheel line for trackpads that report pixel deltas.
const PIXELS_PER_LINE: f32 = 40.0;

/// Field steps allowed per redraw; backlog beyond this is dropped.
const MAX_TICKS_PER_FRAME: u64 = 120;

#[derive(Parser)]
#[command(name = "wavefield-desktop", about = "Wavefield desktop viewer")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Scene configuration (YAML); defaults are used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Start with the animation frozen
    #[arg(long)]
    paused: bool,
}

/// Application state.
struct AppState {
    config: SceneConfig,
    field: BoxField,
    rig: CameraRig,
    gestures: GestureMapper,
    fps: FpsCounter,
    paused: bool,
    show_overlay: bool,
    // Pointer state
    cursor: Vec2,
    mouse_down: bool,
    last_frame: Instant,
    // Fixed timestep
    tick_accumulator: f64,
    tick_rate: f64,
}

impl AppState {
    fn new(config: SceneConfig, paused: bool) -> Result<Self> {
        let field = BoxField::new(config.field.clone())?;
        let rig = CameraRig::new(&config.camera, 1280.0 / 720.0);
        let tick_rate = 1.0 / config.scene.tick_rate_hz as f64;
        tracing::info!(
            boxes = field.len(),
            presets = rig.preset_count(),
            tick_hz = config.scene.tick_rate_hz,
            "scene ready"
        );

        Ok(Self {
            config,
            field,
            rig,
            gestures: GestureMapper::default(),
            fps: FpsCounter::default(),
            paused,
            show_overlay: true,
            cursor: Vec2::ZERO,
            mouse_down: false,
            last_frame: Instant::now(),
            tick_accumulator: 0.0,
            tick_rate,
        })
    }

    fn update(&mut self, dt: f32) {
        self.rig.update(dt);

        // Fixed timestep: one tick advances the field by one frame
        self.tick_accumulator += dt as f64;
        let mut ticks = 0;
        while self.tick_accumulator >= self.tick_rate {
            self.tick_accumulator -= self.tick_rate;
            ticks += 1;
            if ticks == MAX_TICKS_PER_FRAME {
                self.tick_accumulator %= self.tick_rate;
                break;
            }
        }
        if !self.paused {
            self.field.advance(ticks);
        }
    }

    fn apply(&mut self, action: Action) {
        if action.affects_camera() {
            self.rig.apply(action);
            return;
        }
        match action {
            Action::TogglePause => {
                self.paused = !self.paused;
                tracing::info!(paused = self.paused, "animation");
            }
            Action::ToggleOverlay => {
                self.show_overlay = !self.show_overlay;
            }
            _ => {}
        }
    }

    fn pointer(&mut self, id: PointerId, phase: PointerPhase, position: Vec2) {
        if let Some(action) = self.gestures.handle(PointerEvent::new(id, phase, position)) {
            self.apply(action);
        }
    }

    /// Drop a mouse press whose release never reached the scene.
    fn cancel_mouse(&mut self) {
        if self.mouse_down {
            self.mouse_down = false;
            self.pointer(PointerId::Mouse, PointerPhase::Cancelled, self.cursor);
        }
    }

    fn handle_key(&mut self, key: KeyCode) {
        let action = match key {
            KeyCode::KeyC => Action::CycleCamera,
            KeyCode::Space => Action::TogglePause,
            KeyCode::KeyR => Action::ResetCamera,
            KeyCode::F1 => Action::ToggleOverlay,
            _ => Action::Noop,
        };
        self.apply(action);
    }

    /// Draw the stats overlay. Post effect toggles are written to `post`.
    fn draw_ui(&mut self, ctx: &EguiContext, post: &mut wavefield_config::PostOptions) {
        if !self.show_overlay {
            return;
        }

        let summary = FieldInspector::summary(&self.field);
        let eye = self.rig.camera().position();

        egui::Window::new("Wavefield")
            .anchor(egui::Align2::LEFT_TOP, [8.0, 8.0])
            .resizable(false)
            .collapsible(false)
            .show(ctx, |ui| {
                ui.label(format!("FPS: {:.0}", self.fps.fps()));
                ui.label(format!("Frame: {}", summary.frame));
                ui.label(format!(
                    "Camera: {} / {}",
                    self.rig.index() + 1,
                    self.rig.preset_count()
                ));
                ui.label(format!("Eye: ({:.1}, {:.1}, {:.1})", eye.x, eye.y, eye.z));
                ui.separator();
                ui.checkbox(&mut self.paused, "Paused (Space)");
                ui.checkbox(&mut post.vignette.enabled, "Vignette");
                ui.checkbox(&mut post.glow.enabled, "Glow");
                if ui.button("Next camera (C)").clicked() {
                    self.rig.cycle();
                }
                ui.separator();
                ui.small("Tap: cycle | Drag: orbit | Wheel: zoom | F1: overlay");
            });
    }
}

/// Everything that exists only once a window is up.
struct Gpu {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    renderer: WgpuRenderer,
    egui_winit: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

impl Gpu {
    fn new(
        event_loop: &ActiveEventLoop,
        egui_ctx: &EguiContext,
        scene: &SceneConfig,
    ) -> Result<Self> {
        let attrs = Window::default_attributes()
            .with_title("Wavefield")
            .with_inner_size(PhysicalSize::new(1280u32, 720));
        let window = Arc::new(event_loop.create_window(attrs).context("create window")?);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("create surface")?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("no suitable GPU adapter")?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("wavefield_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .context("create device")?;

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .context("surface reports no formats")?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let renderer = WgpuRenderer::new(&device, surface_format, config.width, config.height, scene);

        let egui_winit = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        tracing::info!(
            format = ?surface_format,
            "GPU initialized with {} backend",
            adapter.get_info().backend.to_str()
        );

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            renderer,
            egui_winit,
            egui_renderer,
        })
    }

    fn aspect(&self) -> f32 {
        self.config.width as f32 / self.config.height.max(1) as f32
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        self.config.width = size.width.max(1);
        self.config.height = size.height.max(1);
        self.surface.configure(&self.device, &self.config);
        self.renderer
            .resize(&self.device, self.config.width, self.config.height);
    }
}

struct GpuApp {
    state: AppState,
    gpu: Option<Gpu>,
    egui_ctx: EguiContext,
}

impl GpuApp {
    fn new(state: AppState) -> Self {
        Self {
            state,
            gpu: None,
            egui_ctx: EguiContext::default(),
        }
    }

    fn redraw(&mut self) {
        let now = Instant::now();
        let dt = (now - self.state.last_frame).as_secs_f32().min(0.1);
        self.state.last_frame = now;
        self.state.update(dt);

        let Some(gpu) = self.gpu.as_mut() else {
            return;
        };

        let output = match gpu.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.surface.configure(&gpu.device, &gpu.config);
                return;
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                return;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        gpu.renderer.render(
            &gpu.device,
            &gpu.queue,
            &view,
            self.state.rig.camera(),
            &self.state.field,
        );

        let mut post = gpu.renderer.post_options().clone();
        let raw_input = gpu.egui_winit.take_egui_input(&gpu.window);
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            self.state.draw_ui(ctx, &mut post);
        });
        if &post != gpu.renderer.post_options() {
            gpu.renderer.set_post_options(&post);
        }

        gpu.egui_winit
            .handle_platform_output(&gpu.window, full_output.platform_output);

        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [gpu.config.width, gpu.config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            gpu.egui_renderer
                .update_texture(&gpu.device, &gpu.queue, *id, image_delta);
        }
        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("egui_encoder"),
            });
        gpu.egui_renderer.update_buffers(
            &gpu.device,
            &gpu.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );
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
        gpu.queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            gpu.egui_renderer.free_texture(id);
        }

        output.present();
        self.state.fps.tick(Instant::now());
        gpu.window.request_redraw();
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }

        match Gpu::new(event_loop, &self.egui_ctx, &self.state.config) {
            Ok(gpu) => {
                self.state.rig.set_aspect(gpu.aspect());
                self.gpu = Some(gpu);
            }
            Err(e) => {
                tracing::error!("failed to initialize GPU: {e:#}");
                event_loop.exit();
            }
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
            if response.consumed {
                // a release over the overlay still ends a gesture begun in the scene
                match event {
                    WindowEvent::MouseInput {
                        button: MouseButton::Left,
                        state: ElementState::Released,
                        ..
                    } => self.state.cancel_mouse(),
                    WindowEvent::Touch(Touch {
                        phase: TouchPhase::Ended | TouchPhase::Cancelled,
                        location,
                        id,
                        ..
                    }) => {
                        let position = Vec2::new(location.x as f32, location.y as f32);
                        self.state
                            .pointer(PointerId::Touch(id), PointerPhase::Cancelled, position);
                    }
                    _ => {}
                }
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(new_size);
                    self.state.rig.set_aspect(gpu.aspect());
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => {
                if key == KeyCode::Escape {
                    event_loop.exit();
                } else {
                    self.state.handle_key(key);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.state.cursor = Vec2::new(position.x as f32, position.y as f32);
                if self.state.mouse_down {
                    self.state
                        .pointer(PointerId::Mouse, PointerPhase::Moved, self.state.cursor);
                }
            }
            WindowEvent::MouseInput {
                button: MouseButton::Left,
                state: btn_state,
                ..
            } => {
                let phase = match btn_state {
                    ElementState::Pressed => PointerPhase::Started,
                    ElementState::Released => PointerPhase::Ended,
                };
                self.state.mouse_down = btn_state == ElementState::Pressed;
                self.state
                    .pointer(PointerId::Mouse, phase, self.state.cursor);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(p) => p.y as f32 / PIXELS_PER_LINE,
                };
                let action = self.state.gestures.wheel(lines);
                self.state.apply(action);
            }
            WindowEvent::Touch(Touch {
                phase,
                location,
                id,
                ..
            }) => {
                let phase = match phase {
                    TouchPhase::Started => PointerPhase::Started,
                    TouchPhase::Moved => PointerPhase::Moved,
                    TouchPhase::Ended => PointerPhase::Ended,
                    TouchPhase::Cancelled => PointerPhase::Cancelled,
                };
                let position = Vec2::new(location.x as f32, location.y as f32);
                self.state.pointer(PointerId::Touch(id), phase, position);
            }
            WindowEvent::RedrawRequested => {
                self.redraw();
            }
            _ => {}
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
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("wavefield-desktop starting");

    let config = match &cli.config {
        Some(path) => SceneConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => SceneConfig::default(),
    };
    let state = AppState::new(config, cli.paused)?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GpuApp::new(state);
    event_loop.run_app(&mut app)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> AppState {
        AppState::new(SceneConfig::default(), false).unwrap()
    }

    #[test]
    fn fixed_timestep_steps_once_per_tick() {
        let mut s = state();
        s.update(0.055);
        assert_eq!(s.field.frame(), 3);
        s.update(0.001);
        assert_eq!(s.field.frame(), 3);
    }

    #[test]
    fn paused_field_does_not_advance() {
        let mut s = AppState::new(SceneConfig::default(), true).unwrap();
        s.update(0.105);
        assert_eq!(s.field.frame(), 0);
        s.handle_key(KeyCode::Space);
        assert!(!s.paused);
        s.update(0.02);
        assert_eq!(s.field.frame(), 1);
    }

    #[test]
    fn mouse_click_cycles_camera() {
        let mut s = state();
        let p = Vec2::new(100.0, 100.0);
        s.pointer(PointerId::Mouse, PointerPhase::Started, p);
        s.pointer(PointerId::Mouse, PointerPhase::Ended, p);
        assert_eq!(s.rig.index(), 1);
    }

    #[test]
    fn touch_drag_orbits_without_cycling() {
        let mut s = state();
        let before = s.rig.camera().spherical().alpha;
        s.pointer(PointerId::Touch(1), PointerPhase::Started, Vec2::ZERO);
        s.pointer(PointerId::Touch(1), PointerPhase::Moved, Vec2::new(60.0, 0.0));
        s.pointer(PointerId::Touch(1), PointerPhase::Ended, Vec2::new(60.0, 0.0));
        assert_eq!(s.rig.index(), 0);
        assert!((s.rig.camera().spherical().alpha - before).abs() > 1e-3);
    }

    #[test]
    fn release_over_overlay_ends_the_drag() {
        let mut s = state();
        s.cursor = Vec2::new(100.0, 100.0);
        s.mouse_down = true;
        s.pointer(PointerId::Mouse, PointerPhase::Started, s.cursor);
        s.pointer(PointerId::Mouse, PointerPhase::Moved, Vec2::new(160.0, 100.0));

        s.cancel_mouse();
        assert!(!s.mouse_down);
        assert_eq!(s.gestures.active_contacts(), 0);
        assert_eq!(s.rig.index(), 0);

        let alpha = s.rig.camera().spherical().alpha;
        s.pointer(PointerId::Mouse, PointerPhase::Moved, Vec2::new(300.0, 100.0));
        assert_eq!(s.rig.camera().spherical().alpha, alpha);
    }

    #[test]
    fn huge_tick_rate_is_bounded_per_frame() {
        let mut config = SceneConfig::default();
        config.scene.tick_rate_hz = 1.0e9;
        let mut s = AppState::new(config, false).unwrap();
        s.update(0.1);
        assert_eq!(s.field.frame(), MAX_TICKS_PER_FRAME);
        assert!(s.tick_accumulator < s.tick_rate);
    }

    #[test]
    fn keys_map_to_actions() {
        let mut s = state();
        s.handle_key(KeyCode::KeyC);
        assert_eq!(s.rig.index(), 1);
        s.handle_key(KeyCode::KeyR);
        assert_eq!(s.rig.index(), 0);
        s.handle_key(KeyCode::F1);
        assert!(!s.show_overlay);
    }
}
