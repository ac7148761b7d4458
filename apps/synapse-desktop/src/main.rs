use anyhow::Result;
use clap::Parser;
use egui::Context as EguiContext;
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Instant;
use synapse_common::{PerformanceReport, SceneConfig, Tier};
use synapse_render_wgpu::{OrbitCamera, RenderStats, WgpuSceneRenderer};
use synapse_runtime::{MountState, SceneMount, Tick};
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

const BACKGROUND: wgpu::Color = wgpu::Color {
    r: 0.015,
    g: 0.015,
    b: 0.045,
    a: 1.0,
};

#[derive(Parser)]
#[command(name = "synapse-desktop", about = "Synapse scene desktop viewer")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Scene configuration file (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Force a quality tier, skipping the capability probe
    #[arg(long, value_parser = parse_tier)]
    tier: Option<Tier>,
}

fn parse_tier(s: &str) -> Result<Tier, String> {
    match s.to_ascii_lowercase().as_str() {
        "low" => Ok(Tier::Low),
        "medium" => Ok(Tier::Medium),
        "high" => Ok(Tier::High),
        other => Err(format!("unknown tier '{other}', expected low|medium|high")),
    }
}

fn load_config(cli: &Cli) -> Result<SceneConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .map_err(|e| anyhow::anyhow!("reading {}: {e}", path.display()))?;
            serde_json::from_str::<SceneConfig>(&text)
                .map_err(|e| anyhow::anyhow!("parsing {}: {e}", path.display()))?
        }
        None => SceneConfig::default(),
    };
    if cli.tier.is_some() {
        config.force_quality = cli.tier;
    }
    Ok(config)
}

fn centered_label(ctx: &EguiContext, text: &str) {
    egui::CentralPanel::default()
        .frame(egui::Frame::NONE)
        .show(ctx, |ui| {
            ui.centered_and_justified(|ui| {
                ui.label(text);
            });
        });
}

/// Application state outside the GPU/windowing plumbing.
struct AppState {
    mount: SceneMount,
    camera: OrbitCamera,
    last_report: Rc<RefCell<Option<PerformanceReport>>>,
    last_stats: RenderStats,
    show_stats: bool,
    mouse_down: bool,
    epoch: Instant,
}

impl AppState {
    fn new(config: SceneConfig) -> Result<Self> {
        let show_stats = config.show_performance_stats;
        let mut mount = SceneMount::new(config)?;

        let last_report: Rc<RefCell<Option<PerformanceReport>>> = Rc::default();
        let sink = Rc::clone(&last_report);
        mount.on_performance_report(move |report| *sink.borrow_mut() = Some(*report));

        tracing::info!(tier = %mount.tier(), state = ?mount.state(), "mounted");

        Ok(Self {
            mount,
            camera: OrbitCamera::default(),
            last_report,
            last_stats: RenderStats::default(),
            show_stats,
            mouse_down: false,
            epoch: Instant::now(),
        })
    }

    fn now_ms(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64() * 1000.0
    }

    fn draw_ui(&mut self, ctx: &EguiContext) {
        match self.mount.state() {
            MountState::Disabled => {
                centered_label(ctx, self.mount.placeholder_text());
                return;
            }
            MountState::Pending => {
                centered_label(ctx, "Loading scene...");
                return;
            }
            MountState::Active => {}
        }

        if !self.show_stats {
            return;
        }

        egui::Window::new("Performance")
            .default_width(220.0)
            .show(ctx, |ui| {
                match *self.last_report.borrow() {
                    Some(report) => {
                        ui.label(format!("FPS: {:.1}", report.fps));
                        ui.label(format!("Frame time: {:.2} ms", report.frame_time_ms));
                    }
                    None => {
                        ui.label("FPS: warming up");
                    }
                }
                ui.label(format!("Tier: {}", self.mount.tier()));
                ui.label(format!(
                    "Resolution scale: {:.2}",
                    self.mount.resolution_scale()
                ));
                ui.separator();
                let stats = self.last_stats;
                ui.label(format!(
                    "Nodes: {} drawn, {} culled",
                    stats.nodes_drawn, stats.nodes_culled
                ));
                ui.label(format!(
                    "LOD bins: {} / {} / {}",
                    stats.lod_bins[0], stats.lod_bins[1], stats.lod_bins[2]
                ));
                ui.label(format!("Edges: {}", stats.edges_drawn));
                ui.label(format!("Glow: {}", if stats.glow_pass { "on" } else { "off" }));
                ui.separator();
                ui.small("F1: toggle stats | drag: orbit | wheel: zoom");
            });
    }
}

struct GpuApp {
    state: AppState,
    window: Option<Arc<Window>>,
    surface: Option<wgpu::Surface<'static>>,
    device: Option<wgpu::Device>,
    queue: Option<wgpu::Queue>,
    config: Option<wgpu::SurfaceConfiguration>,
    renderer: Option<WgpuSceneRenderer>,
    window_size: PhysicalSize<u32>,
    visible: bool,
    egui_ctx: EguiContext,
    egui_winit: Option<egui_winit::State>,
    egui_renderer: Option<egui_wgpu::Renderer>,
}

impl GpuApp {
    fn new(state: AppState) -> Self {
        Self {
            state,
            window: None,
            surface: None,
            device: None,
            queue: None,
            config: None,
            renderer: None,
            window_size: PhysicalSize::new(1280, 720),
            visible: true,
            egui_ctx: EguiContext::default(),
            egui_winit: None,
            egui_renderer: None,
        }
    }

    /// Surface dimensions after the tier's resolution scale.
    fn scaled_size(&self) -> (u32, u32) {
        let scale = self.state.mount.resolution_scale();
        (
            ((self.window_size.width as f32 * scale) as u32).max(1),
            ((self.window_size.height as f32 * scale) as u32).max(1),
        )
    }

    fn reconfigure_surface(&mut self) {
        let (width, height) = self.scaled_size();
        if let (Some(surface), Some(device), Some(config)) =
            (&self.surface, &self.device, &mut self.config)
        {
            config.width = width;
            config.height = height;
            surface.configure(device, config);
            self.state.camera.aspect = width as f32 / height.max(1) as f32;
            if let Some(renderer) = &mut self.renderer {
                renderer.resize(device, width, height);
            }
        }
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attrs = Window::default_attributes()
            .with_title("Synapse")
            .with_inner_size(self.window_size);
        let window = Arc::new(event_loop.create_window(attrs).expect("create window"));

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .expect("create surface");

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .expect("find adapter");

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("synapse_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .expect("create device");

        self.window_size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let scale = self.state.mount.resolution_scale();
        let width = ((self.window_size.width as f32 * scale) as u32).max(1);
        let height = ((self.window_size.height as f32 * scale) as u32).max(1);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        self.state.camera.aspect = width as f32 / height.max(1) as f32;

        // The low-end fallback never gets a scene renderer; the device and
        // surface created above exist only to host the placeholder UI. The
        // mount itself builds no scene and holds no GPU resources.
        let renderer = (self.state.mount.state() != MountState::Disabled).then(|| {
            let scene_config = self.state.mount.config();
            WgpuSceneRenderer::new(
                &device,
                surface_format,
                width,
                height,
                BACKGROUND,
                scene_config.color1,
                scene_config.color2,
            )
        });

        let egui_winit = egui_winit::State::new(
            self.egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        self.window = Some(window);
        self.surface = Some(surface);
        self.device = Some(device);
        self.queue = Some(queue);
        self.config = Some(config);
        self.renderer = renderer;
        self.egui_winit = Some(egui_winit);
        self.egui_renderer = Some(egui_renderer);

        // A freshly mapped window is the intersecting viewport. Lazy mounts
        // start with a closed gate and cannot rely on an Occluded(false)
        // transition, which not every platform delivers for a window that
        // starts visible.
        let _ = self.state.mount.set_visible(true);

        tracing::info!(
            backend = adapter.get_info().backend.to_str(),
            tier = %self.state.mount.tier(),
            "GPU initialized"
        );
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let Some(egui_winit) = &mut self.egui_winit {
            let response = egui_winit.on_window_event(self.window.as_ref().unwrap(), &event);
            if response.consumed {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                self.window_size = new_size;
                self.reconfigure_surface();
            }
            WindowEvent::Occluded(occluded) => {
                self.visible = !occluded;
                let _ = self.state.mount.set_visible(self.visible);
                if self.visible {
                    if let Some(window) = &self.window {
                        window.request_redraw();
                    }
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => match key {
                KeyCode::F1 => {
                    self.state.show_stats = !self.state.show_stats;
                }
                KeyCode::Escape => {
                    event_loop.exit();
                }
                _ => {}
            },
            WindowEvent::MouseInput {
                button: MouseButton::Left,
                state: btn_state,
                ..
            } => {
                self.state.mouse_down = btn_state == ElementState::Pressed;
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let scroll = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y * 2.0,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 * 0.05,
                };
                self.state.camera.zoom(scroll);
            }
            WindowEvent::RedrawRequested => {
                let now_ms = self.state.now_ms();
                let tick = self.state.mount.tick(now_ms);

                match &tick {
                    Tick::Suspended => return,
                    Tick::Frame { rebuilt: Some(change), .. } => {
                        tracing::info!(from = %change.from, to = %change.to, "tier changed");
                        // Medium/Low differ in resolution scale; follow it.
                        self.reconfigure_surface();
                    }
                    _ => {}
                }

                let (Some(surface), Some(device), Some(queue)) =
                    (&self.surface, &self.device, &self.queue)
                else {
                    return;
                };

                let output = match surface.get_current_texture() {
                    Ok(t) => t,
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        if let Some(config) = &self.config {
                            surface.configure(device, config);
                        }
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

                let mut scene_drawn = false;
                if let (Some(renderer), Some(scene)) =
                    (&mut self.renderer, self.state.mount.scene())
                {
                    self.state.last_stats = renderer.render(
                        device,
                        queue,
                        &view,
                        &self.state.camera.view(),
                        scene,
                        self.state.mount.params(),
                    );
                    scene_drawn = true;
                }
                if !scene_drawn {
                    // Fallback/loading surface: clear only, egui draws the rest.
                    let mut encoder =
                        device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
                            label: Some("clear_encoder"),
                        });
                    encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                        label: Some("clear_pass"),
                        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                            view: &view,
                            resolve_target: None,
                            ops: wgpu::Operations {
                                load: wgpu::LoadOp::Clear(BACKGROUND),
                                store: wgpu::StoreOp::Store,
                            },
                        })],
                        depth_stencil_attachment: None,
                        ..Default::default()
                    });
                    queue.submit(std::iter::once(encoder.finish()));
                }

                let raw_input = self
                    .egui_winit
                    .as_mut()
                    .unwrap()
                    .take_egui_input(self.window.as_ref().unwrap());
                let full_output = self.egui_ctx.run(raw_input, |ctx| {
                    self.state.draw_ui(ctx);
                });

                self.egui_winit.as_mut().unwrap().handle_platform_output(
                    self.window.as_ref().unwrap(),
                    full_output.platform_output,
                );

                let paint_jobs = self
                    .egui_ctx
                    .tessellate(full_output.shapes, full_output.pixels_per_point);

                let screen_descriptor = egui_wgpu::ScreenDescriptor {
                    size_in_pixels: [
                        self.config.as_ref().unwrap().width,
                        self.config.as_ref().unwrap().height,
                    ],
                    pixels_per_point: full_output.pixels_per_point,
                };

                {
                    let egui_renderer = self.egui_renderer.as_mut().unwrap();
                    for (id, image_delta) in &full_output.textures_delta.set {
                        egui_renderer.update_texture(device, queue, *id, image_delta);
                    }
                    let mut encoder =
                        device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
                            label: Some("egui_encoder"),
                        });
                    egui_renderer.update_buffers(
                        device,
                        queue,
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
                        egui_renderer.render(&mut pass, &paint_jobs, &screen_descriptor);
                    }
                    queue.submit(std::iter::once(encoder.finish()));
                    for id in &full_output.textures_delta.free {
                        egui_renderer.free_texture(id);
                    }
                }

                output.present();

                // The low-end fallback is a static surface; one frame is enough.
                if self.state.mount.state() != MountState::Disabled {
                    if let Some(window) = &self.window {
                        window.request_redraw();
                    }
                }
            }
            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: winit::event::DeviceEvent,
    ) {
        if let winit::event::DeviceEvent::MouseMotion { delta } = event {
            if self.state.mouse_down {
                self.state.camera.rotate(delta.0 as f32, delta.1 as f32);
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if !self.visible || self.state.mount.state() == MountState::Disabled {
            return;
        }
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("synapse-desktop starting");

    let config = load_config(&cli)?;
    let state = AppState::new(config)?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GpuApp::new(state);
    event_loop.run_app(&mut app)?;

    Ok(())
}
