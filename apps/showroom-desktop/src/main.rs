use anyhow::Result;
use clap::Parser;
use egui::Context as EguiContext;
use showroom_assets::{GltfLoader, HdrLoader};
use showroom_camera::PointerInput;
use showroom_common::Viewport;
use showroom_lifecycle::{
    FrameOutcome, Host, LoadOutcome, Loaders, SceneConfig, Stage, WallClock, dispatch_load,
};
use showroom_render_wgpu::WgpuRenderer;
use showroom_tools::SceneInspector;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop, EventLoopProxy};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

mod pointer;

use pointer::{PointerEvent, PointerTracker};

#[derive(Parser)]
#[command(name = "showroom-desktop", about = "Warehouse showroom viewer")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Scene configuration (YAML); defaults reproduce the warehouse showroom
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory model and environment paths are resolved against
    #[arg(long, default_value = "./assets")]
    assets_dir: PathBuf,

    /// Override the model path from the config
    #[arg(long)]
    model: Option<PathBuf>,

    /// Override the environment panorama path from the config
    #[arg(long)]
    environment: Option<PathBuf>,
}

/// Events injected into the winit loop from worker threads.
#[derive(Debug)]
enum UserEvent {
    Loaded(LoadOutcome),
}

/// [`Host`] over a winit window.
struct DesktopHost {
    window: Arc<Window>,
    resize_subscribed: bool,
}

impl DesktopHost {
    fn new(window: Arc<Window>) -> Self {
        Self {
            window,
            resize_subscribed: false,
        }
    }

    fn window(&self) -> &Arc<Window> {
        &self.window
    }
}

impl Host for DesktopHost {
    fn viewport(&self) -> Viewport {
        let size = self.window.inner_size();
        Viewport::from_physical(size.width, size.height, self.window.scale_factor())
    }

    fn attach_surface(&mut self) {
        self.window.set_visible(true);
    }

    fn detach_surface(&mut self) {
        self.window.set_visible(false);
    }

    fn subscribe_resize(&mut self) {
        self.resize_subscribed = true;
    }

    fn unsubscribe_resize(&mut self) {
        self.resize_subscribed = false;
    }

    fn request_frame(&mut self) {
        self.window.request_redraw();
    }
}

/// egui state tied to one renderer's device.
struct Overlay {
    ctx: EguiContext,
    state: egui_winit::State,
    renderer: egui_wgpu::Renderer,
}

impl Overlay {
    fn new(window: &Window, device: &wgpu::Device, format: wgpu::TextureFormat) -> Self {
        let ctx = EguiContext::default();
        let state = egui_winit::State::new(
            ctx.clone(),
            egui::ViewportId::ROOT,
            window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let renderer = egui_wgpu::Renderer::new(device, format, None, 1, false);
        Self {
            ctx,
            state,
            renderer,
        }
    }

    fn on_window_event(&mut self, window: &Window, event: &WindowEvent) -> bool {
        self.state.on_window_event(window, event).consumed
    }

    /// Run `ui` and paint the result over `view`, which already holds the scene.
    fn draw(
        &mut self,
        window: &Window,
        renderer: &WgpuRenderer,
        view: &wgpu::TextureView,
        ui: impl FnMut(&EguiContext),
    ) {
        let (Some(device), Some(queue)) = (renderer.device(), renderer.queue()) else {
            return;
        };
        let (width, height) = renderer.surface_size();

        let raw_input = self.state.take_egui_input(window);
        let full_output = self.ctx.run(raw_input, ui);
        self.state
            .handle_platform_output(window, full_output.platform_output);

        let paint_jobs = self
            .ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [width, height],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            self.renderer
                .update_texture(device, queue, *id, image_delta);
        }
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("egui_encoder"),
        });
        self.renderer.update_buffers(
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
                        view,
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
            self.renderer
                .render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            self.renderer.free_texture(id);
        }
    }
}

fn draw_inspector(ctx: &EguiContext, stage: &Stage<DesktopHost, WgpuRenderer>) {
    let summary = SceneInspector::stage(stage);

    egui::Window::new("Showroom")
        .default_pos([12.0, 12.0])
        .resizable(false)
        .show(ctx, |ui| {
            ui.label(format!(
                "t = {:.2}s  frames = {}  generation = {}",
                summary.elapsed, summary.frames, summary.generation
            ));
            if let Some(time) = summary.sphere_time {
                ui.label(format!("Sphere time: {time:.2}"));
            }
            ui.separator();

            ui.heading("Camera");
            ui.label(format!(
                "Polar {:.1}°  Azimuth {:.1}°  Distance {:.1}",
                summary.polar_degrees, summary.azimuth_degrees, summary.distance
            ));
            ui.separator();

            ui.heading("Assets");
            ui.label(format!("Model: {}", summary.model));
            ui.label(format!("Environment: {}", summary.environment));
            if let Some(scene) = &summary.scene {
                ui.label(format!(
                    "Nodes: {} ({} attached)  Meshes: {}  Triangles: {}",
                    scene.nodes, scene.attached, scene.meshes, scene.triangles
                ));
                ui.label(format!("Environment source: {}", scene.environment));
            }
            if let Some(renderer) = stage.renderer() {
                ui.label(format!(
                    "Backend: {}  MSAA: {}x",
                    renderer.backend(),
                    renderer.sample_count()
                ));
            }

            ui.separator();
            ui.small("F1: Toggle overlay | R: Remount | LMB: Orbit | RMB: Pan | Wheel: Zoom");
        });
}

struct App {
    config: SceneConfig,
    loaders: Loaders,
    proxy: EventLoopProxy<UserEvent>,
    stage: Option<Stage<DesktopHost, WgpuRenderer>>,
    overlay: Option<Overlay>,
    show_overlay: bool,
    pointer: PointerTracker,
}

impl App {
    fn new(config: SceneConfig, loaders: Loaders, proxy: EventLoopProxy<UserEvent>) -> Self {
        Self {
            config,
            loaders,
            proxy,
            stage: None,
            overlay: None,
            show_overlay: true,
            pointer: PointerTracker::default(),
        }
    }

    /// Mount the stage, build the overlay for the new device and start the loads.
    fn mount(&mut self) -> Result<()> {
        let Some(stage) = self.stage.as_mut() else {
            return Ok(());
        };
        let window = stage.host().window().clone();
        let surface_window = window.clone();
        let settings = stage.config().renderer;
        let requests = stage.mount(
            move |viewport| WgpuRenderer::new(surface_window, *viewport, settings),
            Box::new(WallClock::start()),
        )?;

        self.overlay = stage.renderer().and_then(|renderer| {
            let device = renderer.device()?;
            let format = renderer.surface_format()?;
            Some(Overlay::new(&window, device, format))
        });
        if let Some(renderer) = stage.renderer() {
            tracing::info!(
                backend = renderer.backend(),
                samples = renderer.sample_count(),
                "renderer ready"
            );
        }

        for request in requests {
            let proxy = self.proxy.clone();
            dispatch_load(request, self.loaders.clone(), move |outcome| {
                if proxy.send_event(UserEvent::Loaded(outcome)).is_err() {
                    tracing::debug!("event loop closed, load outcome dropped");
                }
            })?;
        }
        Ok(())
    }

    fn unmount(&mut self) {
        self.overlay = None;
        if let Some(stage) = self.stage.as_mut() {
            if stage.unmount().is_some() {
                tracing::info!(generation = stage.generation(), "stage unmounted");
            }
        }
    }

    fn remount(&mut self, event_loop: &ActiveEventLoop) {
        self.unmount();
        if let Err(e) = self.mount() {
            tracing::error!("failed to remount: {e:#}");
            event_loop.exit();
        }
    }

    fn redraw(&mut self) {
        let Some(stage) = self.stage.as_mut() else {
            return;
        };
        let FrameOutcome::Rendered {
            output: Some(frame),
            ..
        } = stage.frame()
        else {
            return;
        };

        let stage: &Stage<DesktopHost, WgpuRenderer> = stage;
        if self.show_overlay {
            if let (Some(overlay), Some(renderer)) = (self.overlay.as_mut(), stage.renderer()) {
                overlay.draw(stage.host().window(), renderer, frame.view(), |ctx| {
                    draw_inspector(ctx, stage)
                });
            }
        }
        frame.present();
    }

    fn handle_key(&mut self, event_loop: &ActiveEventLoop, key: KeyCode) {
        match key {
            KeyCode::F1 => {
                self.show_overlay = !self.show_overlay;
            }
            KeyCode::KeyR => {
                self.remount(event_loop);
            }
            KeyCode::Escape => {
                self.unmount();
                event_loop.exit();
            }
            _ => {}
        }
    }

    fn forward_pointer(&mut self, input: PointerInput) {
        if let Some(stage) = self.stage.as_mut() {
            stage.on_pointer(input);
        }
    }
}

impl ApplicationHandler<UserEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.stage.is_some() {
            return;
        }

        let attrs = Window::default_attributes()
            .with_title("Warehouse Showroom")
            .with_inner_size(PhysicalSize::new(1280u32, 720))
            .with_visible(false);
        let window = match event_loop.create_window(attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                tracing::error!("failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        self.stage = Some(Stage::new(DesktopHost::new(window), self.config.clone()));
        if let Err(e) = self.mount() {
            tracing::error!("failed to mount stage: {e:#}");
            event_loop.exit();
        }
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, event: UserEvent) {
        match event {
            UserEvent::Loaded(outcome) => {
                if let Some(stage) = self.stage.as_mut() {
                    stage.apply_load(outcome);
                }
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let claimed = match (self.overlay.as_mut(), self.stage.as_ref()) {
            (Some(overlay), Some(stage)) if self.show_overlay => {
                overlay.on_window_event(stage.host().window(), &event)
            }
            _ => false,
        };

        if let Some(event) = PointerEvent::from_window_event(&event) {
            let scale = self
                .stage
                .as_ref()
                .map_or(1.0, |s| s.host().window().scale_factor());
            if let Some(input) = self.pointer.translate(event, scale, claimed) {
                self.forward_pointer(input);
            }
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                self.unmount();
                event_loop.exit();
            }
            WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(stage) = self.stage.as_mut() {
                    if stage.host().resize_subscribed {
                        stage.on_resize();
                    }
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
            } if !claimed => {
                self.handle_key(event_loop, key);
            }
            WindowEvent::RedrawRequested => {
                self.redraw();
            }
            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.unmount();
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let mut config = match &cli.config {
        Some(path) => SceneConfig::load(path)?,
        None => SceneConfig::default(),
    };
    if let Some(model) = cli.model {
        config.model.path = model;
    }
    if let Some(environment) = cli.environment {
        config.environment.path = environment;
    }
    config.validate()?;

    tracing::info!(assets = %cli.assets_dir.display(), "showroom-desktop starting");

    let loaders = Loaders::new(
        GltfLoader::new(cli.assets_dir.clone()),
        HdrLoader::new(cli.assets_dir),
    );

    let event_loop = EventLoop::<UserEvent>::with_user_event().build()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = App::new(config, loaders, event_loop.create_proxy());
    event_loop.run_app(&mut app)?;

    Ok(())
}
