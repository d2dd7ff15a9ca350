use showroom_assets::AssetError;
use showroom_camera::PointerInput;
use showroom_common::Viewport;
use showroom_render::{RenderError, Renderer};
use showroom_scene::{EnvironmentSource, TextureMapping};
use std::fmt;
use std::sync::Arc;

use crate::clock::Clock;
use crate::config::SceneConfig;
use crate::context::SceneContext;
use crate::driver::FrameDriver;
use crate::host::Host;
use crate::loads::{AssetKind, LoadOutcome, LoadRequest, LoadResult, LoadTicket};

#[derive(Debug, thiserror::Error)]
pub enum StageError {
    #[error("stage is already mounted")]
    AlreadyMounted,
    #[error("renderer creation failed: {0}")]
    Renderer(#[from] RenderError),
}

/// Progress of one asset within the current mount.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AssetStatus {
    #[default]
    Idle,
    Pending,
    Loaded,
    /// Nothing configured for this asset.
    Absent,
    Failed(String),
}

impl fmt::Display for AssetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetStatus::Idle => f.write_str("idle"),
            AssetStatus::Pending => f.write_str("loading"),
            AssetStatus::Loaded => f.write_str("loaded"),
            AssetStatus::Absent => f.write_str("none"),
            AssetStatus::Failed(e) => write!(f, "failed: {e}"),
        }
    }
}

/// Result of one frame callback.
#[derive(Debug)]
pub enum FrameOutcome<O> {
    /// Not mounted or stopped; nothing drawn and no frame rescheduled.
    Skipped,
    Rendered { time: f64, frame: u64, output: O },
}

impl<O> FrameOutcome<O> {
    pub fn is_rendered(&self) -> bool {
        matches!(self, FrameOutcome::Rendered { .. })
    }
}

struct Mounted<R> {
    context: SceneContext,
    renderer: R,
    driver: FrameDriver,
}

/// Lifecycle manager for one host.
///
/// `mount` builds the scene context, renderer and frame driver; `unmount`
/// tears them down in reverse. Load outcomes are matched against the mount
/// generation so results that arrive after an unmount are dropped.
pub struct Stage<H: Host, R: Renderer> {
    host: H,
    config: SceneConfig,
    generation: u64,
    mounted: Option<Mounted<R>>,
    model_status: AssetStatus,
    environment_status: AssetStatus,
}

impl<H: Host, R: Renderer> Stage<H, R> {
    /// Builds nothing; call [`mount`](Self::mount) to start.
    pub fn new(host: H, config: SceneConfig) -> Self {
        Self {
            host,
            config,
            generation: 0,
            mounted: None,
            model_status: AssetStatus::Idle,
            environment_status: AssetStatus::Idle,
        }
    }

    /// Build the scene and renderer, attach the surface, subscribe to
    /// resizes and request the first frame. Returns the loads the host must
    /// run and feed back through [`apply_load`](Self::apply_load).
    pub fn mount(
        &mut self,
        make_renderer: impl FnOnce(&Viewport) -> Result<R, RenderError>,
        clock: Box<dyn Clock>,
    ) -> Result<Vec<LoadRequest>, StageError> {
        if self.mounted.is_some() {
            return Err(StageError::AlreadyMounted);
        }
        let generation = self.generation + 1;
        let _span = tracing::info_span!("mount", generation).entered();

        let viewport = self.host.viewport();
        let context = SceneContext::build(&self.config, &viewport);
        let mut renderer = make_renderer(&viewport)?;
        renderer.set_size(viewport);
        self.host.attach_surface();

        self.generation = generation;
        let requests = vec![
            LoadRequest {
                ticket: LoadTicket {
                    generation,
                    kind: AssetKind::Model,
                },
                path: self.config.model.path.clone(),
            },
            LoadRequest {
                ticket: LoadTicket {
                    generation,
                    kind: AssetKind::Environment,
                },
                path: self.config.environment.path.clone(),
            },
        ];
        self.model_status = AssetStatus::Pending;
        self.environment_status = AssetStatus::Pending;

        self.host.subscribe_resize();
        let mut driver = FrameDriver::new(clock);
        driver.start();
        self.mounted = Some(Mounted {
            context,
            renderer,
            driver,
        });
        self.host.request_frame();

        tracing::info!(
            width = viewport.width,
            height = viewport.height,
            pixel_ratio = viewport.pixel_ratio,
            "stage mounted"
        );
        Ok(requests)
    }

    /// Stop the driver, cancel in-flight loads, unsubscribe resizes, detach
    /// the surface and dispose the renderer, in that order.
    ///
    /// Returns the disposed renderer. A no-op returning `None` when not
    /// mounted.
    pub fn unmount(&mut self) -> Option<R> {
        let Some(mut mounted) = self.mounted.take() else {
            tracing::debug!("unmount while not mounted ignored");
            return None;
        };
        mounted.driver.stop();
        self.generation += 1;
        self.host.unsubscribe_resize();
        self.host.detach_surface();
        mounted.renderer.dispose();
        tracing::info!(
            frames = mounted.driver.frame_count(),
            elapsed = mounted.driver.time(),
            "stage unmounted"
        );
        Some(mounted.renderer)
    }

    /// One display-refresh callback: advance time and controls, write the
    /// sphere's `time` uniform, render once, and reschedule while running.
    pub fn frame(&mut self) -> FrameOutcome<R::Output> {
        let Some(mounted) = self.mounted.as_mut() else {
            return FrameOutcome::Skipped;
        };
        let Some(time) = mounted.driver.tick() else {
            return FrameOutcome::Skipped;
        };
        let frame = mounted.driver.frame_count();
        let _span = tracing::info_span!("frame", frame).entered();

        let ctx = &mut mounted.context;
        ctx.controls.update();
        if let Some(program) = ctx.scene.shader_program_mut(ctx.sphere) {
            program.set_time(time as f32);
        }
        let output = mounted.renderer.render(&ctx.scene, ctx.controls.camera());

        if mounted.driver.is_running() {
            self.host.request_frame();
        }
        tracing::trace!(time, "frame rendered");
        FrameOutcome::Rendered {
            time,
            frame,
            output,
        }
    }

    /// Re-read the host viewport and propagate it to camera and renderer.
    pub fn on_resize(&mut self) {
        let Some(mounted) = self.mounted.as_mut() else {
            return;
        };
        let viewport = self.host.viewport();
        mounted.context.controls.set_viewport(&viewport);
        mounted.renderer.set_size(viewport);
        tracing::debug!(
            width = viewport.width,
            height = viewport.height,
            pixel_ratio = viewport.pixel_ratio,
            "viewport resized"
        );
    }

    /// Forward pointer input to the orbit controls. Returns whether it was consumed.
    pub fn on_pointer(&mut self, input: PointerInput) -> bool {
        match self.mounted.as_mut() {
            Some(mounted) => mounted.context.controls.handle(input),
            None => false,
        }
    }

    /// Apply a finished load. Stale or failed outcomes change nothing in the
    /// scene. Returns whether the scene was updated.
    pub fn apply_load(&mut self, outcome: LoadOutcome) -> bool {
        let ticket = outcome.ticket;
        let mounted = match self.mounted.as_mut() {
            Some(m) if ticket.generation == self.generation => m,
            _ => {
                tracing::debug!(
                    kind = %ticket.kind,
                    ticket = ticket.generation,
                    current = self.generation,
                    "stale load outcome dropped"
                );
                return false;
            }
        };
        let ctx = &mut mounted.context;

        match outcome.result {
            LoadResult::Model(Ok(mut fragment)) => {
                let model = &self.config.model;
                fragment.transform.scale = glam::Vec3::splat(model.scale);
                fragment.transform.position = model.position;
                let (nodes, meshes) = (fragment.node_count(), fragment.mesh_count());
                let root = ctx.scene.insert_fragment(fragment);
                if let Err(e) = ctx.scene.attach(ctx.sphere, root) {
                    tracing::warn!("could not parent sphere to model: {e}");
                }
                ctx.model_root = Some(root);
                ctx.scene.offer_environment(EnvironmentSource::Node(root));
                self.model_status = AssetStatus::Loaded;
                tracing::info!(nodes, meshes, root = %root, "model inserted");
                true
            }
            LoadResult::Model(Err(e)) => {
                tracing::warn!("model load failed: {e}");
                self.model_status = AssetStatus::Failed(e.to_string());
                false
            }
            LoadResult::Environment(Ok(mut texture)) => {
                texture.mapping = TextureMapping::EquirectangularReflection;
                let (width, height) = (texture.width, texture.height);
                ctx.scene
                    .offer_environment(EnvironmentSource::Texture(Arc::new(texture)));
                self.environment_status = AssetStatus::Loaded;
                tracing::info!(width, height, "environment applied");
                true
            }
            LoadResult::Environment(Err(AssetError::EmptyPath)) => {
                tracing::info!("no environment configured");
                self.environment_status = AssetStatus::Absent;
                false
            }
            LoadResult::Environment(Err(e)) => {
                tracing::warn!("environment load failed: {e}");
                self.environment_status = AssetStatus::Failed(e.to_string());
                false
            }
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.is_some()
    }

    pub fn is_running(&self) -> bool {
        self.mounted.as_ref().is_some_and(|m| m.driver.is_running())
    }

    /// Current mount generation; bumped on every mount and unmount.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn context(&self) -> Option<&SceneContext> {
        self.mounted.as_ref().map(|m| &m.context)
    }

    pub fn renderer(&self) -> Option<&R> {
        self.mounted.as_ref().map(|m| &m.renderer)
    }

    pub fn renderer_mut(&mut self) -> Option<&mut R> {
        self.mounted.as_mut().map(|m| &mut m.renderer)
    }

    /// Seconds since mount as of the last frame.
    pub fn elapsed(&self) -> Option<f64> {
        self.mounted.as_ref().map(|m| m.driver.time())
    }

    pub fn frame_count(&self) -> u64 {
        self.mounted.as_ref().map_or(0, |m| m.driver.frame_count())
    }

    pub fn model_status(&self) -> &AssetStatus {
        &self.model_status
    }

    pub fn environment_status(&self) -> &AssetStatus {
        &self.environment_status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::host::{HostCall, RecordingHost};
    use glam::{Vec2, Vec3};
    use showroom_camera::PointerButton;
    use showroom_render::{RecordingRenderer, RenderSettings};
    use showroom_scene::{EnvironmentTexture, Fragment};

    type TestStage = Stage<RecordingHost, RecordingRenderer>;

    fn stage() -> TestStage {
        Stage::new(
            RecordingHost::new(Viewport::new(1000, 500, 2.0)),
            SceneConfig::default(),
        )
    }

    fn mount(stage: &mut TestStage, clock: &ManualClock) -> Vec<LoadRequest> {
        stage
            .mount(
                |_| Ok(RecordingRenderer::new(RenderSettings::default())),
                Box::new(clock.clone()),
            )
            .unwrap()
    }

    fn outcome(request: &LoadRequest, result: LoadResult) -> LoadOutcome {
        LoadOutcome {
            ticket: request.ticket,
            result,
        }
    }

    fn model_outcome(request: &LoadRequest) -> LoadOutcome {
        outcome(request, LoadResult::Model(Ok(Fragment::group("warehouse"))))
    }

    fn env_outcome(request: &LoadRequest) -> LoadOutcome {
        let tex = EnvironmentTexture::new(2, 1, vec![[1.0; 4]; 2]);
        outcome(request, LoadResult::Environment(Ok(tex)))
    }

    /// Consume the pending frame request and run it, as a display refresh would.
    fn refresh(stage: &mut TestStage) -> Option<FrameOutcome<Option<showroom_render::FrameRecord>>> {
        stage.host_mut().take_frame_request().then(|| stage.frame())
    }

    #[test]
    fn mount_then_one_tick_renders_once() {
        let clock = ManualClock::new();
        let mut s = stage();
        mount(&mut s, &clock);
        clock.advance(0.016);
        let out = refresh(&mut s).unwrap();
        let FrameOutcome::Rendered { time, frame, output } = out else {
            panic!("expected a rendered frame");
        };
        assert!(time > 0.0);
        assert_eq!(frame, 1);
        assert!(output.is_some());
        assert_eq!(s.renderer().unwrap().render_count(), 1);
        assert_eq!(s.host().pending_frames(), 1);
    }

    #[test]
    fn mount_wires_host_in_order() {
        let clock = ManualClock::new();
        let mut s = stage();
        let requests = mount(&mut s, &clock);
        assert_eq!(
            s.host().calls(),
            &[
                HostCall::AttachSurface,
                HostCall::SubscribeResize,
                HostCall::RequestFrame
            ]
        );
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].ticket.kind, AssetKind::Model);
        assert_eq!(
            requests[0].path,
            std::path::PathBuf::from("warehouse_fbx_model_free/scene.gltf")
        );
        assert_eq!(requests[1].ticket.kind, AssetKind::Environment);
        assert!(requests.iter().all(|r| r.ticket.generation == s.generation()));
        assert_eq!(s.model_status(), &AssetStatus::Pending);
    }

    #[test]
    fn renderer_gets_initial_size() {
        let clock = ManualClock::new();
        let mut s = stage();
        mount(&mut s, &clock);
        let r = s.renderer().unwrap();
        assert_eq!(r.viewport(), Viewport::new(1000, 500, 2.0));
        assert_eq!(r.buffer_size(), (2000, 1000));
    }

    #[test]
    fn time_uniform_tracks_clock() {
        let clock = ManualClock::new();
        clock.set(100.0);
        let mut s = stage();
        mount(&mut s, &clock);
        let mut last = 0.0f32;
        for step in [0.5, 0.25, 0.0, 1.0] {
            clock.advance(step);
            refresh(&mut s).unwrap();
            let t = s.context().unwrap().sphere_time().unwrap();
            assert!((t as f64 - (clock.elapsed() - 100.0)).abs() < 1e-4);
            assert!(t >= last);
            last = t;
        }
        let times: Vec<f32> = s
            .renderer()
            .unwrap()
            .frames()
            .iter()
            .flat_map(|f| f.shader_times.clone())
            .collect();
        // The sphere is detached until the model loads, so it is never drawn here.
        assert!(times.is_empty());
    }

    #[test]
    fn resize_updates_camera_and_renderer() {
        let clock = ManualClock::new();
        let mut s = stage();
        mount(&mut s, &clock);
        s.host_mut().set_viewport(Viewport::new(300, 600, 1.5));
        s.on_resize();
        let ctx = s.context().unwrap();
        assert_eq!(ctx.controls.camera().aspect, 0.5);
        let r = s.renderer().unwrap();
        assert_eq!(r.viewport(), Viewport::new(300, 600, 1.5));
        assert_eq!(r.buffer_size(), (450, 900));
        refresh(&mut s).unwrap();
        assert_eq!(s.renderer().unwrap().last_frame().unwrap().camera_aspect, 0.5);
    }

    #[test]
    fn immediate_unmount_renders_nothing() {
        let clock = ManualClock::new();
        let mut s = stage();
        mount(&mut s, &clock);
        let renderer = s.unmount().unwrap();
        assert!(renderer.is_disposed());
        assert_eq!(renderer.render_count(), 0);
        assert!(!s.host().surface_attached());
        assert!(!s.host().resize_subscribed());
        assert!(matches!(s.frame(), FrameOutcome::Skipped));
        let calls = s.host().calls();
        assert_eq!(
            &calls[calls.len() - 2..],
            &[HostCall::UnsubscribeResize, HostCall::DetachSurface]
        );
    }

    #[test]
    fn unmount_before_loads_ignores_late_outcomes() {
        let clock = ManualClock::new();
        let mut s = stage();
        let requests = mount(&mut s, &clock);
        s.unmount();
        let frames_requested = s.host().count(HostCall::RequestFrame);

        assert!(!s.apply_load(model_outcome(&requests[0])));
        assert!(!s.apply_load(env_outcome(&requests[1])));
        // The stale first request is a no-op when delivered.
        while s.host_mut().take_frame_request() {
            assert!(matches!(s.frame(), FrameOutcome::Skipped));
        }
        assert_eq!(s.host().count(HostCall::RequestFrame), frames_requested);
    }

    #[test]
    fn outcomes_from_previous_mount_are_stale() {
        let clock = ManualClock::new();
        let mut s = stage();
        let old = mount(&mut s, &clock);
        s.unmount();
        let new = mount(&mut s, &clock);
        assert_ne!(old[0].ticket, new[0].ticket);
        assert!(!s.apply_load(model_outcome(&old[0])));
        assert!(s.context().unwrap().model_root.is_none());
        assert!(s.apply_load(model_outcome(&new[0])));
    }

    #[test]
    fn unmount_is_idempotent() {
        let mut s = stage();
        assert!(s.unmount().is_none());
        let clock = ManualClock::new();
        mount(&mut s, &clock);
        assert!(s.unmount().is_some());
        assert!(s.unmount().is_none());
        assert_eq!(s.host().count(HostCall::DetachSurface), 1);
    }

    #[test]
    fn double_mount_is_rejected() {
        let clock = ManualClock::new();
        let mut s = stage();
        mount(&mut s, &clock);
        let err = s
            .mount(|_| Ok(RecordingRenderer::default()), Box::new(clock.clone()))
            .unwrap_err();
        assert!(matches!(err, StageError::AlreadyMounted));
    }

    #[test]
    fn failed_renderer_leaves_stage_unmounted() {
        let mut s = stage();
        let err = s
            .mount(|_| Err(RenderError::NoAdapter), Box::new(ManualClock::new()))
            .unwrap_err();
        assert!(matches!(err, StageError::Renderer(RenderError::NoAdapter)));
        assert!(!s.is_mounted());
        assert!(s.host().calls().is_empty());
        assert!(s.unmount().is_none());
    }

    #[test]
    fn model_load_parents_sphere() {
        let clock = ManualClock::new();
        let mut s = stage();
        let requests = mount(&mut s, &clock);
        assert!(s.apply_load(model_outcome(&requests[0])));

        let ctx = s.context().unwrap();
        let root = ctx.model_root.unwrap();
        assert_eq!(ctx.scene.get(ctx.sphere).unwrap().parent(), Some(root));
        assert!(ctx.scene.is_attached(ctx.sphere));
        let world = ctx.scene.world_matrix(ctx.sphere).unwrap();
        let p = world.transform_point3(Vec3::ZERO);
        // (-120, -25, 130) + 15 * (8, 1.5, -17)
        assert!((p - Vec3::new(0.0, -2.5, -125.0)).length() < 1e-3);
        assert_eq!(s.model_status(), &AssetStatus::Loaded);
        assert_eq!(ctx.scene.environment().unwrap().kind(), "node");

        clock.advance(0.5);
        refresh(&mut s).unwrap();
        let record = s.renderer().unwrap().last_frame().unwrap().clone();
        assert_eq!(record.shader_times, vec![0.5]);
    }

    #[test]
    fn environment_texture_wins_in_either_order() {
        let clock = ManualClock::new();
        let mut s = stage();
        let r = mount(&mut s, &clock);
        s.apply_load(env_outcome(&r[1]));
        s.apply_load(model_outcome(&r[0]));
        let env = s.context().unwrap().scene.environment().unwrap();
        assert_eq!(env.kind(), "texture");
        assert_eq!(
            env.texture().unwrap().mapping,
            TextureMapping::EquirectangularReflection
        );
        s.unmount();

        let r = mount(&mut s, &clock);
        s.apply_load(model_outcome(&r[0]));
        s.apply_load(env_outcome(&r[1]));
        let env = s.context().unwrap().scene.environment().unwrap();
        assert_eq!(env.kind(), "texture");
    }

    #[test]
    fn load_failures_are_absorbed() {
        let clock = ManualClock::new();
        let mut s = stage();
        let r = mount(&mut s, &clock);
        let failed = outcome(
            &r[0],
            LoadResult::Model(Err(AssetError::Unsupported("fbx".into()))),
        );
        assert!(!s.apply_load(failed));
        assert!(!s.apply_load(outcome(
            &r[1],
            LoadResult::Environment(Err(AssetError::EmptyPath))
        )));
        assert!(matches!(s.model_status(), AssetStatus::Failed(_)));
        assert_eq!(s.environment_status(), &AssetStatus::Absent);
        assert!(s.context().unwrap().scene.environment().is_none());

        clock.advance(0.1);
        assert!(refresh(&mut s).unwrap().is_rendered());
    }

    #[test]
    fn pointer_drag_rotates_within_limits() {
        let clock = ManualClock::new();
        let mut s = stage();
        mount(&mut s, &clock);
        assert!(s.on_pointer(PointerInput::Down(PointerButton::Primary)));
        for _ in 0..50 {
            s.on_pointer(PointerInput::Moved(Vec2::new(400.0, -300.0)));
            clock.advance(0.016);
            refresh(&mut s).unwrap();
        }
        s.on_pointer(PointerInput::Up(PointerButton::Primary));
        let controls = &s.context().unwrap().controls;
        let limits = controls.settings();
        assert!(controls.azimuthal_angle() >= limits.min_azimuth_angle - 1e-5);
        assert!(controls.polar_angle() <= limits.max_polar_angle + 1e-5);
        // Zoom is disabled.
        assert!(!s.on_pointer(PointerInput::Wheel(1.0)));
    }

    #[test]
    fn pointer_before_mount_is_ignored() {
        let mut s = stage();
        assert!(!s.on_pointer(PointerInput::Down(PointerButton::Primary)));
        s.on_resize();
        assert!(matches!(s.frame(), FrameOutcome::Skipped));
    }
}
