use showroom_camera::PerspectiveCamera;
use showroom_common::Viewport;
use showroom_scene::{Material, Scene};
use std::fmt::Write;

use crate::frame::FramePacket;
use crate::settings::RenderSettings;

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// The renderer reads the scene and camera and produces output. It never
/// mutates either; the scene is owned by the stage.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Resize the drawing buffer to the viewport's logical size times its
    /// pixel ratio.
    fn set_size(&mut self, viewport: Viewport);

    /// Render one frame of the scene as seen by the camera.
    fn render(&mut self, scene: &Scene, camera: &PerspectiveCamera) -> Self::Output;

    /// Release GPU resources. Idempotent.
    fn dispose(&mut self);
}

/// What a [`RecordingRenderer`] saw in one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameRecord {
    pub index: u64,
    pub viewport: Viewport,
    pub camera_aspect: f32,
    pub draws: usize,
    pub triangles: usize,
    /// `time` of every shader-material draw, in draw order.
    pub shader_times: Vec<f32>,
    pub has_environment_texture: bool,
}

/// Headless renderer that records every call instead of drawing.
///
/// Used by the lifecycle tests and the CLI simulation.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    settings: RenderSettings,
    viewport: Viewport,
    frames: Vec<FrameRecord>,
    resize_count: usize,
    disposed: bool,
}

impl RecordingRenderer {
    pub fn new(settings: RenderSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Size of the drawing buffer in physical pixels.
    pub fn buffer_size(&self) -> (u32, u32) {
        self.viewport.physical_size()
    }

    pub fn render_count(&self) -> usize {
        self.frames.len()
    }

    pub fn frames(&self) -> &[FrameRecord] {
        &self.frames
    }

    pub fn last_frame(&self) -> Option<&FrameRecord> {
        self.frames.last()
    }

    pub fn resize_count(&self) -> usize {
        self.resize_count
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}

impl Renderer for RecordingRenderer {
    type Output = Option<FrameRecord>;

    fn set_size(&mut self, viewport: Viewport) {
        if self.disposed {
            return;
        }
        self.viewport = viewport;
        self.resize_count += 1;
    }

    fn render(&mut self, scene: &Scene, camera: &PerspectiveCamera) -> Option<FrameRecord> {
        if self.disposed {
            tracing::debug!("render after dispose ignored");
            return None;
        }
        let packet = FramePacket::extract(scene, camera);
        let shader_times = packet
            .draws
            .iter()
            .filter_map(|d| match &d.mesh.material {
                Material::Shader(m) => Some(m.program.time()),
                Material::Standard(_) => None,
            })
            .collect();
        let record = FrameRecord {
            index: self.frames.len() as u64,
            viewport: self.viewport,
            camera_aspect: camera.aspect,
            draws: packet.draws.len(),
            triangles: packet.triangle_count(),
            shader_times,
            has_environment_texture: packet.environment.is_some(),
        };
        tracing::trace!(index = record.index, draws = record.draws, "recorded frame");
        self.frames.push(record.clone());
        Some(record)
    }

    fn dispose(&mut self) {
        self.disposed = true;
    }
}

/// Debug text renderer.
///
/// Produces a human-readable description of each frame. Useful for CLI
/// output, logging, and testing the render interface.
#[derive(Debug, Default)]
pub struct DebugTextRenderer {
    viewport: Viewport,
    frame: u64,
}

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn set_size(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    fn render(&mut self, scene: &Scene, camera: &PerspectiveCamera) -> String {
        let packet = FramePacket::extract(scene, camera);
        let (bw, bh) = self.viewport.physical_size();
        let mut out = String::new();
        let _ = writeln!(
            out,
            "=== Frame {} ({}x{} @{:.2}x, buffer {}x{}) ===",
            self.frame, self.viewport.width, self.viewport.height, self.viewport.pixel_ratio, bw, bh
        );
        let p = camera.position;
        let _ = writeln!(
            out,
            "Camera: eye=({:.1}, {:.1}, {:.1}) fov={:.0} aspect={:.3}",
            p.x,
            p.y,
            p.z,
            camera.fov.to_degrees(),
            camera.aspect
        );
        let _ = writeln!(
            out,
            "Ambient: ({:.3}, {:.3}, {:.3})",
            packet.ambient[0], packet.ambient[1], packet.ambient[2]
        );
        if let Some(light) = packet.light {
            let d = light.direction;
            let _ = writeln!(out, "Sun: dir=({:.2}, {:.2}, {:.2})", d.x, d.y, d.z);
        }
        let env = match scene.environment() {
            Some(source) => source.kind(),
            None => "none",
        };
        let _ = writeln!(out, "Environment: {env}");
        let _ = writeln!(
            out,
            "Draws: {} ({} triangles)",
            packet.draws.len(),
            packet.triangle_count()
        );
        for draw in &packet.draws {
            let t = draw.model.w_axis;
            let name = scene.get(draw.node).map(|n| n.name.as_str()).unwrap_or("?");
            let kind = match &draw.mesh.material {
                Material::Standard(_) => "standard",
                Material::Shader(_) => "shader",
            };
            let _ = writeln!(
                out,
                "  [{}] {name} {kind} pos=({:.2}, {:.2}, {:.2})",
                draw.node.short(),
                t.x,
                t.y,
                t.z
            );
        }
        self.frame += 1;
        out
    }

    fn dispose(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use showroom_common::Transform;
    use showroom_scene::{Mesh, MeshData, Node, NodeKind, ShaderMaterial};

    fn scene_with_sphere(time: f32) -> Scene {
        let mut scene = Scene::new();
        let mut material = ShaderMaterial::default();
        material.program.set_time(time);
        scene.add(
            Node::new(
                "sphere",
                NodeKind::Mesh(Mesh::new(
                    MeshData::sphere(1.3, 8, 8),
                    Material::Shader(material),
                )),
            )
            .with_transform(Transform::from_position(Vec3::new(1.0, 2.0, 3.0))),
        );
        scene
    }

    #[test]
    fn recording_renderer_counts_frames() {
        let scene = scene_with_sphere(0.25);
        let camera = PerspectiveCamera::default();
        let mut r = RecordingRenderer::default();
        r.set_size(Viewport::new(800, 600, 2.0));
        let record = r.render(&scene, &camera).unwrap();
        assert_eq!(record.index, 0);
        assert_eq!(record.draws, 1);
        assert_eq!(record.shader_times, vec![0.25]);
        assert_eq!(r.render_count(), 1);
        assert_eq!(r.buffer_size(), (1600, 1200));
        assert_eq!(r.resize_count(), 1);
    }

    #[test]
    fn disposed_renderer_ignores_calls() {
        let scene = scene_with_sphere(0.0);
        let camera = PerspectiveCamera::default();
        let mut r = RecordingRenderer::default();
        r.dispose();
        r.dispose();
        assert!(r.render(&scene, &camera).is_none());
        r.set_size(Viewport::new(10, 10, 1.0));
        assert_eq!(r.render_count(), 0);
        assert_eq!(r.resize_count(), 0);
        assert!(r.is_disposed());
    }

    #[test]
    fn debug_renderer_empty_scene() {
        let mut r = DebugTextRenderer::new();
        let out = r.render(&Scene::new(), &PerspectiveCamera::default());
        assert!(out.contains("Frame 0"));
        assert!(out.contains("Draws: 0"));
        assert!(out.contains("Environment: none"));
    }

    #[test]
    fn debug_renderer_lists_meshes() {
        let scene = scene_with_sphere(0.0);
        let mut r = DebugTextRenderer::new();
        r.set_size(Viewport::new(640, 480, 1.0));
        let _ = r.render(&scene, &PerspectiveCamera::default());
        let out = r.render(&scene, &PerspectiveCamera::default());
        assert!(out.contains("Frame 1 (640x480"));
        assert!(out.contains("sphere shader pos=(1.00, 2.00, 3.00)"));
    }
}
