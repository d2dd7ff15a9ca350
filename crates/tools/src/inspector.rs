use serde::Serialize;
use showroom_common::NodeId;
use showroom_lifecycle::{Host, Stage};
use showroom_render::Renderer;
use showroom_scene::{NodeKind, Scene};

/// Scene and stage inspector for developer tooling.
///
/// Provides read-only queries for the CLI and the desktop overlay.
pub struct SceneInspector;

impl SceneInspector {
    pub fn scene(scene: &Scene) -> SceneSummary {
        let mut attached = 0;
        let mut meshes = 0;
        let mut triangles = 0;
        scene.traverse(|_, node, _| {
            attached += 1;
            if let NodeKind::Mesh(mesh) = &node.kind {
                meshes += 1;
                triangles += mesh.geometry.triangle_count();
            }
        });
        SceneSummary {
            nodes: scene.node_count(),
            attached,
            roots: scene.roots().len(),
            meshes,
            triangles,
            revision: scene.revision(),
            environment: scene.environment().map_or("none", |e| e.kind()),
        }
    }

    pub fn stage<H: Host, R: Renderer>(stage: &Stage<H, R>) -> StageSummary {
        let ctx = stage.context();
        let controls = ctx.map(|c| &c.controls);
        StageSummary {
            mounted: stage.is_mounted(),
            running: stage.is_running(),
            generation: stage.generation(),
            elapsed: stage.elapsed().unwrap_or(0.0),
            frames: stage.frame_count(),
            sphere_time: ctx.and_then(|c| c.sphere_time()),
            polar_degrees: controls.map_or(0.0, |c| c.polar_angle().to_degrees()),
            azimuth_degrees: controls.map_or(0.0, |c| c.azimuthal_angle().to_degrees()),
            distance: controls.map_or(0.0, |c| c.distance()),
            model: stage.model_status().to_string(),
            environment: stage.environment_status().to_string(),
            scene: ctx.map(|c| Self::scene(&c.scene)),
        }
    }

    /// Attached nodes in depth-first order with their depth and world position.
    pub fn tree(scene: &Scene) -> Vec<NodeInfo> {
        let mut out = Vec::new();
        scene.traverse(|id, node, world| {
            let mut depth = 0;
            let mut cursor = node.parent();
            while let Some(p) = cursor {
                depth += 1;
                cursor = scene.get(p).and_then(|n| n.parent());
            }
            out.push(NodeInfo::new(id, &node.name, &node.kind, depth, world));
        });
        out
    }

    pub fn inspect_node(scene: &Scene, id: NodeId) -> Option<NodeInfo> {
        let node = scene.get(id)?;
        let world = scene.world_matrix(id)?;
        Some(NodeInfo::new(id, &node.name, &node.kind, 0, world))
    }
}

/// Summary of a scene for the inspector.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneSummary {
    pub nodes: usize,
    pub attached: usize,
    pub roots: usize,
    pub meshes: usize,
    pub triangles: usize,
    pub revision: u64,
    pub environment: &'static str,
}

impl std::fmt::Display for SceneSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Scene: nodes={} attached={} meshes={} triangles={} environment={}",
            self.nodes, self.attached, self.meshes, self.triangles, self.environment
        )
    }
}

/// Summary of a stage: lifecycle, timing, camera and assets.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageSummary {
    pub mounted: bool,
    pub running: bool,
    pub generation: u64,
    pub elapsed: f64,
    pub frames: u64,
    pub sphere_time: Option<f32>,
    pub polar_degrees: f32,
    pub azimuth_degrees: f32,
    pub distance: f32,
    pub model: String,
    pub environment: String,
    pub scene: Option<SceneSummary>,
}

impl std::fmt::Display for StageSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "Stage: mounted={} running={} generation={} t={:.3}s frames={}",
            self.mounted, self.running, self.generation, self.elapsed, self.frames
        )?;
        writeln!(
            f,
            "Camera: polar={:.1} azimuth={:.1} distance={:.1}",
            self.polar_degrees, self.azimuth_degrees, self.distance
        )?;
        write!(f, "Assets: model={} environment={}", self.model, self.environment)?;
        if let Some(scene) = &self.scene {
            write!(f, "\n{scene}")?;
        }
        Ok(())
    }
}

/// Detailed info about a single node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeInfo {
    pub id: NodeId,
    pub name: String,
    pub kind: &'static str,
    pub depth: usize,
    pub world_position: [f32; 3],
    pub world_scale: [f32; 3],
    pub triangles: usize,
}

impl NodeInfo {
    fn new(id: NodeId, name: &str, kind: &NodeKind, depth: usize, world: glam::Mat4) -> Self {
        let (scale, _, translation) = world.to_scale_rotation_translation();
        let triangles = match kind {
            NodeKind::Mesh(mesh) => mesh.geometry.triangle_count(),
            _ => 0,
        };
        Self {
            id,
            name: name.to_string(),
            kind: kind.label(),
            depth,
            world_position: translation.to_array(),
            world_scale: scale.to_array(),
            triangles,
        }
    }
}

impl std::fmt::Display for NodeInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:indent$}[{}] {} ({}) pos=({:.2}, {:.2}, {:.2})",
            "",
            self.id.short(),
            self.name,
            self.kind,
            self.world_position[0],
            self.world_position[1],
            self.world_position[2],
            indent = self.depth * 2
        )?;
        if self.triangles > 0 {
            write!(f, " tris={}", self.triangles)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use showroom_common::{Transform, Viewport};
    use showroom_lifecycle::{
        LoadOutcome, LoadResult, ManualClock, RecordingHost, SceneConfig,
    };
    use showroom_render::{RecordingRenderer, RenderSettings};
    use showroom_scene::{Fragment, Material, Mesh, MeshData, Node, StandardMaterial};

    fn mesh_node(name: &str) -> Node {
        Node::new(
            name,
            NodeKind::Mesh(Mesh::new(
                MeshData::sphere(1.0, 4, 2),
                Material::Standard(StandardMaterial::default()),
            )),
        )
    }

    #[test]
    fn summary_empty_scene() {
        let summary = SceneInspector::scene(&Scene::new());
        assert_eq!(summary.nodes, 0);
        assert_eq!(summary.environment, "none");
        assert!(format!("{summary}").contains("nodes=0"));
    }

    #[test]
    fn summary_skips_detached() {
        let mut scene = Scene::new();
        scene.add(mesh_node("a"));
        scene.add_detached(mesh_node("b"));
        let summary = SceneInspector::scene(&scene);
        assert_eq!(summary.nodes, 2);
        assert_eq!(summary.attached, 1);
        assert_eq!(summary.meshes, 1);
        assert_eq!(summary.triangles, MeshData::sphere(1.0, 4, 2).triangle_count());
    }

    #[test]
    fn tree_reports_depth_and_world_position() {
        let mut scene = Scene::new();
        let root = scene.insert_fragment(
            Fragment::group("root")
                .with_transform(Transform::from_position(Vec3::X).with_scale(Vec3::splat(2.0)))
                .with_child(
                    Fragment::group("child")
                        .with_transform(Transform::from_position(Vec3::new(0.0, 1.0, 0.0))),
                ),
        );
        let tree = SceneInspector::tree(&scene);
        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].id, root);
        assert_eq!(tree[1].depth, 1);
        assert_eq!(tree[1].world_position, [1.0, 2.0, 0.0]);
        assert!(format!("{}", tree[1]).starts_with("  ["));
    }

    #[test]
    fn inspect_missing_node() {
        assert!(SceneInspector::inspect_node(&Scene::new(), NodeId::new()).is_none());
    }

    #[test]
    fn stage_summary_follows_lifecycle() {
        let mut stage: Stage<RecordingHost, RecordingRenderer> = Stage::new(
            RecordingHost::new(Viewport::new(800, 600, 1.0)),
            SceneConfig::default(),
        );
        let before = SceneInspector::stage(&stage);
        assert!(!before.mounted);
        assert!(before.scene.is_none());
        assert_eq!(before.model, "idle");

        let clock = ManualClock::new();
        let requests = stage
            .mount(
                |_| Ok(RecordingRenderer::new(RenderSettings::default())),
                Box::new(clock.clone()),
            )
            .unwrap();
        stage.apply_load(LoadOutcome {
            ticket: requests[0].ticket,
            result: LoadResult::Model(Ok(Fragment::group("warehouse"))),
        });
        clock.advance(1.25);
        stage.frame();

        let summary = SceneInspector::stage(&stage);
        assert!(summary.mounted && summary.running);
        assert_eq!(summary.frames, 1);
        assert_eq!(summary.sphere_time, Some(1.25));
        assert_eq!(summary.model, "loaded");
        assert_eq!(summary.environment, "loading");
        assert!((summary.polar_degrees - 90.0).abs() < 0.1);
        let scene = summary.scene.as_ref().unwrap();
        assert_eq!(scene.environment, "node");
        assert_eq!(scene.meshes, 1);
        assert!(format!("{summary}").contains("model=loaded"));
    }
}
