use glam::Vec3;
use showroom_camera::{OrbitControls, PerspectiveCamera};
use showroom_common::{NodeId, Transform, Viewport};
use showroom_scene::{
    AmbientLight, DirectionalLight, Material, Mesh, MeshData, Node, NodeKind, Scene,
    ShaderMaterial,
};

use crate::config::SceneConfig;

/// Everything one mount cycle owns besides the renderer and driver.
#[derive(Debug)]
pub struct SceneContext {
    pub scene: Scene,
    pub controls: OrbitControls,
    /// The animated sphere. Detached until the model arrives.
    pub sphere: NodeId,
    /// Root of the loaded model, once inserted.
    pub model_root: Option<NodeId>,
}

impl SceneContext {
    /// Build the scene, lights, controls and detached sphere for `viewport`.
    pub fn build(config: &SceneConfig, viewport: &Viewport) -> Self {
        let mut scene = Scene::new();

        let ambient = &config.lights.ambient;
        scene.add(Node::new(
            "ambient_light",
            NodeKind::AmbientLight(AmbientLight::new(ambient.color(), ambient.intensity)),
        ));
        let sun = &config.lights.directional;
        scene.add(
            Node::new(
                "directional_light",
                NodeKind::DirectionalLight(DirectionalLight::new(sun.color(), sun.intensity)),
            )
            .with_transform(Transform::from_position(sun.position)),
        );

        let c = &config.camera;
        let mut camera = PerspectiveCamera::new(c.fov, viewport.aspect(), c.near, c.far);
        camera.position = c.position;
        camera.target = Vec3::ZERO;
        let mut controls = OrbitControls::new(camera, config.controls.clone());
        controls.set_viewport(viewport);

        let s = &config.sphere;
        let sphere = scene.add_detached(
            Node::new(
                "animated_sphere",
                NodeKind::Mesh(Mesh::new(
                    MeshData::sphere(s.radius, s.width_segments, s.height_segments),
                    Material::Shader(ShaderMaterial::default()),
                )),
            )
            .with_transform(Transform::from_position(s.position)),
        );

        tracing::debug!(
            nodes = scene.node_count(),
            sphere = %sphere,
            "scene context built"
        );
        Self {
            scene,
            controls,
            sphere,
            model_root: None,
        }
    }

    /// Current `time` uniform of the sphere.
    pub fn sphere_time(&self) -> Option<f32> {
        self.scene.shader_program(self.sphere).map(|p| p.time())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_lights_and_detached_sphere() {
        let ctx = SceneContext::build(&SceneConfig::default(), &Viewport::new(800, 400, 1.0));
        assert_eq!(ctx.scene.roots().len(), 2);
        assert_eq!(ctx.scene.node_count(), 3);
        assert!(!ctx.scene.is_attached(ctx.sphere));
        assert_eq!(ctx.sphere_time(), Some(0.0));
        assert!(ctx.model_root.is_none());
        assert!(ctx.scene.directional_light().is_some());
    }

    #[test]
    fn camera_follows_config_and_viewport() {
        let ctx = SceneContext::build(&SceneConfig::default(), &Viewport::new(800, 400, 1.0));
        let cam = ctx.controls.camera();
        assert_eq!(cam.aspect, 2.0);
        assert!((cam.fov - 45.0_f32.to_radians()).abs() < 1e-6);
        assert!((cam.position - Vec3::new(0.0, 0.0, 40.0)).length() < 1e-4);
    }

    #[test]
    fn sphere_uses_configured_geometry() {
        let ctx = SceneContext::build(&SceneConfig::default(), &Viewport::default());
        let node = ctx.scene.get(ctx.sphere).unwrap();
        assert_eq!(node.transform.position, Vec3::new(8.0, 1.5, -17.0));
        let NodeKind::Mesh(mesh) = &node.kind else {
            panic!("sphere is a mesh");
        };
        assert_eq!(mesh.geometry.vertex_count(), 65 * 65);
    }
}
