use glam::{Mat4, Vec3};
use showroom_camera::PerspectiveCamera;
use showroom_common::NodeId;
use showroom_scene::{EnvironmentTexture, Mesh, Scene};
use std::sync::Arc;

/// One mesh to draw with its world matrix.
#[derive(Debug, Clone, Copy)]
pub struct DrawItem<'a> {
    pub node: NodeId,
    pub mesh: &'a Mesh,
    pub model: Mat4,
}

impl DrawItem<'_> {
    /// Inverse-transpose of the model matrix, for transforming normals.
    pub fn normal_matrix(&self) -> Mat4 {
        let inv = self.model.inverse();
        if inv.is_finite() {
            inv.transpose()
        } else {
            Mat4::IDENTITY
        }
    }
}

/// Directional light reduced to what shading needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightPacket {
    /// Unit vector pointing toward the light.
    pub direction: Vec3,
    pub radiance: [f32; 3],
}

/// Everything a backend needs to draw one frame, extracted from the scene.
#[derive(Debug, Clone)]
pub struct FramePacket<'a> {
    pub view_proj: Mat4,
    pub camera_position: Vec3,
    pub ambient: [f32; 3],
    pub light: Option<LightPacket>,
    /// Set only when the environment slot holds a texture.
    pub environment: Option<&'a Arc<EnvironmentTexture>>,
    pub draws: Vec<DrawItem<'a>>,
}

impl<'a> FramePacket<'a> {
    pub fn extract(scene: &'a Scene, camera: &PerspectiveCamera) -> Self {
        let light = scene.directional_light().map(|(light, position)| LightPacket {
            direction: light.direction_to_light(position),
            radiance: light.radiance().to_array(),
        });
        let draws = scene
            .meshes()
            .into_iter()
            .map(|(node, mesh, model)| DrawItem { node, mesh, model })
            .collect();
        Self {
            view_proj: camera.view_projection(),
            camera_position: camera.position,
            ambient: scene.ambient_radiance(),
            light,
            environment: scene.environment().and_then(|env| env.texture()),
            draws,
        }
    }

    pub fn triangle_count(&self) -> usize {
        self.draws
            .iter()
            .map(|d| d.mesh.geometry.triangle_count())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use showroom_common::{Color, Transform};
    use showroom_scene::{
        AmbientLight, DirectionalLight, EnvironmentSource, Material, MeshData, Node, NodeKind,
        ShaderMaterial,
    };

    fn sphere_node() -> Node {
        Node::new(
            "sphere",
            NodeKind::Mesh(Mesh::new(
                MeshData::sphere(1.0, 8, 4),
                Material::Shader(ShaderMaterial::default()),
            )),
        )
    }

    #[test]
    fn empty_scene_has_no_draws() {
        let scene = Scene::new();
        let packet = FramePacket::extract(&scene, &PerspectiveCamera::default());
        assert!(packet.draws.is_empty());
        assert!(packet.light.is_none());
        assert!(packet.environment.is_none());
        assert_eq!(packet.ambient, [0.0; 3]);
    }

    #[test]
    fn detached_meshes_are_not_drawn() {
        let mut scene = Scene::new();
        scene.add(sphere_node());
        scene.add_detached(sphere_node());
        let packet = FramePacket::extract(&scene, &PerspectiveCamera::default());
        assert_eq!(packet.draws.len(), 1);
        assert_eq!(packet.triangle_count(), packet.draws[0].mesh.geometry.triangle_count());
    }

    #[test]
    fn lights_are_collected() {
        let mut scene = Scene::new();
        scene.add(Node::new(
            "ambient",
            NodeKind::AmbientLight(AmbientLight::new(Color::WHITE, 0.5)),
        ));
        scene.add(
            Node::new(
                "sun",
                NodeKind::DirectionalLight(DirectionalLight::new(Color::WHITE, 1.0)),
            )
            .with_transform(Transform::from_position(Vec3::new(0.0, 10.0, 0.0))),
        );
        let packet = FramePacket::extract(&scene, &PerspectiveCamera::default());
        assert_eq!(packet.ambient, [0.5; 3]);
        let light = packet.light.unwrap();
        assert_eq!(light.direction, Vec3::Y);
        assert_eq!(light.radiance, [1.0; 3]);
    }

    #[test]
    fn node_environment_is_not_a_texture() {
        let mut scene = Scene::new();
        let root = scene.add(Node::new("model", NodeKind::Group));
        scene.offer_environment(EnvironmentSource::Node(root));
        let packet = FramePacket::extract(&scene, &PerspectiveCamera::default());
        assert!(packet.environment.is_none());
    }

    #[test]
    fn normal_matrix_of_uniform_scale_is_scaled_identity() {
        let mesh = Mesh::new(MeshData::new(), Material::Shader(ShaderMaterial::default()));
        let item = DrawItem {
            node: NodeId::new(),
            mesh: &mesh,
            model: Mat4::from_scale(Vec3::splat(2.0)),
        };
        let n = item.normal_matrix().transform_vector3(Vec3::Y);
        assert!((n - Vec3::new(0.0, 0.5, 0.0)).length() < 1e-6);
    }
}
