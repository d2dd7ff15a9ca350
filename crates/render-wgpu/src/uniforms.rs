use bytemuck::{Pod, Zeroable};
use showroom_render::{DrawItem, FramePacket};
use showroom_scene::Material;

/// Group 0, binding 0. Layout mirrors `FrameUniforms` in the WGSL sources.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub(crate) struct FrameUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub camera_position: [f32; 4],
    pub ambient: [f32; 4],
    pub light_direction: [f32; 4],
    pub light_color: [f32; 4],
    /// rgb: mean environment color; w: 1 when an environment texture is bound.
    pub environment: [f32; 4],
}

impl FrameUniforms {
    /// `environment_mean` is the mean color of the bound environment texture,
    /// computed when it was uploaded rather than per frame.
    pub fn from_packet(packet: &FramePacket<'_>, environment_mean: Option<[f32; 3]>) -> Self {
        let (light_direction, light_color) = match packet.light {
            Some(light) => (light.direction.extend(0.0).to_array(), rgb(light.radiance)),
            None => ([0.0, 1.0, 0.0, 0.0], [0.0; 4]),
        };
        let environment = match (packet.environment, environment_mean) {
            (Some(_), Some([r, g, b])) => [r, g, b, 1.0],
            _ => [0.0; 4],
        };
        Self {
            view_proj: packet.view_proj.to_cols_array_2d(),
            camera_position: packet.camera_position.extend(1.0).to_array(),
            ambient: rgb(packet.ambient),
            light_direction,
            light_color,
            environment,
        }
    }
}

/// Group 1, binding 0.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub(crate) struct DrawUniforms {
    pub model: [[f32; 4]; 4],
    pub normal_matrix: [[f32; 4]; 4],
    pub base_color: [f32; 4],
    /// x: metallic, y: roughness.
    pub material: [f32; 4],
}

impl DrawUniforms {
    pub fn from_draw(draw: &DrawItem<'_>) -> Self {
        let (base_color, material) = match &draw.mesh.material {
            Material::Standard(m) => (m.base_color, [m.metallic, m.roughness, 0.0, 0.0]),
            Material::Shader(_) => ([1.0; 4], [0.0; 4]),
        };
        Self {
            model: draw.model.to_cols_array_2d(),
            normal_matrix: draw.normal_matrix().to_cols_array_2d(),
            base_color,
            material,
        }
    }
}

/// Interleaved vertex: position, normal, uv (locations 0, 1, 2).
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub(crate) struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

pub(crate) fn interleave(mesh: &showroom_scene::MeshData) -> Vec<Vertex> {
    mesh.positions
        .iter()
        .zip(&mesh.normals)
        .zip(&mesh.uvs)
        .map(|((p, n), uv)| Vertex {
            position: *p,
            normal: *n,
            uv: *uv,
        })
        .collect()
}

fn rgb(c: [f32; 3]) -> [f32; 4] {
    [c[0], c[1], c[2], 1.0]
}
