use showroom_shader::ShaderProgram;
use std::sync::Arc;

use crate::geometry::MeshData;

/// 8-bit RGBA image used as a material texture.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl TextureImage {
    pub fn byte_len(&self) -> usize {
        self.rgba.len()
    }
}

/// Metallic-roughness surface, as imported from glTF.
#[derive(Debug, Clone)]
pub struct StandardMaterial {
    pub name: String,
    pub base_color: [f32; 4],
    pub metallic: f32,
    pub roughness: f32,
    pub base_color_texture: Option<Arc<TextureImage>>,
}

impl Default for StandardMaterial {
    fn default() -> Self {
        Self {
            name: "default".into(),
            base_color: [1.0, 1.0, 1.0, 1.0],
            metallic: 1.0,
            roughness: 1.0,
            base_color_texture: None,
        }
    }
}

/// Material driven by the sphere's shader program.
#[derive(Debug, Clone, Default)]
pub struct ShaderMaterial {
    pub program: ShaderProgram,
}

#[derive(Debug, Clone)]
pub enum Material {
    Standard(StandardMaterial),
    Shader(ShaderMaterial),
}

impl Material {
    pub fn shader_program(&self) -> Option<&ShaderProgram> {
        match self {
            Material::Shader(m) => Some(&m.program),
            Material::Standard(_) => None,
        }
    }

    pub fn shader_program_mut(&mut self) -> Option<&mut ShaderProgram> {
        match self {
            Material::Shader(m) => Some(&mut m.program),
            Material::Standard(_) => None,
        }
    }
}

/// Geometry plus material. Geometry is shared so fragments clone cheaply.
#[derive(Debug, Clone)]
pub struct Mesh {
    pub geometry: Arc<MeshData>,
    pub material: Material,
}

impl Mesh {
    pub fn new(geometry: MeshData, material: Material) -> Self {
        Self {
            geometry: Arc::new(geometry),
            material,
        }
    }
}
