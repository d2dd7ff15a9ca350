use glam::{Quat, Vec3};
use showroom_common::Transform;
use showroom_scene::geometry::compute_normals;
use showroom_scene::{
    Fragment, Material, Mesh, MeshData, NodeKind, StandardMaterial, TextureImage,
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::{AssetError, ModelLoader};

/// glTF 2.0 model loader.
///
/// Imports the default scene (or the first one) as a fragment: one node per
/// glTF node; a node whose mesh has a single primitive becomes a mesh node,
/// otherwise each primitive becomes a mesh child.
#[derive(Debug, Clone, Default)]
pub struct GltfLoader {
    base_dir: PathBuf,
}

impl GltfLoader {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }
}

impl ModelLoader for GltfLoader {
    fn load_model(&self, path: &Path) -> Result<Fragment, AssetError> {
        if path.as_os_str().is_empty() {
            return Err(AssetError::EmptyPath);
        }
        let full = self.base_dir.join(path);
        let _span = tracing::info_span!("load_model", path = %full.display()).entered();

        let (doc, buffers, images) = ::gltf::import(&full)?;
        let scene = doc
            .default_scene()
            .or_else(|| doc.scenes().next())
            .ok_or_else(|| AssetError::NoScene(full.clone()))?;

        let mut importer = Importer {
            buffers: &buffers,
            images: &images,
            textures: HashMap::new(),
        };
        let mut root = Fragment::group(scene.name().unwrap_or("scene"));
        for node in scene.nodes() {
            root.children.push(importer.node(&node));
        }

        tracing::info!(
            nodes = root.node_count(),
            meshes = root.mesh_count(),
            triangles = root.triangle_count(),
            textures = importer.textures.len(),
            "model loaded"
        );
        Ok(root)
    }
}

struct Importer<'a> {
    buffers: &'a [::gltf::buffer::Data],
    images: &'a [::gltf::image::Data],
    textures: HashMap<usize, Option<Arc<TextureImage>>>,
}

impl Importer<'_> {
    fn node(&mut self, node: &::gltf::Node<'_>) -> Fragment {
        let (t, r, s) = node.transform().decomposed();
        let transform = Transform {
            position: Vec3::from_array(t),
            rotation: Quat::from_array(r),
            scale: Vec3::from_array(s),
        };
        let name = node
            .name()
            .map(str::to_string)
            .unwrap_or_else(|| format!("node_{}", node.index()));
        let mut fragment = Fragment::group(name.clone()).with_transform(transform);

        if let Some(mesh) = node.mesh() {
            let mut meshes: Vec<Mesh> = mesh
                .primitives()
                .filter_map(|prim| self.primitive(&prim))
                .collect();
            if meshes.len() == 1 {
                fragment.kind = NodeKind::Mesh(meshes.remove(0));
            } else {
                for (i, m) in meshes.into_iter().enumerate() {
                    fragment
                        .children
                        .push(Fragment::group(format!("{name}#{i}")).with_kind(NodeKind::Mesh(m)));
                }
            }
        }

        for child in node.children() {
            fragment.children.push(self.node(&child));
        }
        fragment
    }

    fn primitive(&mut self, prim: &::gltf::Primitive<'_>) -> Option<Mesh> {
        if prim.mode() != ::gltf::mesh::Mode::Triangles {
            tracing::debug!(mode = ?prim.mode(), "skipping non-triangle primitive");
            return None;
        }
        let reader = prim.reader(|buffer| self.buffers.get(buffer.index()).map(|d| d.0.as_slice()));

        let positions: Vec<[f32; 3]> = reader.read_positions()?.collect();
        let indices: Vec<u32> = match reader.read_indices() {
            Some(indices) => indices.into_u32().collect(),
            None => (0..positions.len() as u32).collect(),
        };
        let normals = match reader.read_normals() {
            Some(normals) => normals.collect(),
            None => compute_normals(&positions, &indices),
        };
        let uvs = match reader.read_tex_coords(0) {
            Some(uvs) => uvs.into_f32().collect(),
            None => vec![[0.0, 0.0]; positions.len()],
        };

        let data = MeshData {
            positions,
            normals,
            uvs,
            indices,
        };
        if let Err(e) = data.validate() {
            tracing::warn!("skipping primitive: {e}");
            return None;
        }

        let material = self.material(&prim.material());
        Some(Mesh::new(data, Material::Standard(material)))
    }

    fn material(&mut self, material: &::gltf::Material<'_>) -> StandardMaterial {
        let pbr = material.pbr_metallic_roughness();
        let base_color_texture = pbr
            .base_color_texture()
            .and_then(|info| self.texture(info.texture().source().index()));
        StandardMaterial {
            name: material.name().unwrap_or("material").to_string(),
            base_color: pbr.base_color_factor(),
            metallic: pbr.metallic_factor(),
            roughness: pbr.roughness_factor(),
            base_color_texture,
        }
    }

    fn texture(&mut self, image_index: usize) -> Option<Arc<TextureImage>> {
        let images = self.images;
        self.textures
            .entry(image_index)
            .or_insert_with(|| images.get(image_index).and_then(to_rgba8).map(Arc::new))
            .clone()
    }
}

/// Expand a decoded glTF image to RGBA8. Wide formats are not supported.
fn to_rgba8(image: &::gltf::image::Data) -> Option<TextureImage> {
    use ::gltf::image::Format;

    let rgba = match image.format {
        Format::R8G8B8A8 => image.pixels.clone(),
        Format::R8G8B8 => image
            .pixels
            .chunks_exact(3)
            .flat_map(|p| [p[0], p[1], p[2], 255])
            .collect(),
        Format::R8G8 => image
            .pixels
            .chunks_exact(2)
            .flat_map(|p| [p[0], p[0], p[0], p[1]])
            .collect(),
        Format::R8 => image.pixels.iter().flat_map(|&l| [l, l, l, 255]).collect(),
        other => {
            tracing::debug!(format = ?other, "unsupported texture format, using factor only");
            return None;
        }
    };
    Some(TextureImage {
        width: image.width,
        height: image.height,
        rgba,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const TRIANGLE_GLTF: &str = r#"{
        "asset": { "version": "2.0" },
        "scene": 0,
        "scenes": [{ "name": "warehouse", "nodes": [0] }],
        "nodes": [{ "name": "floor", "mesh": 0, "translation": [1.0, 2.0, 3.0] }],
        "meshes": [{
            "name": "tri",
            "primitives": [{ "attributes": { "POSITION": 0 }, "indices": 1, "material": 0 }]
        }],
        "materials": [{
            "name": "concrete",
            "pbrMetallicRoughness": {
                "baseColorFactor": [0.5, 0.4, 0.3, 1.0],
                "metallicFactor": 0.0,
                "roughnessFactor": 0.8
            }
        }],
        "buffers": [{ "uri": "tri.bin", "byteLength": 44 }],
        "bufferViews": [
            { "buffer": 0, "byteOffset": 0, "byteLength": 36 },
            { "buffer": 0, "byteOffset": 36, "byteLength": 6 }
        ],
        "accessors": [
            { "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
              "min": [0.0, 0.0, 0.0], "max": [1.0, 0.0, 1.0] },
            { "bufferView": 1, "componentType": 5123, "count": 3, "type": "SCALAR" }
        ]
    }"#;

    fn write_triangle(dir: &Path) {
        let mut bin = Vec::new();
        for v in [0.0f32, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0] {
            bin.extend_from_slice(&v.to_le_bytes());
        }
        for i in [0u16, 1, 2] {
            bin.extend_from_slice(&i.to_le_bytes());
        }
        bin.extend_from_slice(&[0, 0]);
        std::fs::File::create(dir.join("tri.bin"))
            .unwrap()
            .write_all(&bin)
            .unwrap();
        std::fs::write(dir.join("scene.gltf"), TRIANGLE_GLTF).unwrap();
    }

    #[test]
    fn loads_triangle_scene() {
        let dir = tempfile::tempdir().unwrap();
        write_triangle(dir.path());

        let loader = GltfLoader::new(dir.path());
        let root = loader.load_model(Path::new("scene.gltf")).unwrap();
        assert_eq!(root.name, "warehouse");
        assert_eq!(root.node_count(), 2);
        assert_eq!(root.mesh_count(), 1);

        let floor = &root.children[0];
        assert_eq!(floor.name, "floor");
        assert_eq!(floor.transform.position, Vec3::new(1.0, 2.0, 3.0));
        let NodeKind::Mesh(mesh) = &floor.kind else {
            panic!("floor should be a mesh node");
        };
        assert_eq!(mesh.geometry.indices, vec![0, 1, 2]);
        // No NORMAL attribute: normals are computed from the face.
        assert_eq!(mesh.geometry.normals[0], [0.0, 1.0, 0.0]);
        // No TEXCOORD_0: zeros.
        assert_eq!(mesh.geometry.uvs, vec![[0.0, 0.0]; 3]);

        let Material::Standard(material) = &mesh.material else {
            panic!("glTF materials are standard");
        };
        assert_eq!(material.name, "concrete");
        assert_eq!(material.base_color, [0.5, 0.4, 0.3, 1.0]);
        assert_eq!(material.metallic, 0.0);
        assert!(material.base_color_texture.is_none());
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let loader = GltfLoader::new(dir.path());
        assert!(loader.load_model(Path::new("nope.gltf")).is_err());
    }

    #[test]
    fn empty_path_is_rejected() {
        let loader = GltfLoader::default();
        assert!(matches!(
            loader.load_model(Path::new("")),
            Err(AssetError::EmptyPath)
        ));
    }

    #[test]
    fn rgb_textures_gain_alpha() {
        let data = ::gltf::image::Data {
            pixels: vec![10, 20, 30, 40, 50, 60],
            format: ::gltf::image::Format::R8G8B8,
            width: 2,
            height: 1,
        };
        let tex = to_rgba8(&data).unwrap();
        assert_eq!(tex.rgba, vec![10, 20, 30, 255, 40, 50, 60, 255]);
        assert_eq!(tex.byte_len(), 8);
    }
}
