use showroom_scene::{EnvironmentTexture, TextureMapping};
use std::path::{Path, PathBuf};

use crate::{AssetError, EnvironmentLoader};

/// Loads RGBE (.hdr) panoramas, or any format `image` decodes, as float
/// environment textures with equirectangular reflection mapping.
#[derive(Debug, Clone, Default)]
pub struct HdrLoader {
    base_dir: PathBuf,
}

impl HdrLoader {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }
}

impl EnvironmentLoader for HdrLoader {
    fn load_environment(&self, path: &Path) -> Result<EnvironmentTexture, AssetError> {
        if path.as_os_str().is_empty() {
            return Err(AssetError::EmptyPath);
        }
        let full = self.base_dir.join(path);
        let _span = tracing::info_span!("load_environment", path = %full.display()).entered();

        let image = image::open(&full)?.into_rgba32f();
        let (width, height) = image.dimensions();
        let texels: Vec<[f32; 4]> = image.pixels().map(|p| p.0).collect();

        let mut texture = EnvironmentTexture::new(width, height, texels);
        texture.mapping = TextureMapping::EquirectangularReflection;
        tracing::info!(width, height, "environment loaded");
        Ok(texture)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use image::codecs::hdr::HdrEncoder;

    #[test]
    fn empty_path_is_rejected() {
        let loader = HdrLoader::default();
        assert!(matches!(
            loader.load_environment(Path::new("")),
            Err(AssetError::EmptyPath)
        ));
    }

    #[test]
    fn loads_hdr_panorama() {
        let dir = tempfile::tempdir().unwrap();
        let pixels = vec![
            Rgb([1.0f32, 0.5, 0.25]),
            Rgb([2.0, 2.0, 2.0]),
            Rgb([0.0, 0.0, 0.0]),
            Rgb([4.0, 1.0, 0.5]),
        ];
        let file = std::fs::File::create(dir.path().join("sky.hdr")).unwrap();
        HdrEncoder::new(file).encode(&pixels, 2, 2).unwrap();

        let tex = HdrLoader::new(dir.path())
            .load_environment(Path::new("sky.hdr"))
            .unwrap();
        assert_eq!((tex.width, tex.height), (2, 2));
        assert_eq!(tex.texels.len(), 4);
        assert_eq!(tex.mapping, TextureMapping::EquirectangularReflection);
        // RGBE keeps 8 bits of mantissa; values above 1.0 survive.
        assert!((tex.texels[1][0] - 2.0).abs() < 0.05);
        assert_eq!(tex.texels[2][..3], [0.0, 0.0, 0.0]);
        assert_eq!(tex.texels[3][3], 1.0);
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = HdrLoader::new(dir.path())
            .load_environment(Path::new("missing.hdr"))
            .unwrap_err();
        assert!(matches!(err, AssetError::Image(_)));
    }
}
