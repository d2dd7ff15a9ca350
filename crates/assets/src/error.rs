use std::path::PathBuf;

/// Errors from asset loading.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("empty asset path")]
    EmptyPath,
    #[error("glTF import error: {0}")]
    Gltf(#[from] gltf::Error),
    #[error("glTF file {0} contains no scene")]
    NoScene(PathBuf),
    #[error("image decode error: {0}")]
    Image(#[from] image::ImageError),
    #[error("unsupported asset: {0}")]
    Unsupported(String),
}
