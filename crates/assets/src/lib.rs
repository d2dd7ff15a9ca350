//! Asset loaders for the showroom.
//!
//! Each loader is a capability: given a path, produce an asset or an error.
//! Loaders are `Send + Sync` so hosts can run them off the UI thread; they
//! never touch the scene themselves.
//!
//! # Layout
//! Paths are resolved against the loader's base directory, like a loader
//! configured with a resource path.

mod environment;
mod error;
mod model;

pub use environment::HdrLoader;
pub use error::AssetError;
pub use model::GltfLoader;

use showroom_scene::{EnvironmentTexture, Fragment};
use std::path::Path;

/// Produces a scene-graph fragment from a model file.
pub trait ModelLoader: Send + Sync {
    fn load_model(&self, path: &Path) -> Result<Fragment, AssetError>;
}

/// Produces an environment texture from a panoramic image.
pub trait EnvironmentLoader: Send + Sync {
    fn load_environment(&self, path: &Path) -> Result<EnvironmentTexture, AssetError>;
}
