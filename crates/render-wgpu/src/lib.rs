//! wgpu render backend for the showroom.
//!
//! Owns the window surface and draws the scene in a single pass: glTF
//! standard materials lit by ambient + one directional light (and the
//! environment texture when present), plus the animated sphere.
//!
//! # Invariants
//! - Renderer never mutates the scene.
//! - One `render` call encodes and submits exactly one scene pass.
//! - After `dispose` the surface, device and every GPU buffer are released.

mod gpu;
mod resources;
mod shaders;
mod uniforms;

pub use gpu::{SurfaceFrame, WgpuRenderer};
pub use shaders::MODEL_SHADER;
