//! Shader program of the animated sphere.
//!
//! The WGSL in [`SPHERE_SHADER`] and the CPU functions in [`program`] compute
//! the same color, so golden-value tests run without a GPU.
//!
//! # Invariants
//! - The only input besides geometry is the `time` uniform.
//! - `fragment_color` is pure: equal `(uv, time)` always yields equal color.

pub mod program;
mod wgsl;

pub use program::{ShaderProgram, TimeUniform, fragment_color, mix, smoothstep};
pub use wgsl::{FRAGMENT_ENTRY, SPHERE_SHADER, VERTEX_ENTRY};
