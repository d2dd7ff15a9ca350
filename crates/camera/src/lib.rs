//! Camera and orbit controls.
//!
//! The controller owns the camera. Callers read it, and may change its aspect
//! ratio, but position and orientation only move through [`OrbitControls::update`].
//!
//! # Invariants
//! - Polar and azimuthal angles stay inside the configured window after every update.
//! - Zoom and pan inputs are ignored unless enabled.

mod camera;
mod input;
mod orbit;

pub use camera::PerspectiveCamera;
pub use input::{PointerButton, PointerInput};
pub use orbit::{OrbitControls, OrbitSettings};
