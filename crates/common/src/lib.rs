//! Shared types used across the showroom crates.

pub mod color;
pub mod types;
pub mod viewport;

pub use color::Color;
pub use types::{NodeId, Transform};
pub use viewport::Viewport;
