//! Rendering adapter: renderer-agnostic interface.
//!
//! # Invariants
//! - A renderer reads the scene and camera; it never mutates either.
//! - `render` draws exactly one frame per call.
//! - After `dispose`, `render` and `set_size` are no-ops.
//!
//! Backends consume a [`FramePacket`], the flattened per-frame view of the
//! scene, so extraction is shared and testable without a GPU.

mod error;
mod frame;
mod renderer;
mod settings;

pub use error::RenderError;
pub use frame::{DrawItem, FramePacket, LightPacket};
pub use renderer::{DebugTextRenderer, FrameRecord, RecordingRenderer, Renderer};
pub use settings::RenderSettings;
