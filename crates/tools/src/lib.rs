//! Developer tooling: read-only inspection of a running stage and its scene.
//!
//! # Invariants
//! - Inspection never mutates the stage or scene.

mod inspector;

pub use inspector::{NodeInfo, SceneInspector, SceneSummary, StageSummary};
