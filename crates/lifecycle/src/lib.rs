//! Lifecycle of the showroom scene.
//!
//! A [`Stage`] owns one mount cycle: the [`SceneContext`] (scene, orbit
//! controls, sphere), the renderer and the [`FrameDriver`]. The embedding
//! environment is reached only through the [`Host`] capability trait, and
//! asset loads travel as owned [`LoadRequest`]/[`LoadOutcome`] values so
//! they can run on worker threads.
//!
//! # Invariants
//! - Exactly one camera, renderer and animated sphere per mount cycle.
//! - The sphere's `time` equals seconds since mount and never decreases.
//! - A frame is rescheduled only while the driver is `Running`.
//! - After `unmount`, no frame renders and late load outcomes are dropped.

mod clock;
mod config;
mod context;
mod driver;
mod host;
mod loads;
mod stage;

pub use clock::{Clock, ManualClock, WallClock};
pub use config::{
    CameraConfig, ConfigError, DirectionalConfig, EnvironmentConfig, LightConfig, LightsConfig,
    ModelConfig, SceneConfig, SphereConfig,
};
pub use context::SceneContext;
pub use driver::{FrameDriver, RunState};
pub use host::{Host, HostCall, RecordingHost};
pub use loads::{
    AssetKind, LoadOutcome, LoadRequest, LoadResult, LoadTicket, Loaders, dispatch_load,
};
pub use stage::{AssetStatus, FrameOutcome, Stage, StageError};
