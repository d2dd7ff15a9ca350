//! Scene graph for the showroom.
//!
//! A mutable tree of positioned nodes traversed once per frame by a renderer.
//! Loaders produce [`Fragment`]s that are inserted as sub-trees.
//!
//! # Invariants
//! - Nodes reachable from a root are rendered; detached nodes are kept but skipped.
//! - A node has at most one parent and the tree never contains a cycle.
//! - The environment slot ranks `Texture` above `Node`; see [`EnvironmentSource`].
//! - Structural changes bump the revision; uniform writes do not.

pub mod environment;
pub mod fragment;
pub mod geometry;
pub mod graph;
pub mod light;
pub mod material;

pub use environment::{EnvironmentSource, EnvironmentTexture, TextureMapping};
pub use fragment::Fragment;
pub use geometry::MeshData;
pub use graph::{Node, NodeKind, Scene, SceneError, SceneEvent};
pub use light::{AmbientLight, DirectionalLight};
pub use material::{Material, Mesh, ShaderMaterial, StandardMaterial, TextureImage};
