use glam::Mat4;
use showroom_common::{NodeId, Transform};
use showroom_shader::ShaderProgram;
use std::collections::BTreeMap;

use crate::environment::EnvironmentSource;
use crate::fragment::Fragment;
use crate::light::{AmbientLight, DirectionalLight};
use crate::material::Mesh;

/// What a node contributes to the frame.
#[derive(Debug, Clone)]
pub enum NodeKind {
    Group,
    Mesh(Mesh),
    AmbientLight(AmbientLight),
    DirectionalLight(DirectionalLight),
}

impl NodeKind {
    pub fn label(&self) -> &'static str {
        match self {
            NodeKind::Group => "group",
            NodeKind::Mesh(_) => "mesh",
            NodeKind::AmbientLight(_) => "ambient_light",
            NodeKind::DirectionalLight(_) => "directional_light",
        }
    }
}

/// A positioned node in the scene tree.
#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,
    pub transform: Transform,
    pub kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    pub fn new(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            transform: Transform::default(),
            kind,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// A record produced by every structural mutation, kept for inspection.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneEvent {
    Added { id: NodeId, name: String },
    Attached { child: NodeId, parent: NodeId },
    Detached { id: NodeId },
    TransformUpdated { id: NodeId },
    EnvironmentSet { kind: &'static str },
    EnvironmentKept { offered: &'static str, current: &'static str },
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum SceneError {
    #[error("node not found: {0}")]
    NotFound(NodeId),
    #[error("attaching {child} under {parent} would create a cycle")]
    Cycle { child: NodeId, parent: NodeId },
    #[error("invalid mesh: {0}")]
    InvalidMesh(String),
}

/// The scene graph.
///
/// Nodes live in a BTreeMap; tree order is kept by each node's ordered
/// children and by `roots`. Only nodes reachable from a root are drawn.
#[derive(Debug, Default)]
pub struct Scene {
    nodes: BTreeMap<NodeId, Node>,
    roots: Vec<NodeId>,
    environment: Option<EnvironmentSource>,
    revision: u64,
    event_log: Vec<SceneEvent>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Incremented on every structural change or transform update.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn events(&self) -> &[SceneEvent] {
        &self.event_log
    }

    pub fn drain_events(&mut self) -> Vec<SceneEvent> {
        std::mem::take(&mut self.event_log)
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Add a node as a new root.
    pub fn add(&mut self, node: Node) -> NodeId {
        let id = self.add_detached(node);
        self.roots.push(id);
        self.revision += 1;
        id
    }

    /// Add a node that is kept in the scene but not reachable from any root.
    pub fn add_detached(&mut self, node: Node) -> NodeId {
        let id = NodeId::new();
        tracing::debug!(%id, name = %node.name, kind = node.kind.label(), "node added");
        self.event_log.push(SceneEvent::Added {
            id,
            name: node.name.clone(),
        });
        self.nodes.insert(id, node);
        self.revision += 1;
        id
    }

    /// Insert a loaded sub-tree as a new root. Returns the id of its root node.
    pub fn insert_fragment(&mut self, fragment: Fragment) -> NodeId {
        let root = self.insert_fragment_node(fragment, None);
        self.roots.push(root);
        root
    }

    fn insert_fragment_node(&mut self, fragment: Fragment, parent: Option<NodeId>) -> NodeId {
        let Fragment {
            name,
            transform,
            kind,
            children,
        } = fragment;
        let mut node = Node::new(name, kind).with_transform(transform);
        node.parent = parent;
        let id = self.add_detached(node);
        for child in children {
            let child_id = self.insert_fragment_node(child, Some(id));
            if let Some(n) = self.nodes.get_mut(&id) {
                n.children.push(child_id);
            }
        }
        id
    }

    /// Make `child` the last child of `parent`, detaching it from wherever it was.
    pub fn attach(&mut self, child: NodeId, parent: NodeId) -> Result<(), SceneError> {
        if !self.nodes.contains_key(&child) {
            return Err(SceneError::NotFound(child));
        }
        if !self.nodes.contains_key(&parent) {
            return Err(SceneError::NotFound(parent));
        }
        if child == parent || self.is_ancestor(child, parent) {
            return Err(SceneError::Cycle { child, parent });
        }
        self.unlink(child);
        if let Some(p) = self.nodes.get_mut(&parent) {
            p.children.push(child);
        }
        if let Some(c) = self.nodes.get_mut(&child) {
            c.parent = Some(parent);
        }
        self.revision += 1;
        self.event_log.push(SceneEvent::Attached { child, parent });
        Ok(())
    }

    /// Remove a node from the tree without deleting it.
    pub fn detach(&mut self, id: NodeId) -> Result<(), SceneError> {
        if !self.nodes.contains_key(&id) {
            return Err(SceneError::NotFound(id));
        }
        self.unlink(id);
        self.revision += 1;
        self.event_log.push(SceneEvent::Detached { id });
        Ok(())
    }

    fn unlink(&mut self, id: NodeId) {
        self.roots.retain(|r| *r != id);
        let parent = self.nodes.get_mut(&id).and_then(|n| n.parent.take());
        if let Some(p) = parent.and_then(|p| self.nodes.get_mut(&p)) {
            p.children.retain(|c| *c != id);
        }
    }

    /// Whether `ancestor` is on the parent chain of `id`.
    fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut cursor = self.nodes.get(&id).and_then(|n| n.parent);
        while let Some(p) = cursor {
            if p == ancestor {
                return true;
            }
            cursor = self.nodes.get(&p).and_then(|n| n.parent);
        }
        false
    }

    /// Whether the node is reachable from a root.
    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let Some(node) = self.nodes.get(&current) else {
                return false;
            };
            match node.parent {
                Some(p) => cursor = Some(p),
                None => return self.roots.contains(&current),
            }
        }
        false
    }

    pub fn set_transform(&mut self, id: NodeId, transform: Transform) -> Result<(), SceneError> {
        let node = self.nodes.get_mut(&id).ok_or(SceneError::NotFound(id))?;
        node.transform = transform;
        self.revision += 1;
        self.event_log.push(SceneEvent::TransformUpdated { id });
        Ok(())
    }

    /// Product of the local transforms from the root down to `id`.
    pub fn world_matrix(&self, id: NodeId) -> Option<Mat4> {
        let node = self.nodes.get(&id)?;
        let local = node.transform.matrix();
        match node.parent {
            Some(p) => Some(self.world_matrix(p)? * local),
            None => Some(local),
        }
    }

    /// Depth-first walk of every attached node with its world matrix.
    pub fn traverse(&self, mut visit: impl FnMut(NodeId, &Node, Mat4)) {
        let mut stack: Vec<(NodeId, Mat4)> = self
            .roots
            .iter()
            .rev()
            .map(|id| (*id, Mat4::IDENTITY))
            .collect();
        while let Some((id, parent_world)) = stack.pop() {
            let Some(node) = self.nodes.get(&id) else {
                continue;
            };
            let world = parent_world * node.transform.matrix();
            visit(id, node, world);
            for child in node.children.iter().rev() {
                stack.push((*child, world));
            }
        }
    }

    /// Attached mesh nodes with their world matrices, in traversal order.
    pub fn meshes(&self) -> Vec<(NodeId, &Mesh, Mat4)> {
        let mut found = Vec::new();
        self.traverse(|id, node, world| {
            if matches!(node.kind, NodeKind::Mesh(_)) {
                found.push((id, world));
            }
        });
        found
            .into_iter()
            .filter_map(|(id, world)| match &self.nodes.get(&id)?.kind {
                NodeKind::Mesh(mesh) => Some((id, mesh, world)),
                _ => None,
            })
            .collect()
    }

    /// Sum of attached ambient lights' radiance.
    pub fn ambient_radiance(&self) -> [f32; 3] {
        let mut total = [0.0f32; 3];
        self.traverse(|_, node, _| {
            if let NodeKind::AmbientLight(light) = &node.kind {
                let c = light.radiance();
                total[0] += c.r;
                total[1] += c.g;
                total[2] += c.b;
            }
        });
        total
    }

    /// First attached directional light and its world position.
    pub fn directional_light(&self) -> Option<(DirectionalLight, glam::Vec3)> {
        let mut found = None;
        self.traverse(|_, node, world| {
            if found.is_some() {
                return;
            }
            if let NodeKind::DirectionalLight(light) = &node.kind {
                found = Some((*light, world.transform_point3(glam::Vec3::ZERO)));
            }
        });
        found
    }

    /// Mutable access to a mesh node's shader program, if it has one.
    ///
    /// Uniform writes are per-frame data and do not bump the revision.
    pub fn shader_program_mut(&mut self, id: NodeId) -> Option<&mut ShaderProgram> {
        match &mut self.nodes.get_mut(&id)?.kind {
            NodeKind::Mesh(mesh) => mesh.material.shader_program_mut(),
            _ => None,
        }
    }

    pub fn shader_program(&self, id: NodeId) -> Option<&ShaderProgram> {
        match &self.nodes.get(&id)?.kind {
            NodeKind::Mesh(mesh) => mesh.material.shader_program(),
            _ => None,
        }
    }

    pub fn environment(&self) -> Option<&EnvironmentSource> {
        self.environment.as_ref()
    }

    /// Offer a new environment source. It replaces the current one only if
    /// its rank is at least as high. Returns whether it was applied.
    pub fn offer_environment(&mut self, source: EnvironmentSource) -> bool {
        if let Some(current) = &self.environment {
            if source.rank() < current.rank() {
                tracing::debug!(
                    offered = source.kind(),
                    current = current.kind(),
                    "environment offer outranked, keeping current"
                );
                self.event_log.push(SceneEvent::EnvironmentKept {
                    offered: source.kind(),
                    current: current.kind(),
                });
                return false;
            }
        }
        tracing::debug!(kind = source.kind(), "environment set");
        self.event_log
            .push(SceneEvent::EnvironmentSet { kind: source.kind() });
        self.environment = Some(source);
        self.revision += 1;
        true
    }
}
