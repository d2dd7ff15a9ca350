use showroom_common::Transform;

use crate::graph::NodeKind;

/// A detached sub-tree, as produced by a model loader, ready to be inserted
/// into a [`crate::Scene`].
#[derive(Debug, Clone)]
pub struct Fragment {
    pub name: String,
    pub transform: Transform,
    pub kind: NodeKind,
    pub children: Vec<Fragment>,
}

impl Fragment {
    pub fn group(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transform: Transform::default(),
            kind: NodeKind::Group,
            children: Vec::new(),
        }
    }

    pub fn with_kind(mut self, kind: NodeKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_child(mut self, child: Fragment) -> Self {
        self.children.push(child);
        self
    }

    /// Total nodes in this sub-tree, including the root.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(Fragment::node_count).sum::<usize>()
    }

    pub fn mesh_count(&self) -> usize {
        let own = usize::from(matches!(self.kind, NodeKind::Mesh(_)));
        own + self.children.iter().map(Fragment::mesh_count).sum::<usize>()
    }

    pub fn triangle_count(&self) -> usize {
        let own = match &self.kind {
            NodeKind::Mesh(mesh) => mesh.geometry.triangle_count(),
            _ => 0,
        };
        own + self
            .children
            .iter()
            .map(Fragment::triangle_count)
            .sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::MeshData;
    use crate::material::{Material, Mesh, StandardMaterial};

    #[test]
    fn counts_walk_the_tree() {
        let mesh = Mesh::new(
            MeshData::sphere(1.0, 4, 2),
            Material::Standard(StandardMaterial::default()),
        );
        let tris = mesh.geometry.triangle_count();
        let frag = Fragment::group("root")
            .with_child(Fragment::group("a").with_kind(NodeKind::Mesh(mesh.clone())))
            .with_child(
                Fragment::group("b").with_child(Fragment::group("c").with_kind(NodeKind::Mesh(mesh))),
            );
        assert_eq!(frag.node_count(), 4);
        assert_eq!(frag.mesh_count(), 2);
        assert_eq!(frag.triangle_count(), 2 * tris);
    }
}
