//! Hierarchical scene organization.
//!
//! The scene is a tree of owned [`Node`]s. Every node carries a local
//! [`Transform`]; a node that should be drawn also carries a [`Surface`]
//! pairing shared geometry with a shared material. Group nodes (no surface)
//! exist purely to move their subtree together, like the ceiling fan pivot.
//!
//! Nodes hold no GPU state. The renderer walks the tree each frame, collects
//! [`DrawItem`]s and batches them by shared mesh and material.

use std::sync::Arc;

use crate::data_structures::{
    material::Material,
    mesh::MeshData,
    transform::{Transform, TransformRaw},
};

/// Shared geometry plus shared appearance. Cloning a surface clones two
/// `Arc`s, so sibling nodes (the six fan blades) reference identical data.
#[derive(Clone, Debug)]
pub struct Surface {
    pub geometry: Arc<MeshData>,
    pub material: Arc<Material>,
}

pub struct Node {
    pub name: String,
    pub local: Transform,
    /// Composed parent-to-root transform, refreshed by
    /// [`update_world_transforms`](Node::update_world_transforms).
    pub world: Transform,
    pub surface: Option<Surface>,
    pub children: Vec<Node>,
}

impl Node {
    /// An empty grouping node at the identity transform.
    pub fn group(name: &str) -> Self {
        Self {
            name: name.to_string(),
            local: Transform::new(),
            world: Transform::new(),
            surface: None,
            children: Vec::new(),
        }
    }

    /// A drawable node.
    pub fn mesh(name: &str, geometry: Arc<MeshData>, material: Arc<Material>) -> Self {
        Self {
            name: name.to_string(),
            local: Transform::new(),
            world: Transform::new(),
            surface: Some(Surface { geometry, material }),
            children: Vec::new(),
        }
    }

    pub fn with_transform(mut self, local: Transform) -> Self {
        self.local = local;
        self
    }

    /// Append a child and return its index. The tree is append-only; nothing
    /// removes nodes once assembled.
    pub fn add_child(&mut self, child: Node) -> usize {
        self.children.push(child);
        self.children.len() - 1
    }

    /// Nodes in this subtree, self included.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(Node::node_count).sum::<usize>()
    }

    /// Recompute the world transform of this subtree from `parent_world`.
    pub fn update_world_transforms(&mut self, parent_world: &Transform) {
        self.world = parent_world * &self.local;
        for child in &mut self.children {
            child.update_world_transforms(&self.world);
        }
    }

    /// Collect one [`DrawItem`] per drawable node, depth-first.
    pub fn collect_draws(&self, out: &mut Vec<DrawItem>) {
        if let Some(surface) = &self.surface {
            out.push(DrawItem {
                geometry: Arc::clone(&surface.geometry),
                material: Arc::clone(&surface.material),
                transform: self.world.to_raw(),
            });
        }
        for child in &self.children {
            child.collect_draws(out);
        }
    }
}

/// One drawable: resolved world transform plus the shared mesh and material.
pub struct DrawItem {
    pub geometry: Arc<MeshData>,
    pub material: Arc<Material>,
    pub transform: TransformRaw,
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Vector3;

    fn quad() -> Arc<MeshData> {
        Arc::new(crate::geometry::plane(1.0, 1.0))
    }

    fn grey() -> Arc<Material> {
        Arc::new(Material::color("grey", 0xc9c9c9))
    }

    #[test]
    fn group_has_no_draws() {
        let mut group = Node::group("empty");
        group.update_world_transforms(&Transform::new());
        let mut draws = Vec::new();
        group.collect_draws(&mut draws);
        assert!(draws.is_empty());
        assert_eq!(group.node_count(), 1);
    }

    #[test]
    fn world_transform_composes_down_the_tree() {
        let mut root = Node::group("root").with_transform(Transform::at(3.0, 10.0, 4.0));
        root.add_child(Node::mesh("leaf", quad(), grey()).with_transform(Transform::at(0.0, 2.0, 0.0)));
        root.update_world_transforms(&Transform::new());
        assert_eq!(
            root.children[0].world.position,
            Vector3::new(3.0, 12.0, 4.0)
        );
    }

    #[test]
    fn siblings_share_geometry_and_material() {
        let mesh = quad();
        let mat = grey();
        let mut parent = Node::group("parent");
        for i in 0..6 {
            parent.add_child(Node::mesh(
                &format!("blade{i}"),
                Arc::clone(&mesh),
                Arc::clone(&mat),
            ));
        }
        let mut draws = Vec::new();
        parent.update_world_transforms(&Transform::new());
        parent.collect_draws(&mut draws);
        assert_eq!(draws.len(), 6);
        for draw in &draws[1..] {
            assert!(Arc::ptr_eq(&draw.geometry, &draws[0].geometry));
            assert!(Arc::ptr_eq(&draw.material, &draws[0].material));
        }
    }

    #[test]
    fn node_count_includes_whole_subtree() {
        let mut root = Node::group("root");
        let mut sub = Node::group("sub");
        sub.add_child(Node::mesh("a", quad(), grey()));
        sub.add_child(Node::mesh("b", quad(), grey()));
        root.add_child(sub);
        assert_eq!(root.node_count(), 4);
    }
}
