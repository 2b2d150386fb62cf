//! Arena of render objects.
//!
//! Tiles refer to their plane and label nodes by [`NodeId`] instead of holding the objects
//! themselves, so replacing the item list only has to clear the tree.

use lyon::geom::euclid::default::Transform3D;
use lyon::geom::euclid::Angle;

use crate::id::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneNodeKind {
    Root,
    /// Image plane of the tile at this sequence index.
    Plane { tile: usize },
    /// Caption of the tile at this sequence index.
    Label { tile: usize },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneNode {
    pub kind: SceneNodeKind,
    /// Position relative to the parent node.
    pub position: [f32; 3],
    pub rotation_z: f32,
    /// Size of the unit quad in world units. Not inherited by children.
    pub scale: [f32; 2],
    pub visible: bool,
}

impl SceneNode {
    pub fn new(kind: SceneNodeKind) -> Self {
        Self {
            kind,
            position: [0.0; 3],
            rotation_z: 0.0,
            scale: [1.0, 1.0],
            visible: true,
        }
    }

    fn placement(&self) -> Transform3D<f32> {
        let [x, y, z] = self.position;
        Transform3D::rotation(0.0, 0.0, 1.0, Angle::radians(self.rotation_z))
            .then(&Transform3D::translation(x, y, z))
    }
}

pub struct SceneGraph {
    tree: easy_tree::Tree<SceneNode>,
    root: NodeId,
}

impl SceneGraph {
    pub fn new() -> Self {
        let mut tree = easy_tree::Tree::new();
        let root = NodeId(tree.add_node(SceneNode::new(SceneNodeKind::Root)));
        Self { tree, root }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn add(&mut self, parent: NodeId, node: SceneNode) -> NodeId {
        NodeId(self.tree.add_child(parent.0, node))
    }

    pub fn get(&self, id: NodeId) -> Option<&SceneNode> {
        self.tree.get(id.0)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.tree.get_mut(id.0)
    }

    pub fn children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.tree.children(id.0).iter().map(|&child| NodeId(child))
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.tree.parent_index_unchecked(id.0).map(NodeId)
    }

    /// Number of nodes, the root included.
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.len() <= 1
    }

    /// Drops every node except a fresh root.
    pub fn clear(&mut self) {
        self.tree.clear();
        self.root = NodeId(self.tree.add_node(SceneNode::new(SceneNodeKind::Root)));
    }

    /// Model matrix of a node: its own scale, followed by its own and every ancestor's
    /// rotation and translation.
    pub fn world_matrix(&self, id: NodeId) -> Option<Transform3D<f32>> {
        let node = self.get(id)?;
        let [width, height] = node.scale;
        let mut matrix = Transform3D::scale(width, height, 1.0).then(&node.placement());

        let mut current = id;
        while let Some(parent) = self.parent(current) {
            let parent_node = self.get(parent)?;
            matrix = matrix.then(&parent_node.placement());
            current = parent;
        }

        Some(matrix)
    }

    /// A node is drawn only when it and all of its ancestors are visible.
    pub fn is_visible(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node_id) = current {
            match self.get(node_id) {
                Some(node) if node.visible => current = self.parent(node_id),
                _ => return false,
            }
        }
        true
    }
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}
