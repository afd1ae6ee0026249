use glam::Vec3;
use lumen_math::Aabb;

/// Index of a node in the octree arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// The root node of a built tree.
    pub const ROOT: NodeId = NodeId(0);

    /// Position of the node in [`crate::Octree::nodes`].
    pub fn index(self) -> usize {
        self.0
    }
}

/// What a node holds: point indices, or exactly eight children.
///
/// A node starts as a leaf and turns into a branch at most once.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeContents {
    /// Terminal partition holding indices into the cloud (possibly empty).
    Leaf {
        /// Cloud indices routed into this leaf, in insertion order.
        indices: Vec<usize>,
    },
    /// Internal node. `children[code]` covers the octant with that 3-bit code
    /// (bit 0 = +x half, bit 1 = +y half, bit 2 = +z half).
    Branch {
        /// The eight child nodes, ordered by octant code.
        children: [NodeId; 8],
    },
}

/// One axis-aligned partition of the octree.
#[derive(Clone, Debug)]
pub struct OctreeNode {
    pub(crate) bounds: Aabb,
    pub(crate) depth: u32,
    pub(crate) contents: NodeContents,
}

impl OctreeNode {
    pub(crate) fn leaf(bounds: Aabb, depth: u32) -> Self {
        Self {
            bounds,
            depth,
            contents: NodeContents::Leaf {
                indices: Vec::new(),
            },
        }
    }

    /// Returns true if this node holds points rather than children.
    pub fn is_leaf(&self) -> bool {
        matches!(self.contents, NodeContents::Leaf { .. })
    }

    /// Depth below the root (root is 0).
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// The box this node covers.
    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    /// Minimum corner of the node box.
    pub fn min_bound(&self) -> Vec3 {
        self.bounds.min
    }

    /// Maximum corner of the node box.
    pub fn max_bound(&self) -> Vec3 {
        self.bounds.max
    }

    /// Center of the node box; the split point for its children.
    pub fn center(&self) -> Vec3 {
        self.bounds.center()
    }

    /// Leaf contents. Always empty for a branch.
    pub fn point_indices(&self) -> &[usize] {
        match &self.contents {
            NodeContents::Leaf { indices } => indices,
            NodeContents::Branch { .. } => &[],
        }
    }

    /// Number of indices held directly by this node.
    pub fn point_count(&self) -> usize {
        self.point_indices().len()
    }

    /// The eight children of a branch, `None` for a leaf.
    pub fn children(&self) -> Option<&[NodeId; 8]> {
        match &self.contents {
            NodeContents::Branch { children } => Some(children),
            NodeContents::Leaf { .. } => None,
        }
    }

    /// The child covering octant `code`, `None` for a leaf.
    pub fn child(&self, code: usize) -> Option<NodeId> {
        self.children().and_then(|c| c.get(code).copied())
    }

    /// Raw contents.
    pub fn contents(&self) -> &NodeContents {
        &self.contents
    }
}
