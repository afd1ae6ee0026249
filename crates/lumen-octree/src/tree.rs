//! Octree construction and statistics.

use std::time::Instant;

use glam::Vec3;
use lumen_cloud::PointCloud;
use lumen_config::OctreeConfig;
use tracing::{debug, warn};

use crate::node::{NodeContents, NodeId, OctreeNode};

/// Octree over a borrowed point cloud.
///
/// The borrow keeps the cloud immutable for as long as the tree exists, so
/// a tree can never observe a cloud that changed after `build()`. Once
/// built, `&Octree` is `Sync` and queries may run from many threads.
#[derive(Clone, Debug)]
pub struct Octree<'a> {
    cloud: &'a PointCloud,
    config: OctreeConfig,
    nodes: Vec<OctreeNode>,
}

/// Whole-tree counts, computed by a full walk.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OctreeStats {
    /// Depth of the deepest node (root is 0).
    pub max_depth: u32,
    /// Total number of nodes, leaves and branches.
    pub node_count: usize,
    /// Number of leaf nodes.
    pub leaf_count: usize,
}

impl<'a> Octree<'a> {
    /// Deepest level a tree may reach. Halving an f32 box further stops
    /// producing distinct split centers.
    pub const MAX_DEPTH_LIMIT: u32 = 21;

    /// An unbuilt tree over `cloud` with the default policy
    /// (100 points per leaf, depth limit 10).
    pub fn new(cloud: &'a PointCloud) -> Self {
        Self::with_config(cloud, OctreeConfig::default())
    }

    /// An unbuilt tree over `cloud` with a custom subdivision policy.
    ///
    /// `max_depth` is clamped to [`Self::MAX_DEPTH_LIMIT`] and a leaf
    /// capacity of zero is raised to one; [`Octree::config`] reports the
    /// policy actually used.
    pub fn with_config(cloud: &'a PointCloud, config: OctreeConfig) -> Self {
        let effective = OctreeConfig {
            max_points_per_leaf: config.max_points_per_leaf.max(1),
            max_depth: config.max_depth.min(Self::MAX_DEPTH_LIMIT),
        };
        if effective != config {
            warn!(
                requested_leaf = config.max_points_per_leaf,
                requested_depth = config.max_depth,
                leaf = effective.max_points_per_leaf,
                depth = effective.max_depth,
                "octree policy clamped"
            );
        }
        Self {
            cloud,
            config: effective,
            nodes: Vec::new(),
        }
    }

    /// Partition the cloud. Any previous partition is discarded.
    ///
    /// An empty cloud leaves the tree without a root, and every query
    /// then returns nothing.
    pub fn build(&mut self) {
        self.nodes.clear();
        let Some(bounds) = self.cloud.bounds() else {
            debug!("empty cloud, octree left without root");
            return;
        };

        let start = Instant::now();
        self.nodes.push(OctreeNode::leaf(bounds, 0));
        let cloud = self.cloud;
        for (index, point) in cloud.iter().enumerate() {
            self.insert(NodeId::ROOT, index, point.position);
        }

        debug!(
            points = cloud.len(),
            nodes = self.nodes.len(),
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "octree built"
        );
    }

    /// Route one index down from `id` and store it in the leaf it lands in.
    fn insert(&mut self, mut id: NodeId, index: usize, position: Vec3) {
        let OctreeConfig {
            max_points_per_leaf,
            max_depth,
        } = self.config;

        loop {
            let node = &mut self.nodes[id.0];
            let overflow = match &mut node.contents {
                NodeContents::Branch { children } => {
                    id = children[node.bounds.octant_of(position)];
                    continue;
                }
                NodeContents::Leaf { indices } => {
                    indices.push(index);
                    if indices.len() <= max_points_per_leaf || node.depth >= max_depth {
                        return;
                    }
                    std::mem::take(indices)
                }
            };
            self.subdivide(id, overflow);
            return;
        }
    }

    /// Turn leaf `id` into a branch and redistribute its former contents.
    fn subdivide(&mut self, id: NodeId, indices: Vec<usize>) {
        let node = &self.nodes[id.0];
        let bounds = node.bounds;
        let depth = node.depth + 1;

        let first = self.nodes.len();
        let children: [NodeId; 8] = std::array::from_fn(|code| NodeId(first + code));
        self.nodes
            .extend((0..8).map(|code| OctreeNode::leaf(bounds.octant(code), depth)));
        self.nodes[id.0].contents = NodeContents::Branch { children };

        let cloud = self.cloud;
        for index in indices {
            let position = cloud[index].position;
            self.insert(children[bounds.octant_of(position)], index, position);
        }
    }

    // --- Accessors ---

    /// The cloud this tree indexes.
    pub fn cloud(&self) -> &'a PointCloud {
        self.cloud
    }

    /// The subdivision policy.
    pub fn config(&self) -> OctreeConfig {
        self.config
    }

    /// Returns true once `build()` produced a root.
    pub fn is_built(&self) -> bool {
        !self.nodes.is_empty()
    }

    /// The root node, if built over a non-empty cloud.
    pub fn root(&self) -> Option<&OctreeNode> {
        self.nodes.first()
    }

    /// The node with the given id.
    ///
    /// # Panics
    ///
    /// Panics if `id` did not come from this tree's current build.
    pub fn node(&self, id: NodeId) -> &OctreeNode {
        &self.nodes[id.0]
    }

    /// All nodes in arena order (root first).
    pub fn nodes(&self) -> &[OctreeNode] {
        &self.nodes
    }

    /// Every cloud index stored in the subtree under `id`, in depth-first order.
    pub fn collect_indices(&self, id: NodeId) -> Vec<usize> {
        let mut out = Vec::new();
        self.for_each_leaf(id, &mut |indices| out.extend_from_slice(indices));
        out
    }

    /// Visit the index slice of every leaf under `id`, depth-first.
    pub(crate) fn for_each_leaf(&self, id: NodeId, f: &mut impl FnMut(&[usize])) {
        match &self.nodes[id.0].contents {
            NodeContents::Leaf { indices } => f(indices),
            NodeContents::Branch { children } => {
                for &child in children {
                    self.for_each_leaf(child, f);
                }
            }
        }
    }

    // --- Statistics ---

    /// Walk the whole tree and count nodes, leaves and depth.
    pub fn stats(&self) -> OctreeStats {
        let mut stats = OctreeStats::default();
        if self.is_built() {
            self.count_nodes(NodeId::ROOT, &mut stats);
        }
        stats
    }

    fn count_nodes(&self, id: NodeId, stats: &mut OctreeStats) {
        let node = &self.nodes[id.0];
        stats.node_count += 1;
        stats.max_depth = stats.max_depth.max(node.depth);
        match &node.contents {
            NodeContents::Leaf { .. } => stats.leaf_count += 1,
            NodeContents::Branch { children } => {
                for &child in children {
                    self.count_nodes(child, stats);
                }
            }
        }
    }

    /// Depth of the deepest node (0 for a single leaf or an unbuilt tree).
    pub fn max_depth(&self) -> u32 {
        self.stats().max_depth
    }

    /// Total node count.
    pub fn node_count(&self) -> usize {
        self.stats().node_count
    }

    /// Leaf count.
    pub fn leaf_count(&self) -> usize {
        self.stats().leaf_count
    }
}
