//! Octree spatial index over a borrowed [`PointCloud`].
//!
//! The tree is built once from the cloud and then answers read-only
//! visibility and proximity queries: frustum culling, radius search,
//! box search, and distance-based LOD sampling. Every query returns
//! indices into the original cloud.
//!
//! Nodes live in one flat arena with the root at index 0; internal nodes
//! reference their eight children by [`NodeId`]. The tree is never updated
//! incrementally. Rebuild after any change to the cloud.
//!
//! [`PointCloud`]: lumen_cloud::PointCloud

mod node;
mod query;
mod tree;

pub use lumen_config::{LodConfig, OctreeConfig};
pub use node::{NodeContents, NodeId, OctreeNode};
pub use tree::{Octree, OctreeStats};
