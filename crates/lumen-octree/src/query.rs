//! Read-only traversals over a built octree.
//!
//! Every query prunes whole nodes with a cheap conservative test and then
//! tests the points of surviving leaves exactly. Results are cloud indices
//! without duplicates, in depth-first traversal order.

use glam::Vec3;
use lumen_config::LodConfig;
use lumen_math::{Aabb, Frustum};

use crate::node::{NodeContents, NodeId};
use crate::tree::Octree;

impl Octree<'_> {
    /// Indices of all points inside the six frustum planes.
    ///
    /// Nodes are rejected with the single p-vertex test per plane; points in
    /// surviving leaves are tested against all six planes.
    pub fn query_frustum(&self, frustum: &Frustum) -> Vec<usize> {
        let mut results = Vec::new();
        if self.is_built() {
            self.frustum_recursive(NodeId::ROOT, frustum, &mut results);
        }
        results
    }

    fn frustum_recursive(&self, id: NodeId, frustum: &Frustum, results: &mut Vec<usize>) {
        let node = self.node(id);
        if !frustum.intersects_aabb(&node.bounds) {
            return;
        }

        match &node.contents {
            NodeContents::Leaf { indices } => {
                let cloud = self.cloud();
                results.extend(
                    indices
                        .iter()
                        .copied()
                        .filter(|&i| frustum.contains_point(cloud[i].position)),
                );
            }
            NodeContents::Branch { children } => {
                for &child in children {
                    self.frustum_recursive(child, frustum, results);
                }
            }
        }
    }

    /// Indices of all points within `radius` of `center` (boundary included).
    pub fn query_radius(&self, center: Vec3, radius: f32) -> Vec<usize> {
        let mut results = Vec::new();
        if self.is_built() {
            self.radius_recursive(NodeId::ROOT, center, radius * radius, &mut results);
        }
        results
    }

    fn radius_recursive(&self, id: NodeId, center: Vec3, radius_sq: f32, results: &mut Vec<usize>) {
        let node = self.node(id);
        if node.bounds.distance_squared_to_point(center) > radius_sq {
            return;
        }

        match &node.contents {
            NodeContents::Leaf { indices } => {
                let cloud = self.cloud();
                results.extend(
                    indices
                        .iter()
                        .copied()
                        .filter(|&i| cloud[i].position.distance_squared(center) <= radius_sq),
                );
            }
            NodeContents::Branch { children } => {
                for &child in children {
                    self.radius_recursive(child, center, radius_sq, results);
                }
            }
        }
    }

    /// Indices of all points componentwise within `[min_bound, max_bound]`.
    pub fn query_box(&self, min_bound: Vec3, max_bound: Vec3) -> Vec<usize> {
        let mut results = Vec::new();
        if self.is_built() {
            // Kept unsorted: an inverted range matches nothing.
            let range = Aabb {
                min: min_bound,
                max: max_bound,
            };
            self.box_recursive(NodeId::ROOT, &range, &mut results);
        }
        results
    }

    fn box_recursive(&self, id: NodeId, range: &Aabb, results: &mut Vec<usize>) {
        let node = self.node(id);
        if !node.bounds.intersects(range) {
            return;
        }

        match &node.contents {
            NodeContents::Leaf { indices } => {
                let cloud = self.cloud();
                results.extend(
                    indices
                        .iter()
                        .copied()
                        .filter(|&i| range.contains_point(cloud[i].position)),
                );
            }
            NodeContents::Branch { children } => {
                for &child in children {
                    self.box_recursive(child, range, results);
                }
            }
        }
    }

    /// Frustum-culled indices, decimated with distance from `view_position`.
    ///
    /// Uses the default LOD cutoffs with the given `base_distance`.
    pub fn query_lod(
        &self,
        view_position: Vec3,
        frustum: &Frustum,
        base_distance: f32,
    ) -> Vec<usize> {
        let policy = LodConfig {
            base_distance,
            ..LodConfig::default()
        };
        self.query_lod_with(view_position, frustum, &policy)
    }

    /// Frustum-culled indices, decimated with distance from `view_position`.
    ///
    /// A surviving node is "far" when `diagonal / distance` drops below
    /// `policy.detail_ratio_cutoff` or its depth reaches `policy.depth_cutoff`.
    /// Far nodes are not descended: every `stride`-th index stored beneath
    /// them is emitted, with `stride = max(1, floor(distance / base_distance))`.
    /// Near leaves emit all their indices.
    ///
    /// Unlike [`Octree::query_frustum`], emitted points are not tested
    /// individually against the planes.
    ///
    /// A far node costs time proportional to the number of leaves beneath
    /// it plus the number of samples emitted; skipped indices are never
    /// touched.
    pub fn query_lod_with(
        &self,
        view_position: Vec3,
        frustum: &Frustum,
        policy: &LodConfig,
    ) -> Vec<usize> {
        let mut results = Vec::new();
        if self.is_built() {
            self.lod_recursive(NodeId::ROOT, view_position, frustum, policy, &mut results);
        }
        results
    }

    fn lod_recursive(
        &self,
        id: NodeId,
        view_position: Vec3,
        frustum: &Frustum,
        policy: &LodConfig,
        results: &mut Vec<usize>,
    ) {
        let node = self.node(id);
        if !frustum.intersects_aabb(&node.bounds) {
            return;
        }

        let distance = view_position.distance(node.center());
        let detail_ratio = node.bounds.diagonal_length() / distance;

        if detail_ratio < policy.detail_ratio_cutoff || node.depth >= policy.depth_cutoff {
            // Saturating cast: NaN maps to 0, infinity to usize::MAX.
            let stride = ((distance / policy.base_distance).floor() as usize).max(1);
            // Positions still to skip before the next sample, carried across leaves.
            let mut skip = 0usize;
            self.for_each_leaf(id, &mut |indices| {
                let len = indices.len();
                if skip >= len {
                    skip -= len;
                    return;
                }
                results.extend(indices[skip..].iter().step_by(stride).copied());
                let last = skip + (len - 1 - skip) / stride * stride;
                skip = stride - (len - last);
            });
            return;
        }

        match &node.contents {
            NodeContents::Leaf { indices } => results.extend_from_slice(indices),
            NodeContents::Branch { children } => {
                for &child in children {
                    self.lod_recursive(child, view_position, frustum, policy, results);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec4;
    use lumen_cloud::PointCloud;
    use lumen_config::OctreeConfig;

    use super::*;

    fn grid_cloud() -> PointCloud {
        let mut cloud = PointCloud::with_capacity(1000);
        for x in 0..10 {
            for y in 0..10 {
                for z in 0..10 {
                    cloud.add_point(Vec3::new(x as f32, y as f32, z as f32));
                }
            }
        }
        cloud
    }

    /// Axis-aligned slab: |x| <= 5, |y| <= 5, -1 <= z <= 20.
    fn slab_frustum() -> Frustum {
        Frustum::new([
            Vec4::new(0.0, 0.0, 1.0, 1.0),
            Vec4::new(0.0, 0.0, -1.0, 20.0),
            Vec4::new(1.0, 0.0, 0.0, 5.0),
            Vec4::new(-1.0, 0.0, 0.0, 5.0),
            Vec4::new(0.0, 1.0, 0.0, 5.0),
            Vec4::new(0.0, -1.0, 0.0, 5.0),
        ])
    }

    /// Planes that accept everything.
    fn open_frustum() -> Frustum {
        Frustum::new([Vec4::new(0.0, 0.0, 0.0, 1.0); 6])
    }

    #[test]
    fn test_box_query_on_grid_returns_125() {
        let cloud = grid_cloud();
        let mut octree = Octree::new(&cloud);
        octree.build();
        let results = octree.query_box(Vec3::splat(3.0), Vec3::splat(7.0));
        assert_eq!(results.len(), 125);
        for &i in &results {
            let p = cloud[i].position;
            assert!(p.cmpge(Vec3::splat(3.0)).all() && p.cmple(Vec3::splat(7.0)).all());
        }
    }

    #[test]
    fn test_inverted_box_matches_nothing() {
        let cloud = grid_cloud();
        let mut octree = Octree::new(&cloud);
        octree.build();
        assert!(octree.query_box(Vec3::splat(7.0), Vec3::splat(3.0)).is_empty());
    }

    #[test]
    fn test_frustum_query_on_grid() {
        let cloud = grid_cloud();
        let mut octree = Octree::new(&cloud);
        octree.build();
        let results = octree.query_frustum(&slab_frustum());
        // x and y in 0..=5, any z.
        assert_eq!(results.len(), 6 * 6 * 10);
        assert!(results.len() < cloud.len());
    }

    #[test]
    fn test_radius_query_includes_boundary() {
        let cloud = grid_cloud();
        let mut octree = Octree::new(&cloud);
        octree.build();
        let results = octree.query_radius(Vec3::splat(5.0), 1.0);
        // Center plus its six axis neighbours at distance exactly 1.
        assert_eq!(results.len(), 7);
    }

    #[test]
    fn test_radius_query_outside_cloud_is_empty() {
        let cloud = grid_cloud();
        let mut octree = Octree::new(&cloud);
        octree.build();
        assert!(octree.query_radius(Vec3::splat(100.0), 5.0).is_empty());
    }

    #[test]
    fn test_unbuilt_tree_returns_nothing() {
        let cloud = grid_cloud();
        let octree = Octree::new(&cloud);
        assert!(octree.query_frustum(&open_frustum()).is_empty());
        assert!(octree.query_radius(Vec3::ZERO, 100.0).is_empty());
        assert!(octree.query_box(Vec3::splat(-100.0), Vec3::splat(100.0)).is_empty());
        assert!(octree.query_lod(Vec3::ZERO, &open_frustum(), 10.0).is_empty());
    }

    #[test]
    fn test_empty_cloud_frustum_query_is_empty() {
        let cloud = PointCloud::new();
        let mut octree = Octree::new(&cloud);
        octree.build();
        assert!(octree.query_frustum(&Frustum::new([Vec4::ZERO; 6])).is_empty());
    }

    #[test]
    fn test_lod_near_view_returns_everything() {
        // Root-level leaf seen from close by: full detail.
        let mut cloud = PointCloud::new();
        for i in 0..50 {
            cloud.add_point(Vec3::new(i as f32 * 0.1, 0.0, 0.0));
        }
        let mut octree = Octree::new(&cloud);
        octree.build();
        let results = octree.query_lod(Vec3::new(2.5, 1.0, 0.0), &open_frustum(), 10.0);
        assert_eq!(results, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn test_lod_far_view_decimates_by_stride() {
        // One leaf of 50 points, 1 unit across, viewed from 1000 units away:
        // ratio ~0.001 < 0.01, stride = floor(1000 / 10) = 100 -> one point.
        let mut cloud = PointCloud::new();
        for i in 0..50 {
            cloud.add_point(Vec3::new(i as f32 * 0.02, 0.0, 0.0));
        }
        let mut octree = Octree::new(&cloud);
        octree.build();
        let view = Vec3::new(0.5, 0.0, 1000.0);
        assert_eq!(octree.query_lod(view, &open_frustum(), 10.0), vec![0]);

        // Same view with a larger base distance: stride 10 -> every 10th point.
        let results = octree.query_lod(view, &open_frustum(), 100.0);
        assert_eq!(results, vec![0, 10, 20, 30, 40]);
    }

    #[test]
    fn test_lod_depth_cutoff_samples_whole_subtree() {
        let cloud = grid_cloud();
        let config = OctreeConfig {
            max_points_per_leaf: 1,
            max_depth: 10,
        };
        let mut octree = Octree::with_config(&cloud, config);
        octree.build();
        assert!(octree.max_depth() > 1);

        // Depth cutoff 0 makes the root "far"; stride 1 keeps every point.
        let policy = LodConfig {
            detail_ratio_cutoff: 0.0,
            depth_cutoff: 0,
            base_distance: 1000.0,
        };
        let mut results = octree.query_lod_with(Vec3::splat(4.5), &open_frustum(), &policy);
        results.sort_unstable();
        assert_eq!(results, (0..cloud.len()).collect::<Vec<_>>());
    }

    #[test]
    fn test_lod_far_subtree_stride_runs_across_leaves() {
        let cloud = grid_cloud();
        let config = OctreeConfig {
            max_points_per_leaf: 7,
            max_depth: 10,
        };
        let mut octree = Octree::with_config(&cloud, config);
        octree.build();
        let subtree = octree.collect_indices(NodeId::ROOT);

        // Exactly 70 units from the root center.
        let view = Vec3::new(4.5, 4.5, 74.5);
        for (base_distance, stride) in [(10.0, 7), (1.0, 70), (70.0, 1)] {
            let policy = LodConfig {
                detail_ratio_cutoff: 0.0,
                depth_cutoff: 0,
                base_distance,
            };
            let expected: Vec<usize> = subtree.iter().copied().step_by(stride).collect();
            assert_eq!(octree.query_lod_with(view, &open_frustum(), &policy), expected);
        }

        // Infinite stride keeps only the first index of the subtree.
        let policy = LodConfig {
            detail_ratio_cutoff: 0.0,
            depth_cutoff: 0,
            base_distance: 0.0,
        };
        assert_eq!(
            octree.query_lod_with(view, &open_frustum(), &policy),
            vec![subtree[0]]
        );
    }

    #[test]
    fn test_lod_respects_frustum() {
        let cloud = grid_cloud();
        let mut octree = Octree::new(&cloud);
        octree.build();
        let culled = Frustum::new([Vec4::new(1.0, 0.0, 0.0, -100.0); 6]); // x >= 100
        assert!(octree.query_lod(Vec3::ZERO, &culled, 10.0).is_empty());
    }

    #[test]
    fn test_results_have_no_duplicates() {
        let cloud = grid_cloud();
        let mut octree = Octree::new(&cloud);
        octree.build();
        let mut results = octree.query_lod(Vec3::new(4.5, 4.5, -30.0), &slab_frustum(), 1.0);
        let len = results.len();
        results.sort_unstable();
        results.dedup();
        assert_eq!(results.len(), len);
    }
}
