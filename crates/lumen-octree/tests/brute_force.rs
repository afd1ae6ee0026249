//! Query results cross-checked against linear scans over seeded random clouds.

use glam::{Mat4, Vec3, Vec4};
use lumen_cloud::PointCloud;
use lumen_math::Frustum;
use lumen_octree::{NodeId, Octree, OctreeConfig};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

fn random_cloud(seed: u64, n: usize, extent: f32) -> PointCloud {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut cloud = PointCloud::with_capacity(n);
    for _ in 0..n {
        cloud.add_point(Vec3::new(
            rng.random_range(-extent..extent),
            rng.random_range(-extent..extent),
            rng.random_range(-extent..extent),
        ));
    }
    cloud
}

fn sorted(mut v: Vec<usize>) -> Vec<usize> {
    v.sort_unstable();
    v
}

fn assert_unique(v: &[usize]) {
    let mut s = v.to_vec();
    s.sort_unstable();
    s.dedup();
    assert_eq!(s.len(), v.len(), "query returned duplicate indices");
}

fn camera_frustum(eye: Vec3) -> Frustum {
    let view = Mat4::look_at_rh(eye, Vec3::ZERO, Vec3::Y);
    let proj = Mat4::perspective_rh_gl(45f32.to_radians(), 16.0 / 9.0, 0.1, 100.0);
    Frustum::from_view_projection(&(proj * view))
}

#[test]
fn test_box_query_matches_linear_scan() {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    for seed in 0..5 {
        let cloud = random_cloud(seed, 5000, 10.0);
        let mut octree = Octree::new(&cloud);
        octree.build();

        for _ in 0..20 {
            let a = Vec3::new(
                rng.random_range(-12.0..12.0),
                rng.random_range(-12.0..12.0),
                rng.random_range(-12.0..12.0),
            );
            let b = Vec3::new(
                rng.random_range(-12.0..12.0),
                rng.random_range(-12.0..12.0),
                rng.random_range(-12.0..12.0),
            );
            let (min, max) = (a.min(b), a.max(b));
            let results = octree.query_box(min, max);
            assert_unique(&results);

            let expected: Vec<usize> = (0..cloud.len())
                .filter(|&i| {
                    let p = cloud[i].position;
                    p.cmpge(min).all() && p.cmple(max).all()
                })
                .collect();
            assert_eq!(sorted(results), expected);
        }
    }
}

#[test]
fn test_radius_query_matches_linear_scan() {
    let mut rng = ChaCha8Rng::seed_from_u64(11);
    for seed in 0..5 {
        let cloud = random_cloud(100 + seed, 5000, 10.0);
        let mut octree = Octree::new(&cloud);
        octree.build();

        for _ in 0..20 {
            let center = Vec3::new(
                rng.random_range(-10.0..10.0),
                rng.random_range(-10.0..10.0),
                rng.random_range(-10.0..10.0),
            );
            let radius: f32 = rng.random_range(0.0..6.0);
            let results = octree.query_radius(center, radius);
            assert_unique(&results);

            let r2 = radius * radius;
            let expected: Vec<usize> = (0..cloud.len())
                .filter(|&i| cloud[i].position.distance_squared(center) <= r2)
                .collect();
            assert_eq!(sorted(results), expected);
        }
    }
}

#[test]
fn test_frustum_query_matches_linear_scan() {
    let cloud = random_cloud(3, 20_000, 20.0);
    let mut octree = Octree::new(&cloud);
    octree.build();

    for eye in [
        Vec3::new(0.0, 5.0, 10.0),
        Vec3::new(30.0, 0.0, 0.0),
        Vec3::new(-5.0, -25.0, 3.0),
        Vec3::new(1.0, 1.0, 1.0),
    ] {
        let frustum = camera_frustum(eye);
        let results = octree.query_frustum(&frustum);
        assert_unique(&results);
        for &i in &results {
            assert!(frustum.contains_point(cloud[i].position));
        }

        let expected: Vec<usize> = (0..cloud.len())
            .filter(|&i| frustum.contains_point(cloud[i].position))
            .collect();
        assert!(!expected.is_empty());
        assert_eq!(sorted(results), expected);
    }
}

#[test]
fn test_frustum_query_with_raw_planes() {
    let cloud = random_cloud(5, 3000, 10.0);
    let mut octree = Octree::new(&cloud);
    octree.build();

    // Oblique, unnormalized planes.
    let frustum = Frustum::new([
        Vec4::new(1.0, 1.0, 0.0, 4.0),
        Vec4::new(-2.0, 1.0, 0.0, 10.0),
        Vec4::new(0.0, 0.0, 3.0, 6.0),
        Vec4::new(0.0, -1.0, -1.0, 8.0),
        Vec4::new(0.5, 0.0, -1.0, 9.0),
        Vec4::new(0.0, 1.0, 0.0, 9.0),
    ]);
    let expected: Vec<usize> = (0..cloud.len())
        .filter(|&i| frustum.contains_point(cloud[i].position))
        .collect();
    assert_eq!(sorted(octree.query_frustum(&frustum)), expected);
}

#[test]
fn test_lod_results_are_visible_subset() {
    let cloud = random_cloud(9, 20_000, 20.0);
    let mut octree = Octree::new(&cloud);
    octree.build();

    let eye = Vec3::new(0.0, 5.0, 40.0);
    let frustum = camera_frustum(eye);
    let lod = octree.query_lod(eye, &frustum, 10.0);
    assert_unique(&lod);
    assert!(!lod.is_empty());

    // LOD never returns more than the full frustum-culled node contents.
    let mut full = octree.query_lod(eye, &frustum, f32::INFINITY);
    full.sort_unstable();
    for i in &lod {
        assert!(full.binary_search(i).is_ok());
    }
    assert!(lod.len() <= full.len());
}

#[test]
fn test_rebuild_gives_same_result_sets() {
    let cloud = random_cloud(21, 8000, 15.0);
    let frustum = camera_frustum(Vec3::new(0.0, 5.0, 30.0));

    let mut first = Octree::new(&cloud);
    first.build();
    let mut second = Octree::new(&cloud);
    second.build();
    second.build();

    assert_eq!(
        sorted(first.query_frustum(&frustum)),
        sorted(second.query_frustum(&frustum))
    );
    assert_eq!(
        sorted(first.query_radius(Vec3::ONE, 4.0)),
        sorted(second.query_radius(Vec3::ONE, 4.0))
    );
    assert_eq!(
        sorted(first.query_box(Vec3::splat(-3.0), Vec3::splat(5.0))),
        sorted(second.query_box(Vec3::splat(-3.0), Vec3::splat(5.0)))
    );
}

#[test]
fn test_structure_invariants_on_random_cloud() {
    let cloud = random_cloud(33, 30_000, 50.0);
    let config = OctreeConfig {
        max_points_per_leaf: 16,
        max_depth: 8,
    };
    let mut octree = Octree::with_config(&cloud, config);
    octree.build();

    let mut stored = 0;
    for node in octree.nodes() {
        match node.children() {
            Some(children) => {
                assert!(!node.is_leaf());
                assert_eq!(children.len(), 8);
                // Each child's indices are exactly the parent's indices in that octant.
                for (code, &child) in children.iter().enumerate() {
                    let child_node = octree.node(child);
                    assert_eq!(child_node.depth(), node.depth() + 1);
                    for i in octree.collect_indices(child) {
                        assert_eq!(node.bounds().octant_of(cloud[i].position), code);
                        assert!(child_node.bounds().contains_point(cloud[i].position));
                    }
                }
            }
            None => {
                assert!(node.is_leaf());
                assert!(node.point_count() <= 16 || node.depth() == 8);
                stored += node.point_count();
            }
        }
    }
    assert_eq!(stored, cloud.len());
    assert_eq!(
        sorted(octree.collect_indices(NodeId::ROOT)),
        (0..cloud.len()).collect::<Vec<_>>()
    );

    let stats = octree.stats();
    assert_eq!(stats.node_count, octree.nodes().len());
    assert!(stats.max_depth <= 8);
}

#[test]
fn test_concurrent_queries_agree() {
    let cloud = random_cloud(44, 10_000, 10.0);
    let mut octree = Octree::new(&cloud);
    octree.build();
    let octree = &octree;
    let expected = sorted(octree.query_radius(Vec3::ZERO, 5.0));

    std::thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|_| s.spawn(|| sorted(octree.query_radius(Vec3::ZERO, 5.0))))
            .collect();
        for h in handles {
            assert_eq!(h.join().unwrap(), expected);
        }
    });
}
