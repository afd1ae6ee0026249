//! Synthetic point clouds.

use std::f32::consts::TAU;

use glam::Vec3;
use lumen_cloud::PointCloud;
use lumen_config::CloudShape;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Half-width of the cube that sphere, cube and torus clouds are stretched to fill.
pub const EXTENT: f32 = 10.0;

/// Generate `count` points of the given shape, reproducibly from `seed`.
pub fn generate(shape: CloudShape, count: usize, seed: u64) -> PointCloud {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    match shape {
        CloudShape::Helix => helix(&mut rng, count),
        CloudShape::Sphere => normalized(sphere(&mut rng, count)),
        CloudShape::Cube => normalized(cube(&mut rng, count)),
        CloudShape::Torus => normalized(torus(&mut rng, count)),
    }
}

/// Ten turns of a wobbling spiral, three units tall, with a little jitter.
/// Colored from green at the bottom to red at the top.
fn helix(rng: &mut impl Rng, count: usize) -> PointCloud {
    let mut cloud = PointCloud::with_capacity(count);
    let mut jitter = || (rng.random::<f32>() - 0.5) * 0.1;
    for i in 0..count {
        let f = i as f32 / count as f32;
        let t = f * TAU * 10.0;
        let r = 2.0 + 0.5 * (5.0 * t).sin();
        let height = 3.0 * f;
        let position = Vec3::new(
            r * t.cos() + jitter(),
            height + jitter(),
            r * t.sin() + jitter(),
        );
        let color = Vec3::new(height / 3.0, 1.0 - height / 3.0, 0.5);
        cloud.add_point_with_color(position, color);
    }
    cloud
}

/// Uniform in volume: cube-root radius and arccos polar angle.
fn sphere(rng: &mut impl Rng, count: usize) -> Vec<Vec3> {
    (0..count)
        .map(|_| {
            let theta = rng.random_range(0.0..TAU);
            let phi = (1.0 - 2.0 * rng.random::<f32>()).acos();
            let r = EXTENT * rng.random::<f32>().cbrt();
            Vec3::new(
                r * phi.sin() * theta.cos(),
                r * phi.sin() * theta.sin(),
                r * phi.cos(),
            )
        })
        .collect()
}

fn cube(rng: &mut impl Rng, count: usize) -> Vec<Vec3> {
    (0..count)
        .map(|_| {
            Vec3::new(
                rng.random_range(-EXTENT..EXTENT),
                rng.random_range(-EXTENT..EXTENT),
                rng.random_range(-EXTENT..EXTENT),
            )
        })
        .collect()
}

fn torus(rng: &mut impl Rng, count: usize) -> Vec<Vec3> {
    const MAJOR: f32 = 8.0;
    const MINOR: f32 = 3.0;
    (0..count)
        .map(|_| {
            let u = rng.random_range(0.0..TAU);
            let v = rng.random_range(0.0..TAU);
            let ring = MAJOR + MINOR * v.cos();
            Vec3::new(ring * u.cos(), ring * u.sin(), MINOR * v.sin())
        })
        .collect()
}

/// Stretch each axis independently onto `[-EXTENT, EXTENT]` and color by
/// position. A flat axis maps to 0.
fn normalized(positions: Vec<Vec3>) -> PointCloud {
    let (min, max) = positions.iter().fold(
        (Vec3::splat(f32::INFINITY), Vec3::splat(f32::NEG_INFINITY)),
        |(lo, hi), &p| (lo.min(p), hi.max(p)),
    );
    let span = max - min;
    let axis = |v: f32, lo: f32, span: f32| {
        if span > 0.0 {
            2.0 * EXTENT * (v - lo) / span - EXTENT
        } else {
            0.0
        }
    };

    let mut cloud = PointCloud::with_capacity(positions.len());
    for p in positions {
        let q = Vec3::new(
            axis(p.x, min.x, span.x),
            axis(p.y, min.y, span.y),
            axis(p.z, min.z, span.z),
        );
        let color = (q + EXTENT) / (2.0 * EXTENT);
        cloud.add_point_with_color(q, color);
    }
    cloud
}
