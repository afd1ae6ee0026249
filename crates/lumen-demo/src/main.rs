//! Demo binary: generate a point cloud, index it, and run every query kind.
//!
//! Configuration is loaded from `config.ron` and can be overridden via CLI flags.
//! Run with `cargo run -p lumen-demo -- --points 500000 --shape torus`.

mod sample;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use glam::{Mat4, Vec3};
use lumen_cloud::{CloudError, PointCloud};
use lumen_config::{CliArgs, Config};
use lumen_math::Frustum;
use lumen_octree::Octree;
use lumen_pool::PointPool;
use tracing::{error, info, warn};

fn main() -> ExitCode {
    let args = CliArgs::parse();

    let config_dir = args.config.clone().unwrap_or_else(|| {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("lumen")
    });

    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args);

    let log_dir = config_dir.join("logs");
    lumen_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("demo failed: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &Config) -> Result<(), CloudError> {
    let demo = &config.demo;

    let start = Instant::now();
    let mut cloud = sample::generate(demo.shape, demo.points, demo.seed);
    cloud.translate_centroid(Vec3::ZERO);
    info!(
        points = cloud.len(),
        shape = ?demo.shape,
        seed = demo.seed,
        memory_bytes = cloud.memory_usage(),
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "generated point cloud"
    );
    if cloud.is_empty() {
        warn!("empty cloud, nothing to index");
        return Ok(());
    }
    info!(
        min = ?cloud.min_bound(),
        max = ?cloud.max_bound(),
        diagonal = cloud.diagonal_length(),
        "cloud bounds"
    );

    let start = Instant::now();
    let mut octree = Octree::with_config(&cloud, config.octree);
    octree.build();
    let build_ms = start.elapsed().as_secs_f64() * 1000.0;
    let stats = octree.stats();
    info!(
        build_ms,
        nodes = stats.node_count,
        leaves = stats.leaf_count,
        max_depth = stats.max_depth,
        "octree built"
    );

    let eye = Vec3::from_array(demo.camera_position);
    let view = Mat4::look_at_rh(eye, Vec3::ZERO, Vec3::Y);
    let projection = Mat4::perspective_rh_gl(
        demo.fov_y_degrees.to_radians(),
        demo.aspect,
        demo.near,
        demo.far,
    );
    let frustum = Frustum::from_view_projection(&(projection * view));

    run_queries(&octree, &cloud, eye, &frustum, config)?;
    exercise_pool(&cloud, config);
    Ok(())
}

fn run_queries(
    octree: &Octree<'_>,
    cloud: &PointCloud,
    eye: Vec3,
    frustum: &Frustum,
    config: &Config,
) -> Result<(), CloudError> {
    let timed = |name: &str, f: &dyn Fn() -> Vec<usize>| {
        let start = Instant::now();
        let results = f();
        info!(
            query = name,
            results = results.len(),
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "query finished"
        );
        results
    };

    let visible = timed("frustum", &|| octree.query_frustum(frustum));
    let lod = timed("lod", &|| octree.query_lod_with(eye, frustum, &config.lod));
    let near = timed("radius", &|| octree.query_radius(Vec3::ZERO, 2.0));
    timed("box", &|| {
        octree.query_box(Vec3::splat(-1.0), Vec3::splat(1.0))
    });

    if !visible.is_empty() {
        info!(
            kept_percent = 100.0 * lod.len() as f64 / visible.len() as f64,
            "lod decimation"
        );
    }
    if let Some(&index) = near.first() {
        let point = cloud.get(index)?;
        info!(index, position = ?point.position, color = ?point.color, "nearest sample");
    }
    Ok(())
}

fn exercise_pool(cloud: &PointCloud, config: &Config) {
    let pool = PointPool::from_config(&config.pool);
    let batch: Vec<_> = cloud
        .iter()
        .take(10_000)
        .map(|point| pool.allocate(*point))
        .collect();

    for &slot in batch.iter().step_by(2) {
        // SAFETY: every slot came from `pool` and is freed exactly once.
        unsafe { pool.deallocate(slot) };
    }

    let stats = pool.stats();
    info!(
        allocated = stats.allocated,
        free = stats.free,
        capacity = stats.capacity,
        blocks = stats.blocks,
        memory_bytes = stats.memory_usage,
        "point pool"
    );
    pool.reset();
}
