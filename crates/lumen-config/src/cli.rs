//! Command-line argument parsing.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::Config;

/// Synthetic cloud shapes the demo can generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
pub enum CloudShape {
    /// Jittered spiral rising along +Y, colored by height.
    #[default]
    Helix,
    /// Uniform samples in a solid ball.
    Sphere,
    /// Uniform samples in a cube.
    Cube,
    /// Samples on a torus surface.
    Torus,
}

/// Lumen command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug)]
#[command(name = "lumen", about = "Point cloud spatial index demo")]
pub struct CliArgs {
    /// Number of points to generate.
    #[arg(long)]
    pub points: Option<usize>,

    /// Shape of the generated cloud.
    #[arg(long, value_enum)]
    pub shape: Option<CloudShape>,

    /// RNG seed.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Octree leaf capacity before subdivision.
    #[arg(long)]
    pub max_points_per_leaf: Option<usize>,

    /// Octree depth limit.
    #[arg(long)]
    pub max_depth: Option<u32>,

    /// LOD base distance (stride grows by one per multiple of this).
    #[arg(long)]
    pub base_distance: Option<f32>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(n) = args.points {
            self.demo.points = n;
        }
        if let Some(shape) = args.shape {
            self.demo.shape = shape;
        }
        if let Some(seed) = args.seed {
            self.demo.seed = seed;
        }
        if let Some(cap) = args.max_points_per_leaf {
            self.octree.max_points_per_leaf = cap;
        }
        if let Some(depth) = args.max_depth {
            self.octree.max_depth = depth;
        }
        if let Some(d) = args.base_distance {
            self.lod.base_distance = d;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
