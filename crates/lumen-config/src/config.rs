//! Configuration structs with sensible defaults and RON persistence.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::cli::CloudShape;
use crate::error::ConfigError;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Octree subdivision policy.
    pub octree: OctreeConfig,
    /// Distance-based level-of-detail policy.
    pub lod: LodConfig,
    /// Fixed-block pool sizing.
    pub pool: PoolConfig,
    /// Synthetic cloud and camera used by the demo binary.
    pub demo: DemoConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Octree subdivision policy. Fixed for the lifetime of one build.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OctreeConfig {
    /// A leaf splits once it holds more than this many indices.
    pub max_points_per_leaf: usize,
    /// Nodes at this depth never split, whatever their point count.
    pub max_depth: u32,
}

/// Level-of-detail cutoffs for LOD queries.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LodConfig {
    /// A node whose diagonal / view distance falls below this is "far".
    pub detail_ratio_cutoff: f32,
    /// Nodes at or below this depth are always "far".
    pub depth_cutoff: u32,
    /// Distance per unit of sampling stride for far nodes.
    pub base_distance: f32,
}

/// Point pool sizing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PoolConfig {
    /// Slots per block for the point pool.
    pub point_block_size: usize,
}

/// Demo binary settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DemoConfig {
    /// Number of points to generate.
    pub points: usize,
    /// Shape of the synthetic cloud.
    pub shape: CloudShape,
    /// RNG seed for reproducible clouds.
    pub seed: u64,
    /// Camera position, looking at the origin.
    pub camera_position: [f32; 3],
    /// Vertical field of view in degrees.
    pub fov_y_degrees: f32,
    /// Viewport aspect ratio (width / height).
    pub aspect: f32,
    /// Near clip distance.
    pub near: f32,
    /// Far clip distance.
    pub far: f32,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
    /// Also write JSON logs to the log directory.
    pub log_to_file: bool,
}

// --- Default implementations ---

impl Default for OctreeConfig {
    fn default() -> Self {
        Self {
            max_points_per_leaf: 100,
            max_depth: 10,
        }
    }
}

impl Default for LodConfig {
    fn default() -> Self {
        Self {
            detail_ratio_cutoff: 0.01,
            depth_cutoff: 5,
            base_distance: 10.0,
        }
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            point_block_size: 4096,
        }
    }
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            points: 100_000,
            shape: CloudShape::Helix,
            seed: 42,
            camera_position: [0.0, 5.0, 10.0],
            fov_y_degrees: 45.0,
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 100.0,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_to_file: false,
        }
    }
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join("config.ron");

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join("config.ron");
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let config_path = config_dir.join("config.ron");
        let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
        let new_config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }
}
