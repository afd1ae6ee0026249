//! Configuration system for Lumen.
//!
//! Holds the tunable policy of the spatial index (leaf capacity, depth limit,
//! LOD cutoffs), the point pool block size, and demo/debug settings. Settings
//! persist to disk as RON and can be overridden from the command line.

mod cli;
mod config;
mod error;

pub use cli::{CliArgs, CloudShape};
pub use config::{Config, DebugConfig, DemoConfig, LodConfig, OctreeConfig, PoolConfig};
pub use error::ConfigError;
