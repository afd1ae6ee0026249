//! Tracing subscriber setup for the Lumen crates.
//!
//! Library crates only emit `tracing` events; binaries call [`init_logging`]
//! once at startup to get console output and, optionally, a JSON log file.

use std::path::Path;

use lumen_config::Config;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when neither `RUST_LOG` nor the config names a level.
pub const DEFAULT_FILTER: &str = "info";

/// Name of the JSON log file written under the log directory.
pub const LOG_FILE_NAME: &str = "lumen.log";

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over `config.debug.log_level`, which wins over
/// [`DEFAULT_FILTER`]. A JSON file layer writing `lumen.log` is added when
/// `log_dir` is given and either `debug_build` or `config.debug.log_to_file`
/// is set. Failing to create the file falls back to console only.
///
/// # Panics
///
/// Panics if a global subscriber is already installed.
///
/// ```no_run
/// use lumen_config::Config;
/// use lumen_log::init_logging;
///
/// let config = Config::default();
/// init_logging(Some(std::path::Path::new("./logs")), cfg!(debug_assertions), Some(&config));
/// ```
pub fn init_logging(log_dir: Option<&Path>, debug_build: bool, config: Option<&Config>) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(config)));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_thread_names(true)
        .with_level(true)
        .with_timer(fmt::time::uptime());

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer);

    if file_logging_enabled(debug_build, config)
        && let Some(log_dir) = log_dir
        && std::fs::create_dir_all(log_dir).is_ok()
        && let Ok(log_file) = std::fs::File::create(log_dir.join(LOG_FILE_NAME))
    {
        let file_layer = fmt::layer()
            .with_writer(log_file)
            .with_ansi(false)
            .with_target(true)
            .with_timer(fmt::time::uptime())
            .json();

        subscriber.with(file_layer).init();
        tracing::debug!(path = %log_dir.join(LOG_FILE_NAME).display(), "file logging enabled");
        return;
    }

    subscriber.init();
}

/// Whether [`init_logging`] should add the JSON file layer.
pub fn file_logging_enabled(debug_build: bool, config: Option<&Config>) -> bool {
    debug_build || config.is_some_and(|c| c.debug.log_to_file)
}

/// Filter directive derived from the config, ignoring `RUST_LOG`.
pub fn filter_directive(config: Option<&Config>) -> String {
    match config {
        Some(config) if !config.debug.log_level.trim().is_empty() => {
            config.debug.log_level.trim().to_string()
        }
        _ => DEFAULT_FILTER.to_string(),
    }
}

/// An `EnvFilter` built from [`DEFAULT_FILTER`].
pub fn default_env_filter() -> EnvFilter {
    EnvFilter::new(DEFAULT_FILTER)
}
