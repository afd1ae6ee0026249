//! Errors raised while persisting `config.ron`.

/// Failure to load, store, or parse the configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// `config.ron` exists but could not be read.
    #[error("cannot read config.ron: {0}")]
    ReadError(#[source] std::io::Error),

    /// The config directory or file could not be written.
    #[error("cannot write config.ron: {0}")]
    WriteError(#[source] std::io::Error),

    /// The file is not valid RON for [`crate::Config`].
    #[error("malformed config.ron: {0}")]
    ParseError(#[source] ron::error::SpannedError),

    /// The in-memory config could not be rendered as RON.
    #[error("cannot serialize config: {0}")]
    SerializeError(#[source] ron::Error),
}
