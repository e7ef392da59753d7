//! Error types for the Bandejão core crate.

use thiserror::Error;

/// Top-level error type for the Bandejão assistant.
///
/// Recognition and dialog never fail; these variants only cover the edges
/// of the system (configuration files, intent names). Subsystem crates
/// define their own error types and wrap this one with `#[from]`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BandejaoError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unknown intent: {0}")]
    UnknownIntent(String),
}

impl From<toml::de::Error> for BandejaoError {
    fn from(err: toml::de::Error) -> Self {
        BandejaoError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for BandejaoError {
    fn from(err: toml::ser::Error) -> Self {
        BandejaoError::Config(err.to_string())
    }
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, BandejaoError>;
