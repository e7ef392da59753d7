//! Error types for intent recognition.
//!
//! Recognition itself never fails; errors only surface while building
//! patterns from caller-supplied definitions.

use bandejao_core::error::BandejaoError;

/// Errors from building the pattern table.
#[derive(Debug, thiserror::Error)]
pub enum NluError {
    #[error("Invalid regex for intent {intent}: {pattern}")]
    InvalidRegex {
        intent: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("Invalid intent definition: {0}")]
    Core(#[from] BandejaoError),
}
