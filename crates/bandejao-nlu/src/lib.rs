//! Intent recognition for the Bandejão assistant.
//!
//! Scores free-text utterances against a table of keyword/regex patterns,
//! with fuzzy keyword matching, and returns a ranked, calibrated result.

pub mod error;
pub mod normalize;
pub mod patterns;
pub mod recognizer;
pub mod similarity;

pub use error::NluError;
pub use normalize::{normalize, tokenize};
pub use patterns::{default_patterns, IntentPattern};
pub use recognizer::IntentRecognizer;
pub use similarity::dice_coefficient;
