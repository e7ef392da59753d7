//! Shared types, configuration and errors for the Bandejão assistant.
//!
//! Both the intent recognizer and the dialog layer depend on this crate;
//! nothing here performs I/O except configuration loading.

pub mod config;
pub mod error;
pub mod types;

pub use config::BandejaoConfig;
pub use error::{BandejaoError, Result};
pub use types::*;
