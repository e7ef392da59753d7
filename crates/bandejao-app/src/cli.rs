//! CLI argument definitions for the `bandejao` binary.
//!
//! Priority resolution: CLI args > env vars > config file > defaults.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Bandejão: campus cafeteria assistant.
#[derive(Parser, Debug)]
#[command(name = "bandejao", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level", global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Classify an utterance and print the recognition result as JSON.
    Recognize {
        #[arg(required = true, num_args = 1..)]
        utterance: Vec<String>,
    },
    /// Run a single turn and print recognition plus response as JSON.
    Ask {
        #[arg(required = true, num_args = 1..)]
        utterance: Vec<String>,
    },
    /// Interactive multi-turn conversation on stdin/stdout.
    Repl {
        /// Print every turn as JSON instead of plain text.
        #[arg(long)]
        json: bool,
    },
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > BANDEJAO_CONFIG env var > ./bandejao.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("BANDEJAO_CONFIG") {
            return PathBuf::from(p);
        }
        PathBuf::from("bandejao.toml")
    }

    /// Resolve the log level.
    ///
    /// Priority: --log-level flag > config file value.
    pub fn resolve_log_level(&self, config_level: &str) -> String {
        self.log_level
            .clone()
            .unwrap_or_else(|| config_level.to_string())
    }
}

/// Join shell words back into a single utterance.
pub fn join_utterance(words: &[String]) -> String {
    words.join(" ")
}
