//! Bandejão application binary - composition root.
//!
//! 1. Parse CLI arguments and load configuration from TOML
//! 2. Install the tracing subscriber
//! 3. Build the recognizer, dialog manager and orchestrator
//! 4. Run the requested command (recognize, ask or repl)

mod cli;

use bandejao_chat::ChatOrchestrator;
use bandejao_core::config::BandejaoConfig;
use bandejao_core::DialogContext;
use bandejao_nlu::IntentRecognizer;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use crate::cli::{join_utterance, CliArgs, Command};

const EXIT_WORDS: [&str; 4] = ["sair", "tchau!", "exit", "quit"];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    let config_file = args.resolve_config_path();

    // Config is loaded under a bootstrap subscriber so load warnings reach
    // stderr before the configured log level is known.
    let bootstrap = tracing_subscriber::fmt()
        .with_env_filter(env_filter(&args.resolve_log_level("warn")))
        .with_writer(std::io::stderr)
        .finish();
    let config = tracing::subscriber::with_default(bootstrap, || {
        BandejaoConfig::load_or_default(&config_file)
    });

    // Tracing goes to stderr so stdout stays machine-readable.
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(&args.resolve_log_level(&config.general.log_level)))
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("Starting Bandejão v{}", env!("CARGO_PKG_VERSION"));

    match args.command {
        Command::Recognize { utterance } => {
            let recognizer = IntentRecognizer::from_config(&config)?;
            let result = recognizer.recognize(&join_utterance(&utterance), None);
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Command::Ask { utterance } => {
            let orchestrator = ChatOrchestrator::from_config(&config)?;
            let mut context = DialogContext::new();
            let turn = orchestrator
                .handle_turn(&join_utterance(&utterance), &mut context)
                .await?;
            println!("{}", serde_json::to_string_pretty(&turn)?);
        }
        Command::Repl { json } => {
            let orchestrator = ChatOrchestrator::from_config(&config)?;
            run_repl(&orchestrator, json).await?;
        }
    }

    Ok(())
}

/// `RUST_LOG` wins over the resolved level.
fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

/// Line-oriented conversation sharing one dialog context.
async fn run_repl(
    orchestrator: &ChatOrchestrator,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut context = DialogContext::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("Olá! Pergunte sobre o bandejão. Digite \"sair\" para encerrar.");

    while let Some(line) = lines.next_line().await? {
        let message = line.trim();
        if EXIT_WORDS.contains(&message.to_lowercase().as_str()) {
            break;
        }

        let turn = match orchestrator.handle_turn(message, &mut context).await {
            Ok(turn) => turn,
            Err(e) => {
                eprintln!("erro: {}", e);
                continue;
            }
        };

        if json {
            println!("{}", serde_json::to_string(&turn)?);
            continue;
        }

        println!("{}", turn.response.text);
        if let Some(suggestions) = &turn.response.suggestions {
            for suggestion in suggestions {
                println!("  - {}", suggestion);
            }
        }
    }

    tracing::debug!(turns = context.turn_count, "REPL finished");
    Ok(())
}
