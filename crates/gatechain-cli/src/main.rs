//! `gatechain` -- CLI binary for the gated confirmation pipeline.
//!
//! Reads one line of free-form text (or `--message`), runs it through
//! classify -> gate -> resolve -> synthesize, and prints either the
//! confirmation or a rejection notice.
//!
//! # Examples
//!
//! ```text
//! # Prompt for one line
//! gatechain
//! What is your desired physical outcome? I want stronger arms
//! Confirmation: Do 3 sets of 12 push-ups ...
//!
//! # Single message, different model
//! gatechain --model groq/llama-3.1-70b-versatile -m "run a faster 5k"
//!
//! # Keep prompting until EOF or /exit
//! gatechain --interactive
//! ```
//!
//! Exit status is 0 for accepted and rejected input, 1 when a model call
//! fails, and 2 for configuration errors.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

mod run;

/// Gated classify / resolve / confirm pipeline.
#[derive(Parser, Debug)]
#[command(name = "gatechain", about = "Gated classify/resolve/confirm pipeline", version)]
pub struct Cli {
    /// Enable verbose (debug-level) logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file path (falls back to $GATECHAIN_CONFIG).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Model to use, e.g. "openai/gpt-4o" (overrides config).
    #[arg(long)]
    model: Option<String>,

    /// Gate confidence threshold in [0, 1] (overrides config).
    #[arg(long)]
    threshold: Option<f64>,

    /// Process this text instead of reading stdin.
    #[arg(short, long, conflicts_with = "interactive")]
    message: Option<String>,

    /// Keep prompting until EOF or `/exit`.
    #[arg(short, long)]
    interactive: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // A missing .env file is normal.
    dotenvy::dotenv().ok();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    match run::execute(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", run::failure_message(&e));
            run::failure_code(&e)
        }
    }
}
