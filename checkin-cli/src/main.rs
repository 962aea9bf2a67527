// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! Drive check-in CLI - one unattended check-in per invocation.
//!
//! # Examples
//!
//! ```bash
//! # Check in using ./config.yaml
//! checkin
//!
//! # Use another credential document, print the result as JSON
//! checkin --config /data/config.yaml --format json
//!
//! # Show the resolved configuration (secrets redacted)
//! checkin config show
//! ```

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use checkin_store::DEFAULT_CREDENTIALS_FILE;
use commands::{config, run};

// ============================================================================
// CLI Definition
// ============================================================================

/// Aliyun Drive daily check-in.
#[derive(Parser)]
#[command(name = "checkin")]
#[command(about = "Daily Aliyun Drive check-in with DingTalk reporting")]
#[command(long_about = r#"
Refreshes the stored token pair, checks in, claims the day's reward and
looks up the day's task, then reports the outcome to a DingTalk robot.

Environment:
  access_token / refresh_token     Used when the document lacks either token
  dingding_webhook_url             DingTalk robot webhook
  dingding_webhook_secret          DingTalk robot signing secret

The refreshed token pair is written back to the document after every run.
"#)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run. If none, runs 'run' by default.
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Credential document (YAML).
    #[arg(long, short, default_value = DEFAULT_CREDENTIALS_FILE, global = true)]
    pub config: PathBuf,

    /// How the run result is printed on stdout.
    #[arg(long, short = 'f', default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Debug logging for the check-in crates.
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Quiet mode (no logging, no output).
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

/// Subcommands.
#[derive(Subcommand)]
pub enum Commands {
    /// Perform today's check-in (default if no command specified).
    Run,

    /// Inspect configuration.
    Config(config::ConfigArgs),
}

/// Result printing style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// One JSON document, for schedulers that parse output.
    Json,
}

// ============================================================================
// Logging Setup
// ============================================================================

fn setup_logging(verbose: bool, quiet: bool) {
    if quiet {
        return;
    }

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("checkin=debug,info")
        } else {
            EnvFilter::new("checkin=info,warn")
        }
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let result = match &cli.command {
        Some(Commands::Run) | None => run::run(&cli).await,
        Some(Commands::Config(args)) => config::run(args, &cli),
    };

    if let Err(e) = result {
        if !cli.quiet {
            eprintln!("Error: {e:#}");
        }
        std::process::exit(1);
    }

    Ok(())
}
