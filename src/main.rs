//! inboxctl: review interrupted agent runs from the terminal.
//!
//! Quick start:
//!   inboxctl check interrupt.json       # is this interrupt reviewable?
//!   inboxctl review interrupt.json      # approve, edit or reject each action
//!   inboxctl approve-all interrupt.json # approve everything at once
//!
//! For more info: inboxctl --help

// Suppress warnings for items that are public API (used by tests)
#![allow(dead_code, unused_imports)]

mod cli;
mod config;
mod inbox;
mod stream;
mod utils;

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

/// inboxctl: human-in-the-loop review for interrupted agent runs.
///
/// Reads a pending interrupt, lets you approve, edit or reject the actions
/// it proposes, and resumes the run with your decisions.
#[derive(Parser)]
#[command(
    name = "inboxctl",
    version,
    about = "Review and resume interrupted agent runs",
    long_about = "inboxctl shows the actions an interrupted agent wants to take\n\
                  and sends your decisions back to the run.\n\n\
                  Quick start:\n  \
                  inboxctl check interrupt.json\n  \
                  inboxctl review interrupt.json\n  \
                  inboxctl approve-all interrupt.json --dry-run"
)]
struct Cli {
    /// Config file (default: .inboxctl.yaml walking up, then ~/.inboxctl/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Unix socket of the run-stream bridge
    #[arg(long, global = true, env = "INBOXCTL_SOCKET")]
    socket: Option<PathBuf>,

    /// Print the commands that would be sent as JSON lines instead of sending them
    #[arg(long, global = true)]
    dry_run: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate an interrupt file and show its actions
    Check {
        /// Interrupt JSON file
        interrupt: PathBuf,
    },

    /// Review an interrupt interactively
    Review {
        /// Interrupt JSON file
        interrupt: PathBuf,
    },

    /// Approve every pending action
    ApproveAll {
        /// Interrupt JSON file
        interrupt: PathBuf,
    },

    /// Reject every pending action
    RejectAll {
        /// Interrupt JSON file
        interrupt: PathBuf,

        /// Reason sent with each rejection (default from config)
        #[arg(short, long)]
        message: Option<String>,
    },

    /// Mark the thread resolved without deciding
    Resolve {
        /// Interrupt JSON file
        interrupt: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = config::load_config(cli.config.as_deref());
    let log_filter = loaded
        .as_ref()
        .map(|config| config.log_filter.clone())
        .unwrap_or_else(|_| config::DEFAULT_LOG_FILTER.to_string());

    // Set up tracing (RUST_LOG wins over the configured filter)
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(&log_filter))
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(config::DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let result = match loaded {
        Ok(mut config) => {
            if let Some(socket) = cli.socket {
                config.socket_path = Some(socket);
            }
            run(cli.command, &config, cli.dry_run).await
        }
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        eprintln!();
        eprintln!("  {} {}", "✗".red().bold(), e);
        for cause in e.chain().skip(1) {
            eprintln!("  {} {}", "caused by:".dimmed(), cause);
        }
        eprintln!();
        std::process::exit(1);
    }
}

async fn run(command: Commands, config: &config::InboxConfig, dry_run: bool) -> anyhow::Result<()> {
    match command {
        Commands::Check { interrupt } => cli::check::run_check(&interrupt),
        Commands::Review { interrupt } => cli::review::run_review(config, &interrupt, dry_run).await,
        Commands::ApproveAll { interrupt } => {
            cli::bulk::run_approve_all(config, &interrupt, dry_run).await
        }
        Commands::RejectAll { interrupt, message } => {
            cli::bulk::run_reject_all(config, &interrupt, message, dry_run).await
        }
        Commands::Resolve { interrupt } => cli::bulk::run_resolve(config, &interrupt, dry_run).await,
    }
}
