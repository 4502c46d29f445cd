//! Weekly Wrap CLI - YNAB budget summary for Telegram
//!
//! Usage:
//!   weekly-wrap start               Run on schedule (SCHEDULE_CRON)
//!   weekly-wrap once                Send this week's wrap now
//!   weekly-wrap dry-run             Print this week's wrap
//!   weekly-wrap analyze --json      Print the full analysis
//!   weekly-wrap schedule -n 3       Show upcoming runs

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use wrap_core::config::{LogFormat, LoggingConfig};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Env files may carry LOG_LEVEL/LOG_FORMAT, so load them before logging
    let config = commands::load_config(cli.env_file.as_deref())?;
    init_logging(&config.logging, cli.verbose);
    config.log_warnings();

    match cli.command {
        Commands::Start => commands::cmd_start(&config).await,
        Commands::Once => commands::cmd_once(&config).await,
        Commands::DryRun => commands::cmd_dry_run(&config).await,
        Commands::Analyze { json } => commands::cmd_analyze(&config, json).await,
        Commands::Ping => commands::cmd_ping(&config).await,
        Commands::Schedule { count } => commands::cmd_schedule(&config, count),
    }
}

/// Set up logging to stderr
///
/// Priority: RUST_LOG env var > --verbose flag > LOG_LEVEL (default info)
fn init_logging(logging: &LoggingConfig, verbose: bool) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new(&logging.level)
    };

    let registry = tracing_subscriber::registry().with(filter);

    match logging.format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        LogFormat::Text => registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .compact()
                    .with_writer(std::io::stderr),
            )
            .init(),
    }
}
