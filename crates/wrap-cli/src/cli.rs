//! CLI argument definitions using clap
//!
//! This module contains the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Weekly Wrap - YNAB spending summary posted to Telegram
#[derive(Parser, Debug)]
#[command(name = "weekly-wrap")]
#[command(about = "Weekly YNAB budget wrap delivered to Telegram", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Load environment variables from this file instead of .env and /app/.env
    #[arg(long, global = true)]
    pub env_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the scheduler and post the wrap on every SCHEDULE_CRON occurrence
    Start,

    /// Post the wrap for the past week once and exit
    Once,

    /// Print the wrap for the past week without sending it
    DryRun,

    /// Show the full analysis for the past week
    Analyze {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check the Telegram bot token
    Ping,

    /// Show the next scheduled runs
    Schedule {
        /// Number of runs to show
        #[arg(short = 'n', long, default_value = "5")]
        count: usize,
    },
}
