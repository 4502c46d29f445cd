//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `run` - Wrap cycles (start, once, dry-run)
//! - `analyze` - Analysis output (text summary or JSON)
//! - `status` - Connectivity and schedule checks (ping, schedule)

pub mod analyze;
pub mod run;
pub mod status;

// Re-export command functions for main.rs
pub use analyze::*;
pub use run::*;
pub use status::*;

use std::path::Path;

use anyhow::{bail, Context, Result};
use wrap_core::config::load_env_file;
use wrap_core::Config;

/// Read configuration, loading `env_file` or the default `.env` files first
pub fn load_config(env_file: Option<&Path>) -> Result<Config> {
    match env_file {
        Some(path) => {
            let loaded = load_env_file(path)
                .with_context(|| format!("Failed to load {}", path.display()))?;
            if !loaded {
                bail!("Environment file not found: {}", path.display());
            }
            let mut config = Config::from_env();
            config.env_files.push(path.to_path_buf());
            Ok(config)
        }
        None => Config::load().context("Failed to load configuration"),
    }
}
