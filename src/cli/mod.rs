//! cli
//!
//! Command-line interface layer for dex.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Load configuration and install the log subscriber
//! - Delegate to command handlers
//!
//! # Architecture
//!
//! The CLI layer is thin. It loads a snapshot into a [`crate::engine::DexSession`]
//! and calls the session for every check and edit. Snapshot files are never
//! written back.

pub mod args;
pub mod commands;

pub use args::Cli;

use anyhow::{Context as _, Result};
use tracing_subscriber::EnvFilter;

use crate::core::config::Config;

/// Per-invocation context shared by command handlers.
#[derive(Debug, Clone)]
pub struct Context {
    /// Debug logging requested
    pub debug: bool,
    /// Minimal output
    pub quiet: bool,
    /// Effective user id (`--user` wins over config)
    pub user: Option<String>,
    /// Loaded configuration
    pub config: Config,
}

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();

    let loaded = Config::load().context("Failed to load config")?;
    init_logging(cli.debug, loaded.config.log_filter());
    for warning in &loaded.warnings {
        tracing::warn!(path = %warning.path.display(), "{}", warning.message);
    }
    if let Some(path) = loaded.config.loaded_from() {
        tracing::debug!(path = %path.display(), "config loaded");
    }

    let user = cli
        .user
        .clone()
        .or_else(|| loaded.config.user().map(str::to_string));
    let ctx = Context {
        debug: cli.debug,
        quiet: cli.quiet,
        user,
        config: loaded.config,
    };

    commands::dispatch(cli.command, &ctx)
}

/// Install the fmt subscriber on stderr.
///
/// `--debug` forces debug level; otherwise `RUST_LOG` and then the configured
/// filter apply.
fn init_logging(debug: bool, configured: &str) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(configured))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
