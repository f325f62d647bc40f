//! cli
//!
//! Command-line interface layer for modelctl.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Delegate to command handlers
//! - Does NOT talk to the automation server directly
//!
//! # Architecture
//!
//! The CLI layer is thin. It parses arguments via clap, resolves the
//! configuration and hands it to [`crate::session::Bootstrapper`] and
//! [`crate::mutation::MutationLoop`].

pub mod args;
pub mod commands;

pub use args::{Cli, Command, ConfigAction, RunArgs};

use std::path::PathBuf;

use anyhow::Result;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::ui::output::Verbosity;

/// Settings shared by every command, taken from the global flags.
#[derive(Debug, Clone, Default)]
pub struct Context {
    /// Explicit config file
    pub config: Option<PathBuf>,
    /// Debug output
    pub debug: bool,
    /// Minimal output
    pub quiet: bool,
    /// Show the startup prompts
    pub interactive: bool,
}

impl Context {
    /// Output verbosity for these flags.
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.debug)
    }
}

/// Build the log filter from a `RUST_LOG` value.
///
/// Directives in `rust_log` win. Without any, the level is `debug` when
/// `debug` is set and `warn` otherwise.
pub fn log_filter(rust_log: Option<&str>, debug: bool) -> EnvFilter {
    let default_level = if debug {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };
    EnvFilter::builder()
        .with_default_directive(default_level.into())
        .parse_lossy(rust_log.unwrap_or_default())
}

/// Install the stderr log subscriber.
pub fn init_logging(debug: bool) {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(rust_log.as_deref(), debug))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run(cli: Cli) -> Result<()> {
    let ctx = Context {
        config: cli.config.clone(),
        debug: cli.debug,
        quiet: cli.quiet,
        interactive: cli.interactive(),
    };

    commands::dispatch(cli.command, &ctx)
}
