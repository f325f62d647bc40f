//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Async Commands
//!
//! `run` talks to the automation server over HTTP, so it builds a tokio
//! runtime and blocks on the session. The config commands stay synchronous.

mod config_cmd;
mod run;

pub use config_cmd::{init as config_init, path as config_path, show as config_show};
pub use run::run;

use super::args::{Command, ConfigAction};
use super::Context;
use anyhow::Result;

/// Dispatch a parsed command. No command means `run` with no overrides.
pub fn dispatch(command: Option<Command>, ctx: &Context) -> Result<()> {
    match command.unwrap_or_else(|| Command::Run(Default::default())) {
        Command::Run(args) => run(ctx, args),
        Command::Config { action } => match action {
            ConfigAction::Show => config_show(ctx),
            ConfigAction::Path => config_path(ctx),
            ConfigAction::Init { force } => config_init(ctx, force),
        },
    }
}
