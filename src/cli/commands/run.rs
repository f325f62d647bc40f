//! run command - Bootstrap a session and drive the edit menu

use anyhow::{Context as _, Result};

use crate::cli::args::RunArgs;
use crate::cli::Context;
use crate::core::config::{Config, ConfigOverrides, SessionConfig};
use crate::mutation::MutationLoop;
use crate::remote::creoson::CreosonClient;
use crate::session::Bootstrapper;
use crate::ui::output;
use crate::ui::prompts::StdioPrompter;

/// Resolve configuration, bootstrap against the Creoson server, then run
/// the mutation loop until the operator quits.
///
/// Any bootstrap failure is fatal. Failures inside the loop are reported
/// and the loop continues.
pub fn run(ctx: &Context, args: RunArgs) -> Result<()> {
    let config = Config::load(ctx.config.as_deref()).context("Failed to load config")?;
    let session_config = config
        .resolve(&ConfigOverrides::from(args))
        .context("Invalid command-line option")?;

    output::print(
        output::title_bar(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
        ctx.verbosity(),
    );

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    rt.block_on(run_async(ctx, session_config))
}

async fn run_async(ctx: &Context, config: SessionConfig) -> Result<()> {
    let verbosity = ctx.verbosity();
    let client = CreosonClient::new(config.server_url.clone());
    let slots = config.slots.clone();
    let mut prompter = StdioPrompter::new();

    let mut session = Bootstrapper::new(config, &mut prompter)
        .interactive(ctx.interactive)
        .verbosity(verbosity)
        .run(Box::new(client))
        .await?;

    let summary = MutationLoop::new(&mut session, &mut prompter, slots)
        .verbosity(verbosity)
        .run()
        .await
        .context("Failed to read operator input")?;

    tracing::info!(
        applied = summary.applied,
        failed = summary.failed,
        "session finished"
    );
    output::print("Bye.", verbosity);
    Ok(())
}
