//! config command - Show, locate, or create the config file

use anyhow::{bail, Context as _, Result};

use crate::cli::Context;
use crate::core::config::Config;
use crate::ui::output;

/// Print the effective configuration as TOML.
pub fn show(ctx: &Context) -> Result<()> {
    let config = Config::load(ctx.config.as_deref()).context("Failed to load config")?;
    output::debug(
        format!("config source: {:?}", config.loaded_from()),
        ctx.verbosity(),
    );
    let rendered =
        toml::to_string_pretty(&config.effective()).context("Failed to render config")?;

    match config.loaded_from() {
        Some(path) => println!("# Loaded from {}", path.display()),
        None => println!("# No config file found; showing defaults"),
    }
    print!("{}", rendered);
    Ok(())
}

/// Print the config file location that would be used.
pub fn path(ctx: &Context) -> Result<()> {
    if let Some(path) = &ctx.config {
        println!("{}", path.display());
        return Ok(());
    }

    match Config::search_path() {
        Some(path) => println!("{}", path.display()),
        None => {
            let path = Config::default_path()?;
            println!("{} (not present)", path.display());
        }
    }
    Ok(())
}

/// Write the default configuration.
///
/// Targets `--config` when given, otherwise the canonical location.
pub fn init(ctx: &Context, force: bool) -> Result<()> {
    let path = match &ctx.config {
        Some(path) => path.clone(),
        None => Config::default_path()?,
    };

    if path.exists() && !force {
        bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    Config::write(&path, &Config::default().effective()).context("Failed to write config")?;
    output::success(format!("Wrote {}", path.display()), ctx.verbosity());
    Ok(())
}
