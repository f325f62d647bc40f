//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--config <path>`: Read this config file instead of searching
//! - `--debug`: Enable debug logging
//! - `--no-interactive`: Skip the startup prompts
//! - `--quiet` / `-q`: Minimal output

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::core::config::ConfigOverrides;

/// modelctl - Interactive dimension, text and material editing for Creo models
#[derive(Parser, Debug)]
#[command(name = "modelctl")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file to use
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output; implies --no-interactive
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Accept configured values without the startup prompts
    #[arg(long, global = true)]
    pub no_interactive: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }

    /// Whether the startup prompts are shown.
    pub fn interactive(&self) -> bool {
        !(self.no_interactive || self.quiet)
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Connect to the server and start the edit menu (default)
    #[command(
        long_about = "Connect to the server and start the edit menu.\n\n\
            Makes sure Creo is running with the target model open, then shows \
            a menu for editing dimensions, text and the model material. This \
            is what runs when no command is given.",
        after_help = "\
EXAMPLES:
    # Use the configured values, confirming each at startup
    modelctl

    # Point at another server and model without prompting
    modelctl --no-interactive run --server-url http://cad-box:9056/creoson --file bracket.prt"
    )]
    Run(RunArgs),

    /// Inspect or create the config file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Overrides for a session; each beats the config file.
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Creoson endpoint URL
    #[arg(long, value_name = "URL")]
    pub server_url: Option<String>,

    /// Launcher used when Creo is not running
    #[arg(long, value_name = "PATH")]
    pub host_path: Option<String>,

    /// Model file to open and edit
    #[arg(long = "file", value_name = "NAME")]
    pub file_name: Option<String>,

    /// Working directory on the server side
    #[arg(long, value_name = "DIR")]
    pub working_dir: Option<String>,

    /// Creo major version
    #[arg(long, value_name = "N")]
    pub host_version: Option<u32>,
}

impl From<RunArgs> for ConfigOverrides {
    fn from(args: RunArgs) -> Self {
        ConfigOverrides {
            server_url: args.server_url,
            host_path: args.host_path,
            file_name: args.file_name,
            working_dir: args.working_dir,
            host_version: args.host_version,
        }
    }
}

/// Config subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Print the effective configuration as TOML
    Show,
    /// Print the config file location
    Path,
    /// Write the defaults to the standard location
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_command_is_allowed() {
        let cli = Cli::try_parse_from(["modelctl"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.interactive());
    }

    #[test]
    fn run_overrides() {
        let cli = Cli::try_parse_from([
            "modelctl",
            "run",
            "--file",
            "bracket.prt",
            "--host-version",
            "9",
        ])
        .unwrap();
        let Some(Command::Run(args)) = cli.command else {
            panic!("expected run");
        };
        let overrides = ConfigOverrides::from(args);
        assert_eq!(overrides.file_name.as_deref(), Some("bracket.prt"));
        assert_eq!(overrides.host_version, Some(9));
        assert_eq!(overrides.server_url, None);
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["modelctl", "config", "show", "--no-interactive"]).unwrap();
        assert!(!cli.interactive());
        assert!(matches!(
            cli.command,
            Some(Command::Config {
                action: ConfigAction::Show
            })
        ));
    }

    #[test]
    fn quiet_implies_no_interactive() {
        let cli = Cli::try_parse_from(["modelctl", "-q"]).unwrap();
        assert!(!cli.interactive());
    }

    #[test]
    fn rejects_non_numeric_version() {
        assert!(Cli::try_parse_from(["modelctl", "run", "--host-version", "seven"]).is_err());
    }
}
