//! session::bootstrap
//!
//! The startup sequence that turns a configuration into a ready [`Session`].
//!
//! # Sequence
//!
//! Steps run strictly in this order:
//!
//! 1. Connect (fatal on failure)
//! 2. Pin compatibility mode (at most once, only for host version 7+)
//! 3. Ensure the host application is running, launching it if needed
//! 4. Set the working directory (recoverable; the operator may retry)
//! 5. Ensure the target file is open
//!
//! Any unexpected remote failure after step 1 is wrapped with the step it
//! happened in. Nothing is returned to the caller until every fatal step
//! has succeeded.

use thiserror::Error;

use super::Session;
use crate::core::config::SessionConfig;
use crate::remote::{AutomationClient, OpenRequest, RemoteError, StartOptions};
use crate::ui::output::{self, Verbosity};
use crate::ui::prompts::{PromptError, Prompter};

/// First host version that needs its compatibility mode declared.
pub const COMPAT_MODE_MIN_VERSION: u32 = 7;

/// Bootstrap steps after connect, used to label unexpected failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapStep {
    CompatibilityMode,
    HostCheck,
    WorkingDirectory,
    FileCheck,
}

impl std::fmt::Display for BootstrapStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BootstrapStep::CompatibilityMode => write!(f, "declaring compatibility mode"),
            BootstrapStep::HostCheck => write!(f, "checking whether the host is running"),
            BootstrapStep::WorkingDirectory => write!(f, "setting the working directory"),
            BootstrapStep::FileCheck => write!(f, "checking whether the file is open"),
        }
    }
}

/// Fatal startup errors. None of these leave a session behind.
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("unable to connect to server; verify host and server are running")]
    Connection {
        #[source]
        source: RemoteError,
    },

    #[error("host application failed to launch from '{path}': {source}")]
    Launch { path: String, source: RemoteError },

    #[error("unable to open '{file}': {source}")]
    FileOpen { file: String, source: RemoteError },

    #[error("failed while {step}: {source}")]
    Step {
        step: BootstrapStep,
        source: RemoteError,
    },

    #[error("startup prompt failed: {0}")]
    Prompt(#[from] PromptError),
}

/// Runs the startup sequence.
///
/// In interactive mode the operator may override the host launcher and the
/// working directory, say whether the host is older than version 7, and
/// retry when the server rejects a directory.
pub struct Bootstrapper<'p> {
    config: SessionConfig,
    prompter: &'p mut dyn Prompter,
    interactive: bool,
    verbosity: Verbosity,
}

impl<'p> Bootstrapper<'p> {
    /// Create a bootstrapper. Interactive by default.
    pub fn new(config: SessionConfig, prompter: &'p mut dyn Prompter) -> Self {
        Self {
            config,
            prompter,
            interactive: true,
            verbosity: Verbosity::Normal,
        }
    }

    /// Enable or disable the startup prompts.
    pub fn interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    /// Set output verbosity.
    pub fn verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Run every step and return the ready session.
    pub async fn run(mut self, client: Box<dyn AutomationClient>) -> Result<Session, BootstrapError> {
        output::print(
            "Please check that both the host application and the automation server are running.",
            self.verbosity,
        );

        if self.interactive {
            let question = format!(
                "Current host path: {}\nDo you want to set a new path?",
                self.config.host_path
            );
            if self.prompter.confirm(&question)? {
                self.config.host_path = self.prompter.read_line("Please choose the new host path:")?;
            }
        }

        // 1. Connect
        tracing::info!(client = client.name(), url = %self.config.server_url, "connecting");
        let id = client
            .connect()
            .await
            .map_err(|source| BootstrapError::Connection { source })?;
        let mut session = Session::new(client, id, self.config.file_name.clone());
        output::debug(format!("connected, session {}", session.id()), self.verbosity);

        // 2. Compatibility mode
        match self.compat_version()? {
            Some(version) => {
                tracing::info!(version, "pinning compatibility mode");
                session
                    .pin_compatibility_mode(version)
                    .await
                    .map_err(|source| BootstrapError::Step {
                        step: BootstrapStep::CompatibilityMode,
                        source,
                    })?;
                output::debug(
                    format!("compatibility mode pinned to {}", version),
                    self.verbosity,
                );
            }
            None => output::debug("compatibility mode not pinned", self.verbosity),
        }

        // 3. Host application
        self.ensure_host_running(&session).await?;

        // 4. Working directory
        self.set_working_directory(&mut session).await?;

        // 5. Target file
        self.ensure_file_open(&session).await?;

        tracing::info!(session = %session.id(), file = session.file_name(), "session ready");
        Ok(session)
    }

    /// Decide which version to declare, if any.
    fn compat_version(&mut self) -> Result<Option<u32>, BootstrapError> {
        if self.interactive {
            let older = self.prompter.confirm(&format!(
                "Is your current host version < {}?",
                COMPAT_MODE_MIN_VERSION
            ))?;
            if older {
                return Ok(None);
            }
            return Ok(Some(self.config.host_version.max(COMPAT_MODE_MIN_VERSION)));
        }

        Ok((self.config.host_version >= COMPAT_MODE_MIN_VERSION).then_some(self.config.host_version))
    }

    async fn ensure_host_running(&self, session: &Session) -> Result<(), BootstrapError> {
        let running = session
            .client()
            .is_host_running(session.id())
            .await
            .map_err(|source| BootstrapError::Step {
                step: BootstrapStep::HostCheck,
                source,
            })?;

        if running {
            tracing::debug!("host already running");
            output::debug("host already running", self.verbosity);
            return Ok(());
        }

        output::warn(
            "Attempting to start the host application. Please do not press any keys until it is running...",
            self.verbosity,
        );
        tracing::info!(path = %self.config.host_path, "launching host");
        session
            .client()
            .start_host(
                session.id(),
                StartOptions::from_launcher_path(&self.config.host_path),
            )
            .await
            .map_err(|source| BootstrapError::Launch {
                path: self.config.host_path.clone(),
                source,
            })
    }

    async fn set_working_directory(&mut self, session: &mut Session) -> Result<(), BootstrapError> {
        if self.interactive {
            let question = format!(
                "Current working path is: {}\nDo you want to set a new working path?",
                self.config.working_dir
            );
            if self.prompter.confirm(&question)? {
                self.config.working_dir = self
                    .prompter
                    .read_line("Please choose the new working path:")?;
            }
        }

        let mut path = self.config.working_dir.clone();
        loop {
            let accepted = session
                .change_working_directory(&path)
                .await
                .map_err(|source| BootstrapError::Step {
                    step: BootstrapStep::WorkingDirectory,
                    source,
                })?;

            if accepted {
                output::success(format!("Working path set to: {}", path), self.verbosity);
                return Ok(());
            }

            output::error(format!(
                "unable to set working path '{}'; please check that the path is valid",
                path
            ));
            if !self.interactive {
                return Ok(());
            }

            let retry = self
                .prompter
                .read_line("Enter another working path (leave empty to keep the current one):")?;
            if retry.trim().is_empty() {
                return Ok(());
            }
            path = retry;
        }
    }

    async fn ensure_file_open(&self, session: &Session) -> Result<(), BootstrapError> {
        let file = session.file_name().to_string();
        let loaded = session
            .client()
            .file_is_loaded(session.id(), &file)
            .await
            .map_err(|source| BootstrapError::Step {
                step: BootstrapStep::FileCheck,
                source,
            })?;

        if loaded {
            tracing::debug!(file = %file, "file already open");
            output::debug(format!("{} already open", file), self.verbosity);
            return Ok(());
        }

        let request = OpenRequest {
            file: file.clone(),
            dirname: session.working_dir().map(str::to_string),
            display: true,
        };
        session
            .client()
            .open_file(session.id(), request)
            .await
            .map_err(|source| BootstrapError::FileOpen { file: file.clone(), source })?;

        output::success(format!("Opened {}", file), self.verbosity);
        Ok(())
    }
}
