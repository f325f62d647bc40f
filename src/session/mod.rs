//! session
//!
//! The live connection to the automation server and the bootstrap sequence
//! that produces it.
//!
//! # Invariants
//!
//! - A [`Session`] only exists after connect, host liveness/launch and file
//!   open have all succeeded; it is constructed by [`Bootstrapper`] alone
//! - Compatibility mode is declared at most once per session
//! - `working_dir` is always a directory the server accepted (or `None` if it
//!   has accepted none yet)
//!
//! # Example
//!
//! ```ignore
//! use modelctl::session::Bootstrapper;
//! use modelctl::remote::creoson::CreosonClient;
//!
//! let session = Bootstrapper::new(config, &mut prompter)
//!     .interactive(false)
//!     .run(Box::new(CreosonClient::new(&url)))
//!     .await?;
//! println!("editing {}", session.file_name());
//! ```

mod bootstrap;

pub use bootstrap::{BootstrapError, BootstrapStep, Bootstrapper, COMPAT_MODE_MIN_VERSION};

use crate::remote::{AutomationClient, RemoteError, SessionId};

/// A ready-to-use server session.
pub struct Session {
    /// Client the session was established on
    client: Box<dyn AutomationClient>,
    /// Server session id
    id: SessionId,
    /// Declared compatibility version, if any
    compat_mode: Option<u32>,
    /// Last working directory the server accepted
    working_dir: Option<String>,
    /// Target model
    file_name: String,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("client", &self.client.name())
            .field("id", &self.id)
            .field("compat_mode", &self.compat_mode)
            .field("working_dir", &self.working_dir)
            .field("file_name", &self.file_name)
            .finish()
    }
}

impl Session {
    pub(crate) fn new(
        client: Box<dyn AutomationClient>,
        id: SessionId,
        file_name: impl Into<String>,
    ) -> Self {
        Self {
            client,
            id,
            compat_mode: None,
            working_dir: None,
            file_name: file_name.into(),
        }
    }

    /// The client every remote call goes through.
    pub fn client(&self) -> &dyn AutomationClient {
        self.client.as_ref()
    }

    /// Server session id.
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Declared compatibility version.
    pub fn compat_mode(&self) -> Option<u32> {
        self.compat_mode
    }

    /// Last working directory the server accepted.
    pub fn working_dir(&self) -> Option<&str> {
        self.working_dir.as_deref()
    }

    /// Target model file.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Declare the compatibility version unless one is already declared.
    ///
    /// Returns `Ok(false)` without contacting the server if the mode was
    /// already pinned.
    pub(crate) async fn pin_compatibility_mode(&mut self, version: u32) -> Result<bool, RemoteError> {
        if self.compat_mode.is_some() {
            tracing::debug!(version, "compatibility mode already pinned");
            return Ok(false);
        }
        self.client
            .declare_compatibility_mode(&self.id, version)
            .await?;
        self.compat_mode = Some(version);
        Ok(true)
    }

    /// Point the server at a new working directory.
    ///
    /// Returns `Ok(false)` if the server rejected the path; the previous
    /// directory stays in effect and the open file is untouched.
    pub async fn change_working_directory(&mut self, path: &str) -> Result<bool, RemoteError> {
        let accepted = self.client.set_working_directory(&self.id, path).await?;
        if accepted {
            self.working_dir = Some(path.to_string());
        }
        Ok(accepted)
    }
}
