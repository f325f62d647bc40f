//! remote::traits
//!
//! Automation client trait definition for talking to the Creoson server.
//!
//! # Design
//!
//! The `AutomationClient` trait is async because every call is a network
//! round trip. All methods return `Result` so callers decide whether a
//! failure is fatal (bootstrap) or recoverable (mutation loop).
//!
//! Every operation other than [`AutomationClient::connect`] takes the
//! [`SessionId`] returned by `connect`. There is no ambient session.
//!
//! # Example
//!
//! ```ignore
//! use modelctl::remote::{AutomationClient, RemoteError};
//!
//! async fn regen(client: &dyn AutomationClient) -> Result<(), RemoteError> {
//!     let session = client.connect().await?;
//!     client.regenerate(&session, "box.prt").await
//! }
//! ```

use async_trait::async_trait;
use thiserror::Error;

/// Errors from remote automation calls.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RemoteError {
    /// The server could not be reached or the transport failed.
    #[error("network error: {0}")]
    Network(String),

    /// The server processed the request and reported a failure.
    #[error("server error: {0}")]
    Server(String),

    /// The response could not be understood.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// A session-scoped call was made before a session existed.
    #[error("not connected")]
    NotConnected,
}

/// Identifier of an established server session.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    /// Wrap a raw session id returned by the server.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the raw id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Options for launching the host application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartOptions {
    /// Directory containing the launcher
    pub start_dir: String,
    /// Launcher file name within `start_dir`
    pub start_command: String,
    /// Number of connection retries the server performs after launch
    pub retries: u32,
    /// Launch in desktop mode
    pub use_desktop: bool,
}

impl StartOptions {
    /// Build launch options from a full launcher path.
    ///
    /// The path is split on its last `/` or `\` into directory and command.
    ///
    /// ```
    /// use modelctl::remote::StartOptions;
    ///
    /// let opts = StartOptions::from_launcher_path("C:/PTC/bin/nitro_proe_remote.bat");
    /// assert_eq!(opts.start_dir, "C:/PTC/bin");
    /// assert_eq!(opts.start_command, "nitro_proe_remote.bat");
    /// assert!(opts.use_desktop);
    /// ```
    pub fn from_launcher_path(path: &str) -> Self {
        let (start_dir, start_command) = match path.rfind(['/', '\\']) {
            Some(idx) => (&path[..idx], &path[idx + 1..]),
            None => ("", path),
        };
        Self {
            start_dir: start_dir.to_string(),
            start_command: start_command.to_string(),
            retries: 0,
            use_desktop: true,
        }
    }
}

/// Request to open a model file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenRequest {
    /// File name to open
    pub file: String,
    /// Directory to open from (server working directory if `None`)
    pub dirname: Option<String>,
    /// Show the model in a window
    pub display: bool,
}

/// Client contract for the remote automation server.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; the application only ever uses a
/// client from one task, but tests share mocks across clones.
///
/// # Error Handling
///
/// - `Network`: server unreachable
/// - `Server`: the host rejected the request (bad path, unknown dimension...)
/// - `Protocol`: unexpected response shape
#[async_trait]
pub trait AutomationClient: Send + Sync {
    /// Get the client name (e.g., "creoson", "mock").
    fn name(&self) -> &'static str;

    /// Establish a session with the server.
    async fn connect(&self) -> Result<SessionId, RemoteError>;

    /// Declare the host version for the rest of the session.
    ///
    /// Not idempotent on the server side. Callers must invoke this at most
    /// once per session.
    async fn declare_compatibility_mode(
        &self,
        session: &SessionId,
        version: u32,
    ) -> Result<(), RemoteError>;

    /// Check whether the host application is running.
    async fn is_host_running(&self, session: &SessionId) -> Result<bool, RemoteError>;

    /// Launch the host application.
    async fn start_host(&self, session: &SessionId, options: StartOptions)
        -> Result<(), RemoteError>;

    /// Change the server working directory.
    ///
    /// Returns `Ok(false)` when the server rejects the path.
    async fn set_working_directory(
        &self,
        session: &SessionId,
        path: &str,
    ) -> Result<bool, RemoteError>;

    /// Check whether a file is resident in the host session.
    async fn file_is_loaded(&self, session: &SessionId, name: &str) -> Result<bool, RemoteError>;

    /// Open a model file.
    async fn open_file(&self, session: &SessionId, request: OpenRequest)
        -> Result<(), RemoteError>;

    /// Set a numeric dimension on a model.
    async fn set_dimension(
        &self,
        session: &SessionId,
        file: &str,
        name: &str,
        value: f64,
    ) -> Result<(), RemoteError>;

    /// Set a string parameter on a model.
    async fn set_parameter(
        &self,
        session: &SessionId,
        file: &str,
        name: &str,
        value: &str,
    ) -> Result<(), RemoteError>;

    /// Regenerate model geometry.
    async fn regenerate(&self, session: &SessionId, file: &str) -> Result<(), RemoteError>;

    /// List materials defined for a model, in server order.
    async fn list_materials(
        &self,
        session: &SessionId,
        file: &str,
    ) -> Result<Vec<String>, RemoteError>;

    /// Assign the current material of a model.
    async fn set_current_material(
        &self,
        session: &SessionId,
        file: &str,
        material: &str,
    ) -> Result<(), RemoteError>;
}
