//! remote::mock
//!
//! Mock automation client for deterministic testing.
//!
//! # Design
//!
//! The mock client models just enough of a Creo session to exercise the
//! bootstrapper and the mutation loop: a host that may or may not be
//! running, a set of directories the server accepts, loaded files, model
//! dimensions and parameters, and a materials list. Every call is recorded
//! and any single operation can be configured to fail.
//!
//! # Example
//!
//! ```
//! use modelctl::remote::mock::MockClient;
//! use modelctl::remote::AutomationClient;
//!
//! # tokio_test::block_on(async {
//! let client = MockClient::new().with_materials(vec!["Steel".into()]);
//! let session = client.connect().await.unwrap();
//!
//! client.set_current_material(&session, "box.prt", "Steel").await.unwrap();
//! assert_eq!(client.current_material().as_deref(), Some("Steel"));
//! # });
//! ```

use async_trait::async_trait;
use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex};

use super::traits::{AutomationClient, OpenRequest, RemoteError, SessionId, StartOptions};

/// Mock automation client for testing.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping; clones share state.
#[derive(Debug, Clone)]
pub struct MockClient {
    inner: Arc<Mutex<MockClientInner>>,
}

#[derive(Debug)]
struct MockClientInner {
    /// Sessions handed out so far.
    sessions: u32,
    /// Whether the host application is running.
    host_running: bool,
    /// Whether `start_host` succeeds in bringing the host up.
    host_launches: bool,
    /// Directories `set_working_directory` accepts (`None` accepts all).
    valid_dirs: Option<HashSet<String>>,
    /// Current working directory.
    working_dir: Option<String>,
    /// Files resident in the session.
    loaded_files: HashSet<String>,
    /// Files that can be opened (`None` allows all).
    openable_files: Option<HashSet<String>>,
    /// Dimension values keyed by name.
    dimensions: BTreeMap<String, f64>,
    /// Parameter values keyed by name.
    parameters: BTreeMap<String, String>,
    /// Materials for every file.
    materials: Vec<String>,
    /// Current material.
    current_material: Option<String>,
    /// Declared compatibility version.
    compat_version: Option<u32>,
    /// Operation to fail on.
    fail_on: Option<FailOn>,
    /// Failures left before `fail_on` clears itself (`None` fails forever).
    fail_remaining: Option<usize>,
    /// Recorded operations.
    operations: Vec<MockOperation>,
}

/// Configuration for which operation should fail.
#[derive(Debug, Clone)]
pub enum FailOn {
    Connect(RemoteError),
    DeclareCompatibilityMode(RemoteError),
    IsHostRunning(RemoteError),
    StartHost(RemoteError),
    SetWorkingDirectory(RemoteError),
    FileIsLoaded(RemoteError),
    OpenFile(RemoteError),
    /// Fail `set_dimension` only for the named dimension.
    SetDimension { name: String, error: RemoteError },
    SetParameter(RemoteError),
    Regenerate(RemoteError),
    ListMaterials(RemoteError),
    SetCurrentMaterial(RemoteError),
}

/// Recorded operation for test verification.
#[derive(Debug, Clone, PartialEq)]
pub enum MockOperation {
    Connect,
    DeclareCompatibilityMode { version: u32 },
    IsHostRunning,
    StartHost { options: StartOptions },
    SetWorkingDirectory { path: String },
    FileIsLoaded { name: String },
    OpenFile { request: OpenRequest },
    SetDimension { file: String, name: String, value: f64 },
    SetParameter { file: String, name: String, value: String },
    Regenerate { file: String },
    ListMaterials { file: String },
    SetCurrentMaterial { file: String, material: String },
}

impl MockClient {
    /// Create a mock with a running host, no loaded files, and no materials.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(MockClientInner {
                sessions: 0,
                host_running: true,
                host_launches: true,
                valid_dirs: None,
                working_dir: None,
                loaded_files: HashSet::new(),
                openable_files: None,
                dimensions: BTreeMap::new(),
                parameters: BTreeMap::new(),
                materials: Vec::new(),
                current_material: None,
                compat_version: None,
                fail_on: None,
                fail_remaining: None,
                operations: Vec::new(),
            })),
        }
    }

    /// Set whether the host is running, and whether launching it works.
    pub fn with_host(self, running: bool, launches: bool) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.host_running = running;
            inner.host_launches = launches;
        }
        self
    }

    /// Restrict the directories the server accepts.
    pub fn with_valid_dirs(self, dirs: &[&str]) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.valid_dirs = Some(dirs.iter().map(|d| d.to_string()).collect());
        }
        self
    }

    /// Mark a file as already resident in the session.
    pub fn with_loaded_file(self, name: &str) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.loaded_files.insert(name.to_string());
        }
        self
    }

    /// Restrict the files that can be opened.
    pub fn with_openable_files(self, names: &[&str]) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.openable_files = Some(names.iter().map(|n| n.to_string()).collect());
        }
        self
    }

    /// Set the materials list returned for every file.
    pub fn with_materials(self, materials: Vec<String>) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.materials = materials;
        }
        self
    }

    /// Configure the mock to fail on a specific operation.
    pub fn fail_on(self, fail_on: FailOn) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.fail_on = Some(fail_on);
            inner.fail_remaining = None;
        }
        self
    }

    /// Fail the next matching operation only; later ones succeed.
    pub fn fail_once(self, fail_on: FailOn) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.fail_on = Some(fail_on);
            inner.fail_remaining = Some(1);
        }
        self
    }

    /// Clear the failure configuration.
    pub fn clear_fail_on(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_on = None;
        inner.fail_remaining = None;
    }

    /// Get all recorded operations.
    pub fn operations(&self) -> Vec<MockOperation> {
        let inner = self.inner.lock().unwrap();
        inner.operations.clone()
    }

    /// Clear recorded operations.
    pub fn clear_operations(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.operations.clear();
    }

    /// Count recorded operations matching a predicate.
    pub fn count(&self, pred: impl Fn(&MockOperation) -> bool) -> usize {
        let inner = self.inner.lock().unwrap();
        inner.operations.iter().filter(|op| pred(op)).count()
    }

    /// Current value of a dimension.
    pub fn dimension(&self, name: &str) -> Option<f64> {
        let inner = self.inner.lock().unwrap();
        inner.dimensions.get(name).copied()
    }

    /// Current value of a parameter.
    pub fn parameter(&self, name: &str) -> Option<String> {
        let inner = self.inner.lock().unwrap();
        inner.parameters.get(name).cloned()
    }

    /// Current material.
    pub fn current_material(&self) -> Option<String> {
        let inner = self.inner.lock().unwrap();
        inner.current_material.clone()
    }

    /// Current working directory.
    pub fn working_dir(&self) -> Option<String> {
        let inner = self.inner.lock().unwrap();
        inner.working_dir.clone()
    }

    /// Whether a file is loaded.
    pub fn is_loaded(&self, name: &str) -> bool {
        let inner = self.inner.lock().unwrap();
        inner.loaded_files.contains(name)
    }

    /// Whether the host is running.
    pub fn host_running(&self) -> bool {
        let inner = self.inner.lock().unwrap();
        inner.host_running
    }

    fn record(&self, op: MockOperation) {
        let mut inner = self.inner.lock().unwrap();
        inner.operations.push(op);
    }

    /// Check if we should fail and return the error if so.
    fn check_fail(&self, expected: &str, dimension: Option<&str>) -> Result<(), RemoteError> {
        let mut inner = self.inner.lock().unwrap();
        let hit = match &inner.fail_on {
            Some(FailOn::Connect(e)) if expected == "connect" => Some(e),
            Some(FailOn::DeclareCompatibilityMode(e)) if expected == "declare" => Some(e),
            Some(FailOn::IsHostRunning(e)) if expected == "is_host_running" => Some(e),
            Some(FailOn::StartHost(e)) if expected == "start_host" => Some(e),
            Some(FailOn::SetWorkingDirectory(e)) if expected == "cd" => Some(e),
            Some(FailOn::FileIsLoaded(e)) if expected == "file_is_loaded" => Some(e),
            Some(FailOn::OpenFile(e)) if expected == "open_file" => Some(e),
            Some(FailOn::SetDimension { name, error })
                if expected == "set_dimension" && dimension == Some(name.as_str()) =>
            {
                Some(error)
            }
            Some(FailOn::SetParameter(e)) if expected == "set_parameter" => Some(e),
            Some(FailOn::Regenerate(e)) if expected == "regenerate" => Some(e),
            Some(FailOn::ListMaterials(e)) if expected == "list_materials" => Some(e),
            Some(FailOn::SetCurrentMaterial(e)) if expected == "set_current_material" => Some(e),
            _ => None,
        }
        .cloned();
        let Some(error) = hit else {
            return Ok(());
        };
        match inner.fail_remaining {
            Some(n) if n <= 1 => {
                inner.fail_on = None;
                inner.fail_remaining = None;
            }
            Some(n) => inner.fail_remaining = Some(n - 1),
            None => {}
        }
        Err(error)
    }

    fn check_session(&self, session: &SessionId) -> Result<(), RemoteError> {
        let inner = self.inner.lock().unwrap();
        let known = session
            .as_str()
            .strip_prefix("mock-")
            .and_then(|n| n.parse::<u32>().ok())
            .is_some_and(|n| n >= 1 && n <= inner.sessions);
        if known {
            Ok(())
        } else {
            Err(RemoteError::NotConnected)
        }
    }
}

impl Default for MockClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AutomationClient for MockClient {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn connect(&self) -> Result<SessionId, RemoteError> {
        self.record(MockOperation::Connect);
        self.check_fail("connect", None)?;

        let mut inner = self.inner.lock().unwrap();
        inner.sessions += 1;
        Ok(SessionId::new(format!("mock-{}", inner.sessions)))
    }

    async fn declare_compatibility_mode(
        &self,
        session: &SessionId,
        version: u32,
    ) -> Result<(), RemoteError> {
        self.record(MockOperation::DeclareCompatibilityMode { version });
        self.check_session(session)?;
        self.check_fail("declare", None)?;

        let mut inner = self.inner.lock().unwrap();
        inner.compat_version = Some(version);
        Ok(())
    }

    async fn is_host_running(&self, session: &SessionId) -> Result<bool, RemoteError> {
        self.record(MockOperation::IsHostRunning);
        self.check_session(session)?;
        self.check_fail("is_host_running", None)?;

        Ok(self.host_running())
    }

    async fn start_host(
        &self,
        session: &SessionId,
        options: StartOptions,
    ) -> Result<(), RemoteError> {
        self.record(MockOperation::StartHost { options });
        self.check_session(session)?;
        self.check_fail("start_host", None)?;

        let mut inner = self.inner.lock().unwrap();
        if !inner.host_launches {
            return Err(RemoteError::Server("host failed to start".into()));
        }
        inner.host_running = true;
        Ok(())
    }

    async fn set_working_directory(
        &self,
        session: &SessionId,
        path: &str,
    ) -> Result<bool, RemoteError> {
        self.record(MockOperation::SetWorkingDirectory {
            path: path.to_string(),
        });
        self.check_session(session)?;
        self.check_fail("cd", None)?;

        let mut inner = self.inner.lock().unwrap();
        let accepted = inner
            .valid_dirs
            .as_ref()
            .map_or(true, |dirs| dirs.contains(path));
        if accepted {
            inner.working_dir = Some(path.to_string());
        }
        Ok(accepted)
    }

    async fn file_is_loaded(&self, session: &SessionId, name: &str) -> Result<bool, RemoteError> {
        self.record(MockOperation::FileIsLoaded {
            name: name.to_string(),
        });
        self.check_session(session)?;
        self.check_fail("file_is_loaded", None)?;

        Ok(self.is_loaded(name))
    }

    async fn open_file(
        &self,
        session: &SessionId,
        request: OpenRequest,
    ) -> Result<(), RemoteError> {
        self.record(MockOperation::OpenFile {
            request: request.clone(),
        });
        self.check_session(session)?;
        self.check_fail("open_file", None)?;

        let mut inner = self.inner.lock().unwrap();
        let openable = inner
            .openable_files
            .as_ref()
            .map_or(true, |files| files.contains(&request.file));
        if !openable {
            return Err(RemoteError::Server(format!("no file found: {}", request.file)));
        }
        inner.loaded_files.insert(request.file);
        Ok(())
    }

    async fn set_dimension(
        &self,
        session: &SessionId,
        file: &str,
        name: &str,
        value: f64,
    ) -> Result<(), RemoteError> {
        self.record(MockOperation::SetDimension {
            file: file.to_string(),
            name: name.to_string(),
            value,
        });
        self.check_session(session)?;
        self.check_fail("set_dimension", Some(name))?;

        let mut inner = self.inner.lock().unwrap();
        inner.dimensions.insert(name.to_string(), value);
        Ok(())
    }

    async fn set_parameter(
        &self,
        session: &SessionId,
        file: &str,
        name: &str,
        value: &str,
    ) -> Result<(), RemoteError> {
        self.record(MockOperation::SetParameter {
            file: file.to_string(),
            name: name.to_string(),
            value: value.to_string(),
        });
        self.check_session(session)?;
        self.check_fail("set_parameter", None)?;

        let mut inner = self.inner.lock().unwrap();
        inner.parameters.insert(name.to_string(), value.to_string());
        Ok(())
    }

    async fn regenerate(&self, session: &SessionId, file: &str) -> Result<(), RemoteError> {
        self.record(MockOperation::Regenerate {
            file: file.to_string(),
        });
        self.check_session(session)?;
        self.check_fail("regenerate", None)
    }

    async fn list_materials(
        &self,
        session: &SessionId,
        file: &str,
    ) -> Result<Vec<String>, RemoteError> {
        self.record(MockOperation::ListMaterials {
            file: file.to_string(),
        });
        self.check_session(session)?;
        self.check_fail("list_materials", None)?;

        let inner = self.inner.lock().unwrap();
        Ok(inner.materials.clone())
    }

    async fn set_current_material(
        &self,
        session: &SessionId,
        file: &str,
        material: &str,
    ) -> Result<(), RemoteError> {
        self.record(MockOperation::SetCurrentMaterial {
            file: file.to_string(),
            material: material.to_string(),
        });
        self.check_session(session)?;
        self.check_fail("set_current_material", None)?;

        let mut inner = self.inner.lock().unwrap();
        if !inner.materials.iter().any(|m| m == material) {
            return Err(RemoteError::Server(format!("unknown material: {}", material)));
        }
        inner.current_material = Some(material.to_string());
        Ok(())
    }
}
