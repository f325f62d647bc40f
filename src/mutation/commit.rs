//! mutation::commit
//!
//! Applying one collected batch, material choice or path change through the
//! session.
//!
//! # Dimension Batches
//!
//! Dimension batches are committed atomically with respect to validation:
//! every entry is checked before the first `set_dimension` call, so a batch
//! with any non-numeric or negative value sends nothing. Once sending has
//! started, a remote failure stops the batch; entries already sent stay
//! applied and the error names the key that failed.
//!
//! # Text Batches
//!
//! Text values are forwarded exactly as typed, empty strings included.

use thiserror::Error;

use crate::core::types::{ChangeSet, DimensionValue, MaterialIndex, TypeError};
use crate::remote::RemoteError;
use crate::session::Session;

/// A remote operation, for error messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteOp {
    SetDimension(String),
    SetParameter(String),
    Regenerate,
    ListMaterials,
    SetMaterial(String),
    SetWorkingDirectory(String),
}

impl std::fmt::Display for RemoteOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RemoteOp::SetDimension(key) => write!(f, "setting dimension '{}'", key),
            RemoteOp::SetParameter(key) => write!(f, "setting parameter '{}'", key),
            RemoteOp::Regenerate => write!(f, "regenerating the model"),
            RemoteOp::ListMaterials => write!(f, "retrieving the material list"),
            RemoteOp::SetMaterial(name) => write!(f, "setting material '{}'", name),
            RemoteOp::SetWorkingDirectory(path) => {
                write!(f, "setting working path '{}'", path)
            }
        }
    }
}

/// Recoverable errors from the mutation loop.
///
/// Each one aborts only the current batch or selection.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MutationError {
    #[error("unable to set working path '{path}'; please check that the path is valid")]
    Path { path: String },

    #[error("invalid value for '{key}': {reason}")]
    Validation { key: String, reason: TypeError },

    #[error("invalid material selection: {0}")]
    Index(TypeError),

    #[error("no materials available for '{file}'")]
    NoMaterials { file: String },

    #[error("{operation} failed: {source}")]
    Remote {
        operation: RemoteOp,
        source: RemoteError,
    },
}

impl MutationError {
    fn remote(operation: RemoteOp) -> impl FnOnce(RemoteError) -> MutationError {
        move |source| MutationError::Remote { operation, source }
    }
}

/// What a successful commit changed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommitReport {
    /// `(key, value)` pairs as sent
    pub applied: Vec<(String, String)>,
}

/// Validate every entry of a dimension batch, in order.
///
/// # Errors
///
/// `MutationError::Validation` naming the first offending key.
pub fn validate_dimensions(
    changes: &ChangeSet,
) -> Result<Vec<(String, DimensionValue)>, MutationError> {
    changes
        .iter()
        .map(|(key, raw)| {
            DimensionValue::parse(raw)
                .map(|value| (key.to_string(), value))
                .map_err(|reason| MutationError::Validation {
                    key: key.to_string(),
                    reason,
                })
        })
        .collect()
}

/// Commit a dimension batch: validate all, send each, regenerate once.
pub async fn commit_dimensions(
    session: &Session,
    changes: &ChangeSet,
) -> Result<CommitReport, MutationError> {
    let values = validate_dimensions(changes)?;
    let client = session.client();
    let file = session.file_name();

    let mut report = CommitReport::default();
    for (key, value) in values {
        client
            .set_dimension(session.id(), file, &key, value.as_f64())
            .await
            .map_err(MutationError::remote(RemoteOp::SetDimension(key.clone())))?;
        tracing::debug!(key = %key, %value, "dimension set");
        report.applied.push((key, value.to_string()));
    }

    client
        .regenerate(session.id(), file)
        .await
        .map_err(MutationError::remote(RemoteOp::Regenerate))?;
    Ok(report)
}

/// Commit a text batch: send each raw value, regenerate once.
pub async fn commit_text(
    session: &Session,
    changes: &ChangeSet,
) -> Result<CommitReport, MutationError> {
    let client = session.client();
    let file = session.file_name();

    let mut report = CommitReport::default();
    for (key, value) in changes.iter() {
        client
            .set_parameter(session.id(), file, key, value)
            .await
            .map_err(MutationError::remote(RemoteOp::SetParameter(key.to_string())))?;
        tracing::debug!(key, value, "parameter set");
        report.applied.push((key.to_string(), value.to_string()));
    }

    client
        .regenerate(session.id(), file)
        .await
        .map_err(MutationError::remote(RemoteOp::Regenerate))?;
    Ok(report)
}

/// Fetch the live materials list for the session's file.
pub async fn fetch_materials(session: &Session) -> Result<Vec<String>, MutationError> {
    let materials = session
        .client()
        .list_materials(session.id(), session.file_name())
        .await
        .map_err(MutationError::remote(RemoteOp::ListMaterials))?;
    if materials.is_empty() {
        return Err(MutationError::NoMaterials {
            file: session.file_name().to_string(),
        });
    }
    Ok(materials)
}

/// Apply the material picked by `raw_index` from `materials`.
///
/// `materials` must be the list fetched in the same interaction. Nothing is
/// sent unless the index is in range.
pub async fn apply_material(
    session: &Session,
    materials: &[String],
    raw_index: &str,
) -> Result<String, MutationError> {
    let index = MaterialIndex::parse(raw_index, materials.len()).map_err(MutationError::Index)?;
    let material = &materials[index.get()];

    session
        .client()
        .set_current_material(session.id(), session.file_name(), material)
        .await
        .map_err(MutationError::remote(RemoteOp::SetMaterial(material.clone())))?;
    Ok(material.clone())
}

/// Point the server at a new working directory.
///
/// The open file is not touched either way.
pub async fn set_working_path(session: &mut Session, path: &str) -> Result<(), MutationError> {
    let accepted = session
        .change_working_directory(path)
        .await
        .map_err(MutationError::remote(RemoteOp::SetWorkingDirectory(
            path.to_string(),
        )))?;
    if accepted {
        Ok(())
    } else {
        Err(MutationError::Path {
            path: path.to_string(),
        })
    }
}
