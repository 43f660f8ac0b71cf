use thiserror::Error;

use crate::config::LoadError;
use crate::domain::BodyError;
use crate::infra::error::InfraError;

use super::fetcher::FetchError;
use super::state::WorkerState;

/// Errors that abort an install attempt.
///
/// Precache population is all-or-nothing, so any variant means no
/// namespace content was retained.
#[derive(Debug, Error)]
pub enum InstallError {
    #[error("invalid precache path `{path}`: {reason}")]
    InvalidPath { path: String, reason: String },
    #[error("precache fetch failed for `{path}`: {source}")]
    Fetch {
        path: String,
        #[source]
        source: FetchError,
    },
    #[error("precache response for `{path}` is not storable (status {status})")]
    NotStorable { path: String, status: u16 },
    #[error("failed to snapshot precache response for `{path}`: {source}")]
    Snapshot {
        path: String,
        #[source]
        source: BodyError,
    },
}

impl InstallError {
    pub fn invalid_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// The precache path the error names.
    pub fn path(&self) -> &str {
        match self {
            Self::InvalidPath { path, .. }
            | Self::Fetch { path, .. }
            | Self::NotStorable { path, .. }
            | Self::Snapshot { path, .. } => path,
        }
    }
}

/// Top-level worker errors; also the application error of the binary.
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("invalid worker state: expected {expected}, got {actual}")]
    InvalidState {
        expected: &'static str,
        actual: WorkerState,
    },
    #[error("install failed: {0}")]
    Install(#[from] InstallError),
    #[error(transparent)]
    Body(#[from] BodyError),
    #[error(transparent)]
    Config(#[from] LoadError),
    #[error(transparent)]
    Infra(#[from] InfraError),
}
