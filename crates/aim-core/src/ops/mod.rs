//! Update Orchestrator and its outcome types.

mod orchestrator;

pub use orchestrator::Orchestrator;

use std::fmt;

use aim_schema::ArtifactId;
use thiserror::Error;

use crate::io::DownloadError;
use crate::registry::RegistryError;

#[derive(Error, Debug)]
pub enum OpError {
    #[error("{0} is already tracked")]
    DuplicateArtifact(ArtifactId),

    #[error("{id} would install to {path}, which {holder} already uses")]
    PathConflict {
        id: ArtifactId,
        path: std::path::PathBuf,
        holder: ArtifactId,
    },

    #[error("{0} is not tracked")]
    ArtifactNotTracked(ArtifactId),

    #[error("Download failed (retry later): {0}")]
    Download(#[from] DownloadError),

    #[error("Failed to delete {path}: {source}")]
    Remove {
        path: std::path::PathBuf,
        source: std::io::Error,
    },

    #[error("Registry could not be saved: {0}")]
    Persistence(#[from] RegistryError),
}

impl OpError {
    /// Only a registry failure ends the run; everything else is per-id.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Persistence(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Installed file already matches the latest known asset.
    UpToDate,
    /// No installable asset is known upstream.
    Unavailable,
    /// A new asset was downloaded and committed.
    Updated { tag: Option<String>, bytes: u64 },
}

impl fmt::Display for UpdateOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UpToDate => f.write_str("up to date"),
            Self::Unavailable => f.write_str("no installable release"),
            Self::Updated { tag, .. } => {
                write!(f, "updated to {}", tag.as_deref().unwrap_or("unknown tag"))
            }
        }
    }
}

/// What `remove` found on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    /// The artifact file was deleted along with the record.
    Deleted,
    /// Only the record existed.
    RecordOnly,
}

/// Per-id results of a batch, in processing order.
#[derive(Debug)]
pub struct BatchReport<T> {
    pub results: Vec<(ArtifactId, Result<T, OpError>)>,
}

impl<T> Default for BatchReport<T> {
    fn default() -> Self {
        Self {
            results: Vec::new(),
        }
    }
}

impl<T> BatchReport<T> {
    pub fn push(&mut self, id: ArtifactId, result: Result<T, OpError>) {
        self.results.push((id, result));
    }

    pub fn failures(&self) -> impl Iterator<Item = (&ArtifactId, &OpError)> {
        self.results
            .iter()
            .filter_map(|(id, r)| r.as_ref().err().map(|e| (id, e)))
    }

    pub fn failed(&self) -> usize {
        self.failures().count()
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    pub fn get(&self, id: &str) -> Option<&Result<T, OpError>> {
        self.results
            .iter()
            .find(|(i, _)| i.as_str() == id)
            .map(|(_, r)| r)
    }
}
