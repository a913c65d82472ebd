//! Tracked artifacts and their derived state.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::id::ArtifactId;

/// A release version as seen by aim.
///
/// `None` means "unknown", which is distinct from an empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRef {
    /// Human-readable release tag, e.g. `v2.0`.
    #[serde(default)]
    pub tag: Option<String>,
    /// Direct download URL of the installable asset.
    #[serde(default)]
    pub url: Option<String>,
}

impl VersionRef {
    /// A version with both fields known.
    pub fn new(tag: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            tag: Some(tag.into()),
            url: Some(url.into()),
        }
    }

    /// A version whose tag is known but which has no installable asset.
    pub fn tag_only(tag: impl Into<String>) -> Self {
        Self {
            tag: Some(tag.into()),
            url: None,
        }
    }

    /// Nothing known.
    pub fn unknown() -> Self {
        Self::default()
    }

    /// True when neither tag nor URL is known.
    pub fn is_unknown(&self) -> bool {
        self.tag.is_none() && self.url.is_none()
    }

    /// The tag, or `-` for display.
    pub fn tag_or_dash(&self) -> &str {
        self.tag.as_deref().unwrap_or("-")
    }
}

/// Install state derived from an [`AppEntry`] and the filesystem.
///
/// Never persisted; recompute it with [`DerivedState::evaluate`] whenever it is needed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DerivedState {
    /// The artifact file exists at the entry's path.
    pub installed: bool,
    /// A known upstream asset differs from the installed one.
    pub needs_update: bool,
}

impl DerivedState {
    /// Evaluate the state of `entry` against the filesystem.
    pub fn evaluate(entry: &AppEntry) -> Self {
        Self::from_parts(entry.path.exists(), &entry.current, &entry.latest)
    }

    /// Evaluate from already-known parts, without touching the filesystem.
    ///
    /// The download URL is the identity comparator: a release whose tag was
    /// reused or whose asset moved still counts as different.
    pub fn from_parts(installed: bool, current: &VersionRef, latest: &VersionRef) -> Self {
        let needs_update = latest
            .url
            .as_ref()
            .is_some_and(|latest_url| current.url.as_ref() != Some(latest_url));
        Self {
            installed,
            needs_update,
        }
    }
}

/// One tracked artifact.
///
/// `current` changes only through [`AppEntry::commit_latest`], which the
/// download pipeline calls after a complete write; `latest` changes only
/// through [`AppEntry::record_latest`], which carries the resolver's answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppEntry {
    id: ArtifactId,
    name: String,
    path: PathBuf,
    current: VersionRef,
    latest: VersionRef,
}

impl AppEntry {
    /// A fresh entry with the default name and a path under `install_dir`.
    pub fn new(id: ArtifactId, install_dir: &Path) -> Self {
        let name = id.sanitized();
        let path = install_dir.join(id.default_file_name());
        Self {
            id,
            name,
            path,
            current: VersionRef::unknown(),
            latest: VersionRef::unknown(),
        }
    }

    /// Rebuild an entry from persisted fields.
    pub fn restore(
        id: ArtifactId,
        name: String,
        path: PathBuf,
        current: VersionRef,
        latest: VersionRef,
    ) -> Self {
        Self {
            id,
            name,
            path,
            current,
            latest,
        }
    }

    /// The immutable key.
    pub fn id(&self) -> &ArtifactId {
        &self.id
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Absolute destination of the installed artifact.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Version believed installed on disk.
    pub fn current(&self) -> &VersionRef {
        &self.current
    }

    /// Version last observed upstream.
    pub fn latest(&self) -> &VersionRef {
        &self.latest
    }

    /// Recompute the derived state.
    pub fn state(&self) -> DerivedState {
        DerivedState::evaluate(self)
    }

    /// Store the result of a release check.
    pub fn record_latest(&mut self, latest: VersionRef) {
        self.latest = latest;
    }

    /// Mark `latest` as installed.
    pub fn commit_latest(&mut self) {
        self.current = self.latest.clone();
    }
}
