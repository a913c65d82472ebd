//! Registry Store: the persistent `id -> AppEntry` mapping.
//!
//! The whole document is rewritten on every save, through a temp file in the
//! same directory that is renamed over the target. A crash mid-save leaves the
//! previous registry intact.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use aim_schema::{AppEntry, ArtifactId, IdError, VersionRef};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::paths::registry_path;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Malformed registry {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid id in registry {path}: {source}")]
    Locate { path: PathBuf, source: IdError },
}

/// In-memory registry. Owned by the caller for the lifetime of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registry {
    entries: BTreeMap<ArtifactId, AppEntry>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&AppEntry> {
        self.entries.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut AppEntry> {
        self.entries.get_mut(id)
    }

    /// Add a new entry. An existing id is never overwritten; the rejected
    /// entry is handed back.
    pub fn insert(&mut self, entry: AppEntry) -> Result<(), AppEntry> {
        if self.entries.contains_key(entry.id()) {
            return Err(entry);
        }
        self.entries.insert(entry.id().clone(), entry);
        Ok(())
    }

    pub fn remove(&mut self, id: &str) -> Option<AppEntry> {
        self.entries.remove(id)
    }

    /// Tracked ids in sorted order.
    pub fn ids(&self) -> Vec<ArtifactId> {
        self.entries.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AppEntry> {
        self.entries.values()
    }
}

/// Persisted record. The id is the map key; every field may be absent.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct StoredEntry {
    name: Option<String>,
    path: Option<PathBuf>,
    current: VersionRef,
    latest: VersionRef,
}

impl From<&AppEntry> for StoredEntry {
    fn from(entry: &AppEntry) -> Self {
        Self {
            name: Some(entry.name().to_string()),
            path: Some(entry.path().to_path_buf()),
            current: entry.current().clone(),
            latest: entry.latest().clone(),
        }
    }
}

/// Loads and saves a [`Registry`] at a fixed path.
#[derive(Debug, Clone)]
pub struct RegistryStore {
    path: PathBuf,
    install_dir: PathBuf,
}

impl RegistryStore {
    /// Store at `<install_dir>/registry.json`.
    pub fn in_dir(install_dir: &Path) -> Self {
        Self {
            path: registry_path(install_dir),
            install_dir: install_dir.to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory new entries are installed into.
    pub fn install_dir(&self) -> &Path {
        &self.install_dir
    }

    /// Read the registry. A missing file yields an empty registry.
    pub fn load(&self) -> Result<Registry, RegistryError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No registry at {}, starting empty", self.path.display());
                return Ok(Registry::new());
            }
            Err(source) => {
                return Err(RegistryError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        let raw: BTreeMap<String, StoredEntry> =
            serde_json::from_str(&content).map_err(|source| RegistryError::Json {
                path: self.path.clone(),
                source,
            })?;

        let mut registry = Registry::new();
        for (key, stored) in raw {
            let id = ArtifactId::parse(&key).map_err(|source| RegistryError::Locate {
                path: self.path.clone(),
                source,
            })?;
            let defaults = AppEntry::new(id.clone(), &self.install_dir);
            let entry = AppEntry::restore(
                id,
                stored.name.unwrap_or_else(|| defaults.name().to_string()),
                stored.path.unwrap_or_else(|| defaults.path().to_path_buf()),
                stored.current,
                stored.latest,
            );
            registry.entries.insert(entry.id().clone(), entry);
        }

        debug!("Loaded {} entries from {}", registry.len(), self.path.display());
        Ok(registry)
    }

    /// Rewrite the whole registry.
    pub fn save(&self, registry: &Registry) -> Result<(), RegistryError> {
        let io_err = |source| RegistryError::Io {
            path: self.path.clone(),
            source,
        };

        let doc: BTreeMap<&str, StoredEntry> = registry
            .entries
            .iter()
            .map(|(id, entry)| (id.as_str(), StoredEntry::from(entry)))
            .collect();
        let json = serde_json::to_string_pretty(&doc).map_err(|source| RegistryError::Json {
            path: self.path.clone(),
            source,
        })?;

        let parent = self.path.parent().unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(parent).map_err(io_err)?;

        let mut tmp = tempfile::NamedTempFile::new_in(parent).map_err(io_err)?;
        tmp.write_all(json.as_bytes()).map_err(io_err)?;
        tmp.write_all(b"\n").map_err(io_err)?;
        tmp.as_file().sync_all().map_err(io_err)?;
        tmp.persist(&self.path).map_err(|e| io_err(e.error))?;

        debug!("Saved {} entries to {}", registry.len(), self.path.display());
        Ok(())
    }
}
