//! Per-artifact check -> decide -> download -> commit sequencing.
//!
//! Single-id operations mutate the in-memory [`Registry`] only. The batch
//! forms process ids one after another, isolate per-id failures, and save the
//! registry once at the end of the batch when anything changed. A save
//! failure is the only error a batch returns.

use std::path::Path;

use aim_schema::{AppEntry, ArtifactId, DerivedState};
use tracing::{info, warn};

use super::{BatchReport, OpError, RemoveOutcome, UpdateOutcome};
use crate::io::Downloader;
use crate::registry::{Registry, RegistryStore};
use crate::reporter::Reporter;
use crate::resolve::{ReleaseResolver, resolve};

pub struct Orchestrator<'a> {
    resolver: &'a dyn ReleaseResolver,
    downloader: &'a Downloader,
    store: &'a RegistryStore,
    reporter: &'a dyn Reporter,
}

impl std::fmt::Debug for Orchestrator<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        resolver: &'a dyn ReleaseResolver,
        downloader: &'a Downloader,
        store: &'a RegistryStore,
        reporter: &'a dyn Reporter,
    ) -> Self {
        Self {
            resolver,
            downloader,
            store,
            reporter,
        }
    }

    fn install_dir(&self) -> &Path {
        self.store.install_dir()
    }

    /// Refresh `latest` from the resolver. Soft failures record the fallback.
    pub async fn check(
        &self,
        registry: &mut Registry,
        id: &ArtifactId,
    ) -> Result<DerivedState, OpError> {
        let entry = tracked(registry, id)?;
        self.refresh(entry).await;
        Ok(entry.state())
    }

    /// Download `latest` if it differs from `current`.
    pub async fn update(
        &self,
        registry: &mut Registry,
        id: &ArtifactId,
    ) -> Result<UpdateOutcome, OpError> {
        let entry = tracked(registry, id)?;
        self.apply(entry).await
    }

    /// Track a new id, then check and update it. An existing entry is left
    /// untouched, and so is an entry whose file the new id would overwrite.
    pub async fn install(
        &self,
        registry: &mut Registry,
        id: &ArtifactId,
    ) -> Result<UpdateOutcome, OpError> {
        let entry = AppEntry::new(id.clone(), self.install_dir());
        if let Some(holder) = registry
            .iter()
            .find(|other| other.id() != id && other.path() == entry.path())
        {
            return Err(OpError::PathConflict {
                id: id.clone(),
                path: entry.path().to_path_buf(),
                holder: holder.id().clone(),
            });
        }
        registry
            .insert(entry)
            .map_err(|rejected| OpError::DuplicateArtifact(rejected.id().clone()))?;
        info!("{id}: now tracked");

        self.check(registry, id).await?;
        self.update(registry, id).await
    }

    /// Delete the artifact file if present, then the record. If the file
    /// cannot be deleted the record is kept.
    pub fn remove(&self, registry: &mut Registry, id: &ArtifactId) -> Result<RemoveOutcome, OpError> {
        let entry = registry
            .get(id.as_str())
            .ok_or_else(|| OpError::ArtifactNotTracked(id.clone()))?;

        let path = entry.path().to_path_buf();
        let outcome = match std::fs::remove_file(&path) {
            Ok(()) => RemoveOutcome::Deleted,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => RemoveOutcome::RecordOnly,
            Err(source) => return Err(OpError::Remove { path, source }),
        };
        let part = crate::paths::partial_path(&path);
        if let Err(e) = std::fs::remove_file(&part)
            && e.kind() != std::io::ErrorKind::NotFound
        {
            warn!("{id}: could not delete {}: {e}", part.display());
        }

        registry.remove(id.as_str());
        info!("{id}: removed ({outcome:?})");
        Ok(outcome)
    }

    async fn refresh(&self, entry: &mut AppEntry) {
        self.reporter.checking(entry.id());
        let latest = match resolve(self.resolver, entry.id()).await {
            Ok(version) => version,
            Err(e) => {
                warn!("{}: {e}", entry.id());
                e.fallback()
            }
        };
        entry.record_latest(latest);
    }

    async fn apply(&self, entry: &mut AppEntry) -> Result<UpdateOutcome, OpError> {
        if !entry.state().needs_update {
            return Ok(if entry.latest().url.is_none() {
                UpdateOutcome::Unavailable
            } else {
                UpdateOutcome::UpToDate
            });
        }

        let bytes = self.downloader.download(entry, self.reporter).await?;
        Ok(UpdateOutcome::Updated {
            tag: entry.current().tag.clone(),
            bytes,
        })
    }

    // Batch forms

    /// Check `ids`, or every tracked id when `ids` is empty.
    pub async fn check_many(
        &self,
        registry: &mut Registry,
        ids: &[ArtifactId],
    ) -> Result<BatchReport<DerivedState>, OpError> {
        let before = registry.clone();
        self.reporter.section("Checking");

        let mut report = BatchReport::default();
        for id in targets(registry, ids) {
            let result = self.check(registry, &id).await;
            self.report(registry, &id, &result, |_| "checked".to_string());
            report.push(id, result);
        }

        self.persist(registry, &before)?;
        Ok(report)
    }

    /// Update `ids`, or every tracked id when `ids` is empty.
    pub async fn update_many(
        &self,
        registry: &mut Registry,
        ids: &[ArtifactId],
    ) -> Result<BatchReport<UpdateOutcome>, OpError> {
        let before = registry.clone();
        self.reporter.section("Updating");

        let mut report = BatchReport::default();
        for id in targets(registry, ids) {
            let result = self.update(registry, &id).await;
            self.report(registry, &id, &result, ToString::to_string);
            report.push(id, result);
        }

        self.persist(registry, &before)?;
        Ok(report)
    }

    /// Install each of `ids`.
    pub async fn install_many(
        &self,
        registry: &mut Registry,
        ids: &[ArtifactId],
    ) -> Result<BatchReport<UpdateOutcome>, OpError> {
        let before = registry.clone();
        self.reporter.section("Installing");

        let mut report = BatchReport::default();
        for id in ids {
            let result = self.install(registry, id).await;
            self.report(registry, id, &result, ToString::to_string);
            report.push(id.clone(), result);
        }

        self.persist(registry, &before)?;
        Ok(report)
    }

    /// Remove each of `ids`.
    pub fn remove_many(
        &self,
        registry: &mut Registry,
        ids: &[ArtifactId],
    ) -> Result<BatchReport<RemoveOutcome>, OpError> {
        let before = registry.clone();
        self.reporter.section("Removing");

        let mut report = BatchReport::default();
        for id in ids {
            let result = self.remove(registry, id);
            match &result {
                Ok(RemoveOutcome::Deleted) => self.reporter.done(id, "removed"),
                Ok(RemoveOutcome::RecordOnly) => self.reporter.done(id, "untracked"),
                Err(e) => self.reporter.failed(id, &e.to_string()),
            }
            report.push(id.clone(), result);
        }

        self.persist(registry, &before)?;
        Ok(report)
    }

    /// Check then update every tracked id.
    pub async fn auto(
        &self,
        registry: &mut Registry,
    ) -> Result<BatchReport<UpdateOutcome>, OpError> {
        let before = registry.clone();
        self.reporter.section("Auto-updating");

        let mut report = BatchReport::default();
        for id in registry.ids() {
            let result = match self.check(registry, &id).await {
                Ok(_) => self.update(registry, &id).await,
                Err(e) => Err(e),
            };
            self.report(registry, &id, &result, ToString::to_string);
            report.push(id, result);
        }

        self.persist(registry, &before)?;
        Ok(report)
    }

    fn report<T>(
        &self,
        registry: &Registry,
        id: &ArtifactId,
        result: &Result<T, OpError>,
        describe: impl Fn(&T) -> String,
    ) {
        match result {
            Ok(value) => {
                self.reporter.done(id, &describe(value));
                if let Some(entry) = registry.get(id.as_str()) {
                    self.reporter.status(entry);
                }
            }
            Err(e) => self.reporter.failed(id, &e.to_string()),
        }
    }

    fn persist(&self, registry: &Registry, before: &Registry) -> Result<(), OpError> {
        if registry != before {
            self.store.save(registry)?;
        }
        Ok(())
    }
}

fn tracked<'r>(registry: &'r mut Registry, id: &ArtifactId) -> Result<&'r mut AppEntry, OpError> {
    registry
        .get_mut(id.as_str())
        .ok_or_else(|| OpError::ArtifactNotTracked(id.clone()))
}

fn targets(registry: &Registry, ids: &[ArtifactId]) -> Vec<ArtifactId> {
    if ids.is_empty() {
        registry.ids()
    } else {
        ids.to_vec()
    }
}
