//! Reporter trait for dependency injection
//!
//! This trait allows core logic to report progress and status without
//! being coupled to a specific terminal implementation.

use aim_schema::{AppEntry, ArtifactId};

pub trait Reporter: Send + Sync {
    /// Indicates a new section or phase has started (e.g. "Checking", "Updating").
    fn section(&self, title: &str);

    /// A release check for `id` has started.
    fn checking(&self, id: &ArtifactId);

    /// Updates the progress of a download. `total` is None when the server
    /// did not declare a content length.
    fn downloading(&self, id: &ArtifactId, tag: Option<&str>, current: u64, total: Option<u64>);

    /// Marks an artifact operation as successfully completed.
    fn done(&self, id: &ArtifactId, detail: &str);

    /// Marks an artifact operation as failed with a specific reason.
    fn failed(&self, id: &ArtifactId, reason: &str);

    /// Shows the current status row of a tracked entry.
    fn status(&self, entry: &AppEntry);

    /// Log an informational message.
    fn info(&self, msg: &str);

    /// Log a success message.
    fn success(&self, msg: &str);

    /// Log a warning message.
    fn warning(&self, msg: &str);

    /// Log an error message.
    fn error(&self, msg: &str);
}

impl<T: Reporter + ?Sized> Reporter for std::sync::Arc<T> {
    fn section(&self, title: &str) {
        (**self).section(title);
    }
    fn checking(&self, id: &ArtifactId) {
        (**self).checking(id);
    }
    fn downloading(&self, id: &ArtifactId, tag: Option<&str>, current: u64, total: Option<u64>) {
        (**self).downloading(id, tag, current, total);
    }
    fn done(&self, id: &ArtifactId, detail: &str) {
        (**self).done(id, detail);
    }
    fn failed(&self, id: &ArtifactId, reason: &str) {
        (**self).failed(id, reason);
    }
    fn status(&self, entry: &AppEntry) {
        (**self).status(entry);
    }
    fn info(&self, msg: &str) {
        (**self).info(msg);
    }
    fn success(&self, msg: &str) {
        (**self).success(msg);
    }
    fn warning(&self, msg: &str) {
        (**self).warning(msg);
    }
    fn error(&self, msg: &str) {
        (**self).error(msg);
    }
}

/// A no-op reporter for silent operations (e.g., testing).
#[derive(Debug, Clone, Copy)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn section(&self, _: &str) {}
    fn checking(&self, _: &ArtifactId) {}
    fn downloading(&self, _: &ArtifactId, _: Option<&str>, _: u64, _: Option<u64>) {}
    fn done(&self, _: &ArtifactId, _: &str) {}
    fn failed(&self, _: &ArtifactId, _: &str) {}
    fn status(&self, _: &AppEntry) {}
    fn info(&self, _: &str) {}
    fn success(&self, _: &str) {}
    fn warning(&self, _: &str) {}
    fn error(&self, _: &str) {}
}
