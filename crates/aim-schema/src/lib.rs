//! Shared data model for aim.
//!
//! Everything here is plain data plus pure functions: the artifact identifier,
//! the version references tracked per artifact, the derived install state and
//! the asset-name classifier used to pick an installable build.

pub mod asset_pattern;
pub mod entry;
pub mod id;

// Re-exports
pub use asset_pattern::{ArchVariant, AssetPattern};
pub use entry::{AppEntry, DerivedState, VersionRef};
pub use id::{ArtifactId, IdError};

/// File extension of the artifacts aim installs.
pub const ARTIFACT_EXTENSION: &str = "AppImage";
