pub mod config;
pub mod io;
pub mod ops;
pub mod paths;
pub mod registry;
pub mod resolve;
pub mod search;

pub mod reporter;

pub use config::{Config, ResolverKind};
pub use io::{DownloadError, Downloader};
pub use ops::{BatchReport, OpError, Orchestrator, RemoveOutcome, UpdateOutcome};
pub use paths::*;
pub use registry::{Registry, RegistryError, RegistryStore};
pub use reporter::{NullReporter, Reporter};
pub use resolve::{Release, ReleaseResolver, ResolveError};
pub use search::{
    Candidate, ProbeOutcome, ProbeReport, RepositoryDirectory, SearchAggregator, SearchReport,
};

/// User Agent string for core operations
pub const USER_AGENT: &str = concat!("aim/", env!("CARGO_PKG_VERSION"));
