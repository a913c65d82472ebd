//! Shared command context.
//!
//! A `Session` is opened once per command: configuration, HTTP client,
//! the loaded registry and the terminal reporter.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use aim_core::{Config, Downloader, Orchestrator, Registry, RegistryStore, ReleaseResolver};
use anyhow::{Context, Result};

use crate::ui::Output;

pub struct Session {
    pub config: Config,
    pub client: reqwest::Client,
    pub store: RegistryStore,
    pub registry: Registry,
    pub output: Arc<Output>,
    resolver: Arc<dyn ReleaseResolver>,
    downloader: Downloader,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("config", &self.config)
            .field("entries", &self.registry.len())
            .finish_non_exhaustive()
    }
}

impl Session {
    pub fn open(home: Option<&Path>) -> Result<Self> {
        let config = Config::load(home).context("Failed to load configuration")?;
        let client = config.http_client()?;
        let store = RegistryStore::in_dir(&config.install_dir);
        let registry = store
            .load()
            .with_context(|| format!("Failed to load registry {}", store.path().display()))?;
        tracing::debug!(
            "Opened {} ({} entries)",
            config.install_dir.display(),
            registry.len()
        );

        Ok(Self {
            resolver: config.release_resolver(client.clone()),
            downloader: Downloader::new(client.clone()),
            config,
            client,
            store,
            registry,
            output: Arc::new(Output::new()),
        })
    }

    /// The orchestrator plus the registry it operates on.
    pub fn split(&mut self) -> (Orchestrator<'_>, &mut Registry) {
        let orchestrator = Orchestrator::new(
            self.resolver.as_ref(),
            &self.downloader,
            &self.store,
            self.output.as_ref(),
        );
        (orchestrator, &mut self.registry)
    }
}
