//! Runtime configuration.
//!
//! Resolved once at startup: built-in defaults, then `<install_dir>/aim.toml`,
//! then `AIM_*` environment variables. CLI flags are applied by the caller
//! through the `home_override` argument.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::paths::{config_path, default_install_dir};
use crate::resolve::{GithubApiResolver, GithubHtmlResolver, ReleaseResolver};
use crate::search::{GithubSearch, RepositoryDirectory, SearchAggregator};

pub const DEFAULT_WEB_URL: &str = "https://github.com";
pub const DEFAULT_API_URL: &str = "https://api.github.com";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not determine home directory. Set AIM_HOME to override.")]
    NoHome,

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },

    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Which release-listing backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolverKind {
    /// Scrape the public release page.
    #[default]
    Html,
    /// Read the JSON releases API.
    Api,
}

impl std::str::FromStr for ResolverKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "html" => Ok(Self::Html),
            "api" => Ok(Self::Api),
            other => Err(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub install_dir: PathBuf,
    pub web_url: String,
    pub api_url: String,
    pub resolver: ResolverKind,
    pub probe_timeout: Duration,
    pub search_deadline: Duration,
    pub search_limit: usize,
    pub request_timeout: Duration,
}

/// On-disk shape of `aim.toml`. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    web_url: Option<String>,
    api_url: Option<String>,
    resolver: Option<ResolverKind>,
    probe_timeout_secs: Option<u64>,
    search_deadline_secs: Option<u64>,
    search_limit: Option<usize>,
    request_timeout_secs: Option<u64>,
}

impl Config {
    /// Defaults rooted at `install_dir`.
    pub fn with_install_dir(install_dir: impl Into<PathBuf>) -> Self {
        Self {
            install_dir: install_dir.into(),
            web_url: DEFAULT_WEB_URL.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            resolver: ResolverKind::Html,
            probe_timeout: Duration::from_secs(15),
            search_deadline: Duration::from_secs(60),
            search_limit: 100,
            request_timeout: Duration::from_secs(300),
        }
    }

    /// Load configuration from the process environment.
    pub fn load(home_override: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with(home_override, |key| std::env::var(key).ok())
    }

    /// Load configuration with an explicit environment lookup.
    pub fn load_with<F>(home_override: Option<&Path>, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let install_dir = match home_override {
            Some(dir) => dir.to_path_buf(),
            None => env("AIM_HOME")
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
                .or_else(default_install_dir)
                .ok_or(ConfigError::NoHome)?,
        };

        let mut config = Self::with_install_dir(install_dir);
        let file = config_path(&config.install_dir);
        if file.exists() {
            debug!("Reading configuration from {}", file.display());
            let content = std::fs::read_to_string(&file).map_err(|source| ConfigError::Read {
                path: file.clone(),
                source,
            })?;
            let parsed: FileConfig = toml::from_str(&content)
                .map_err(|source| ConfigError::Parse { path: file, source })?;
            config.apply_file(parsed);
        }

        if let Some(url) = env("AIM_WEB_URL").filter(|v| !v.is_empty()) {
            config.web_url = url;
        }
        if let Some(url) = env("AIM_API_URL").filter(|v| !v.is_empty()) {
            config.api_url = url;
        }
        if let Some(kind) = env("AIM_RESOLVER").filter(|v| !v.is_empty()) {
            config.resolver = kind.parse().map_err(|value| ConfigError::Invalid {
                key: "AIM_RESOLVER",
                value,
            })?;
        }

        config.web_url = trim_base(&config.web_url);
        config.api_url = trim_base(&config.api_url);
        Ok(config)
    }

    fn apply_file(&mut self, file: FileConfig) {
        if let Some(v) = file.web_url {
            self.web_url = v;
        }
        if let Some(v) = file.api_url {
            self.api_url = v;
        }
        if let Some(v) = file.resolver {
            self.resolver = v;
        }
        if let Some(v) = file.probe_timeout_secs {
            self.probe_timeout = Duration::from_secs(v);
        }
        if let Some(v) = file.search_deadline_secs {
            self.search_deadline = Duration::from_secs(v);
        }
        if let Some(v) = file.search_limit {
            self.search_limit = v;
        }
        if let Some(v) = file.request_timeout_secs {
            self.request_timeout = Duration::from_secs(v);
        }
    }

    /// Shared HTTP client. There is no total timeout since downloads may run
    /// long, but a body that stops arriving for `request_timeout` fails.
    /// Listing requests also carry their own per-request timeout.
    pub fn http_client(&self) -> Result<reqwest::Client, ConfigError> {
        Ok(reqwest::Client::builder()
            .user_agent(crate::USER_AGENT)
            .connect_timeout(Duration::from_secs(30))
            .read_timeout(self.request_timeout)
            .build()?)
    }

    /// The release resolver selected by `resolver`.
    pub fn release_resolver(&self, client: reqwest::Client) -> Arc<dyn ReleaseResolver> {
        match self.resolver {
            ResolverKind::Html => Arc::new(GithubHtmlResolver::new(
                client,
                &self.web_url,
                self.request_timeout,
            )),
            ResolverKind::Api => Arc::new(GithubApiResolver::new(
                client,
                &self.api_url,
                self.request_timeout,
            )),
        }
    }

    /// Repository discovery backend.
    pub fn repository_directory(&self, client: reqwest::Client) -> Arc<dyn RepositoryDirectory> {
        Arc::new(GithubSearch::new(client, &self.api_url, self.request_timeout))
    }

    /// A search aggregator wired to this configuration.
    pub fn search_aggregator(&self, client: &reqwest::Client) -> SearchAggregator {
        SearchAggregator::new(
            self.repository_directory(client.clone()),
            self.release_resolver(client.clone()),
        )
        .with_limit(self.search_limit)
        .with_probe_timeout(self.probe_timeout)
        .with_deadline(self.search_deadline)
    }
}

fn trim_base(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}
