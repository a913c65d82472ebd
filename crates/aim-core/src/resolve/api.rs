//! JSON releases API backend: `GET {api}/repos/{id}/releases/latest`.

use std::time::Duration;

use aim_schema::{ArtifactId, asset_pattern::is_appimage};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::debug;

use super::{Release, ReleaseResolver, ResolveError};

#[derive(Debug, Deserialize)]
struct GithubRelease {
    tag_name: Option<String>,
    #[serde(default)]
    assets: Vec<GithubAsset>,
}

#[derive(Debug, Deserialize)]
struct GithubAsset {
    name: String,
    browser_download_url: String,
}

#[derive(Debug, Clone)]
pub struct GithubApiResolver {
    client: Client,
    api_url: String,
    timeout: Duration,
}

impl GithubApiResolver {
    pub fn new(client: Client, api_url: &str, timeout: Duration) -> Self {
        Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }
}

#[async_trait]
impl ReleaseResolver for GithubApiResolver {
    async fn latest_release(&self, id: &ArtifactId) -> Result<Release, ResolveError> {
        let url = format!("{}/repos/{id}/releases/latest", self.api_url);
        debug!("GET {url}");
        let resp = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .timeout(self.timeout)
            .send()
            .await?;

        match resp.status() {
            StatusCode::NOT_FOUND => return Err(ResolveError::NoReleaseFound),
            s if !s.is_success() => {
                return Err(ResolveError::NetworkUnavailable(format!("HTTP {s}")));
            }
            _ => {}
        }

        let release: GithubRelease = resp.json().await?;
        Ok(Release {
            tag: release.tag_name.filter(|t| !t.is_empty()),
            assets: release
                .assets
                .into_iter()
                .filter(|a| is_appimage(&a.name))
                .map(|a| a.browser_download_url)
                .collect(),
        })
    }
}
