//! Repository discovery via `GET {api}/search/repositories`.

use std::time::Duration;

use aim_schema::ArtifactId;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::resolve::ResolveError;

#[async_trait]
pub trait RepositoryDirectory: Send + Sync {
    /// Candidate ids matching `query`, in relevance order.
    async fn discover(&self, query: &str) -> Result<Vec<ArtifactId>, ResolveError>;
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    full_name: String,
}

#[derive(Debug, Clone)]
pub struct GithubSearch {
    client: Client,
    api_url: String,
    timeout: Duration,
}

impl GithubSearch {
    pub fn new(client: Client, api_url: &str, timeout: Duration) -> Self {
        Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }
}

#[async_trait]
impl RepositoryDirectory for GithubSearch {
    async fn discover(&self, query: &str) -> Result<Vec<ArtifactId>, ResolveError> {
        let url = format!("{}/search/repositories", self.api_url);
        let q = format!("{query} in:name");
        debug!("GET {url}?q={q}");

        let resp = self
            .client
            .get(&url)
            .query(&[("q", q.as_str()), ("page_size", "100")])
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .timeout(self.timeout)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(ResolveError::NetworkUnavailable(format!(
                "HTTP {}",
                resp.status()
            )));
        }

        let body: SearchResponse = resp.json().await?;
        Ok(body
            .items
            .into_iter()
            .filter_map(|item| match ArtifactId::parse(&item.full_name) {
                Ok(id) => Some(id),
                Err(e) => {
                    warn!("Skipping search result: {e}");
                    None
                }
            })
            .collect())
    }
}
