//! Release page scraper.
//!
//! `GET {web}/{id}/releases/latest` redirects to `/{id}/releases/tag/{tag}`;
//! the tag is read off the final URL and asset links are matched in the body.
//! Newer pages load the asset list lazily, so an empty page falls back to the
//! `expanded_assets/{tag}` fragment.

use std::time::Duration;

use aim_schema::ArtifactId;
use async_trait::async_trait;
use regex::Regex;
use reqwest::{Client, StatusCode};
use tracing::{debug, warn};

use super::{Release, ReleaseResolver, ResolveError};

#[derive(Debug, Clone)]
pub struct GithubHtmlResolver {
    client: Client,
    web_url: String,
    timeout: Duration,
}

impl GithubHtmlResolver {
    pub fn new(client: Client, web_url: &str, timeout: Duration) -> Self {
        Self {
            client,
            web_url: web_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }

    async fn fetch(&self, url: &str) -> Result<(String, String), ResolveError> {
        debug!("GET {url}");
        let resp = self.client.get(url).timeout(self.timeout).send().await?;
        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ResolveError::NoReleaseFound);
        }
        if !status.is_success() {
            return Err(ResolveError::NetworkUnavailable(format!("HTTP {status}")));
        }
        let final_path = resp.url().path().to_string();
        let body = resp.text().await?;
        Ok((final_path, body))
    }
}

#[async_trait]
impl ReleaseResolver for GithubHtmlResolver {
    async fn latest_release(&self, id: &ArtifactId) -> Result<Release, ResolveError> {
        let url = format!("{}/{id}/releases/latest", self.web_url);
        let (final_path, body) = self.fetch(&url).await?;

        let Some(tag) = tag_from_path(&final_path) else {
            debug!("{id}: no release tag in {final_path}");
            return Ok(Release::default());
        };

        let mut assets = scrape_assets(id, &body, &self.web_url);
        if assets.is_empty() {
            let fragment = format!("{}/{id}/releases/expanded_assets/{tag}", self.web_url);
            match self.fetch(&fragment).await {
                Ok((_, body)) => assets = scrape_assets(id, &body, &self.web_url),
                Err(e) => warn!("{id}: asset list unavailable: {e}"),
            }
        }

        Ok(Release {
            tag: Some(tag.to_string()),
            assets,
        })
    }
}

/// The tag segment of `/owner/project/releases/tag/<tag>`.
pub(crate) fn tag_from_path(path: &str) -> Option<&str> {
    let (_, rest) = path.split_once("/releases/tag/")?;
    let tag = rest.trim_end_matches('/');
    tag.rsplit('/').next().filter(|t| !t.is_empty())
}

/// Quoted `/owner/project/...*.AppImage` hrefs in document order, deduplicated,
/// made absolute against `base`.
pub(crate) fn scrape_assets(id: &ArtifactId, body: &str, base: &str) -> Vec<String> {
    let pattern = format!(
        r#"(?i)"(/{}/[^"\s]*\.appimage)""#,
        regex::escape(id.as_str())
    );
    let Ok(re) = Regex::new(&pattern) else {
        return Vec::new();
    };

    let mut seen = Vec::new();
    for cap in re.captures_iter(body) {
        let url = format!("{base}{}", &cap[1]);
        if !seen.contains(&url) {
            seen.push(url);
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    fn id() -> ArtifactId {
        ArtifactId::parse("acme/tool").unwrap()
    }

    const PAGE: &str = r#"
        <a href="/acme/tool/releases/download/v2.0/Tool-2.0-armhf.AppImage">arm</a>
        <a href="/acme/tool/releases/download/v2.0/Tool-2.0-x86_64.AppImage" rel="nofollow">x64</a>
        <a href="/acme/tool/releases/download/v2.0/Tool-2.0-x86_64.AppImage">again</a>
        <a href="/acme/tool/releases/download/v2.0/Tool-2.0.AppImage.zsync">zsync</a>
        <a href="/other/tool/releases/download/v2.0/Other.AppImage">foreign</a>
    "#;

    #[test]
    fn test_tag_from_path() {
        assert_eq!(tag_from_path("/acme/tool/releases/tag/v2.0"), Some("v2.0"));
        assert_eq!(tag_from_path("/acme/tool/releases/tag/v2.0/"), Some("v2.0"));
        assert_eq!(tag_from_path("/acme/tool/releases"), None);
        assert_eq!(tag_from_path("/acme/tool/releases/tag/"), None);
    }

    #[test]
    fn test_scrape_assets_order_and_scope() {
        let assets = scrape_assets(&id(), PAGE, "https://github.com");
        assert_eq!(
            assets,
            vec![
                "https://github.com/acme/tool/releases/download/v2.0/Tool-2.0-armhf.AppImage",
                "https://github.com/acme/tool/releases/download/v2.0/Tool-2.0-x86_64.AppImage",
            ]
        );
    }

    #[tokio::test]
    async fn test_follows_redirect_to_tag() {
        let mut server = Server::new_async().await;
        let _latest = server
            .mock("GET", "/acme/tool/releases/latest")
            .with_status(302)
            .with_header("location", "/acme/tool/releases/tag/v2.0")
            .create_async()
            .await;
        let _tag = server
            .mock("GET", "/acme/tool/releases/tag/v2.0")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body(PAGE)
            .create_async()
            .await;

        let resolver =
            GithubHtmlResolver::new(Client::new(), &server.url(), Duration::from_secs(5));
        let release = resolver.latest_release(&id()).await.unwrap();
        assert_eq!(release.tag.as_deref(), Some("v2.0"));
        assert_eq!(release.assets.len(), 2);
        assert!(release.assets[0].starts_with(&server.url()));
    }

    #[tokio::test]
    async fn test_falls_back_to_expanded_assets() {
        let mut server = Server::new_async().await;
        let _latest = server
            .mock("GET", "/acme/tool/releases/latest")
            .with_status(302)
            .with_header("location", "/acme/tool/releases/tag/v3")
            .create_async()
            .await;
        let _tag = server
            .mock("GET", "/acme/tool/releases/tag/v3")
            .with_status(200)
            .with_body("<html>loading</html>")
            .create_async()
            .await;
        let _fragment = server
            .mock("GET", "/acme/tool/releases/expanded_assets/v3")
            .with_status(200)
            .with_body(r#"<a href="/acme/tool/releases/download/v3/tool.AppImage">"#)
            .create_async()
            .await;

        let resolver =
            GithubHtmlResolver::new(Client::new(), &server.url(), Duration::from_secs(5));
        let release = resolver.latest_release(&id()).await.unwrap();
        assert_eq!(release.tag.as_deref(), Some("v3"));
        assert_eq!(
            release.assets,
            vec![format!("{}/acme/tool/releases/download/v3/tool.AppImage", server.url())]
        );
    }

    #[tokio::test]
    async fn test_http_failures_are_soft() {
        let mut server = Server::new_async().await;
        let _missing = server
            .mock("GET", "/acme/tool/releases/latest")
            .with_status(404)
            .create_async()
            .await;
        let _broken = server
            .mock("GET", "/acme/broken/releases/latest")
            .with_status(500)
            .create_async()
            .await;

        let resolver =
            GithubHtmlResolver::new(Client::new(), &server.url(), Duration::from_secs(5));
        assert_eq!(
            resolver.latest_release(&id()).await,
            Err(ResolveError::NoReleaseFound)
        );
        assert!(matches!(
            resolver
                .latest_release(&ArtifactId::parse("acme/broken").unwrap())
                .await,
            Err(ResolveError::NetworkUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_no_redirect_means_no_release() {
        let mut server = Server::new_async().await;
        let _page = server
            .mock("GET", "/acme/tool/releases/latest")
            .with_status(200)
            .with_body(PAGE)
            .create_async()
            .await;

        let resolver =
            GithubHtmlResolver::new(Client::new(), &server.url(), Duration::from_secs(5));
        assert_eq!(resolver.latest_release(&id()).await, Ok(Release::default()));
    }
}
