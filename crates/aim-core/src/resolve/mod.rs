//! Release Resolver: maps an artifact id to its latest tag and download URL.
//!
//! Backends only fetch a release listing. Picking the installable asset is
//! shared here so every backend applies the same architecture policy.

mod api;
mod html;

pub use api::GithubApiResolver;
pub use html::GithubHtmlResolver;

use aim_schema::{ArtifactId, AssetPattern, VersionRef};
use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use crate::paths::filename_from_url;

/// Why a release could not be resolved to an installable URL.
///
/// Every variant is soft: callers treat it as "no new release".
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("network unavailable: {0}")]
    NetworkUnavailable(String),

    #[error("no release found")]
    NoReleaseFound,

    #[error("release {tag} has no asset for this architecture")]
    AssetExcludedByArchitecture { tag: String },
}

impl ResolveError {
    /// The `latest` value to record when resolution fails this way.
    pub fn fallback(&self) -> VersionRef {
        match self {
            Self::AssetExcludedByArchitecture { tag } => VersionRef::tag_only(tag.clone()),
            Self::NetworkUnavailable(_) | Self::NoReleaseFound => VersionRef::unknown(),
        }
    }
}

impl From<reqwest::Error> for ResolveError {
    fn from(err: reqwest::Error) -> Self {
        Self::NetworkUnavailable(err.to_string())
    }
}

/// A release listing: its tag and asset URLs in listing order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Release {
    pub tag: Option<String>,
    pub assets: Vec<String>,
}

#[async_trait]
pub trait ReleaseResolver: Send + Sync {
    /// Fetch the latest release listing for `id`.
    async fn latest_release(&self, id: &ArtifactId) -> Result<Release, ResolveError>;
}

/// First asset whose file name does not carry an excluded architecture.
pub fn select_asset(assets: &[String]) -> Option<&str> {
    assets
        .iter()
        .map(String::as_str)
        .find(|url| !AssetPattern::from_filename(filename_from_url(url)).is_excluded())
}

/// Resolve `id` to a tag and installable URL.
pub async fn resolve(
    resolver: &dyn ReleaseResolver,
    id: &ArtifactId,
) -> Result<VersionRef, ResolveError> {
    let release = resolver.latest_release(id).await?;
    let Some(tag) = release.tag else {
        return Err(ResolveError::NoReleaseFound);
    };
    if release.assets.is_empty() {
        return Err(ResolveError::NoReleaseFound);
    }

    match select_asset(&release.assets) {
        Some(url) => {
            debug!("{id}: {tag} -> {url}");
            Ok(VersionRef::new(tag, url))
        }
        None => Err(ResolveError::AssetExcludedByArchitecture { tag }),
    }
}


#[cfg(test)]
mod tests {
    use super::testing::FakeResolver;
    use super::*;

    fn id() -> ArtifactId {
        ArtifactId::parse("acme/tool").unwrap()
    }

    #[test]
    fn test_select_first_primary_asset() {
        let assets = vec![
            "https://x/acme/tool/releases/download/v2/tool-armhf.AppImage".to_string(),
            "https://x/acme/tool/releases/download/v2/tool-x86_64.AppImage".to_string(),
            "https://x/acme/tool/releases/download/v2/tool.AppImage".to_string(),
        ];
        assert_eq!(
            select_asset(&assets),
            Some("https://x/acme/tool/releases/download/v2/tool-x86_64.AppImage")
        );
    }

    #[test]
    fn test_exclusion_ignores_repository_path() {
        let assets = vec!["https://x/armada/fleet/releases/download/v1/fleet.AppImage".to_string()];
        let assets_arm =
            vec!["https://x/armada/fleet/releases/download/v1/fleet-arm64.AppImage".to_string()];
        assert!(select_asset(&assets).is_some());
        assert!(select_asset(&assets_arm).is_none());
    }

    #[tokio::test]
    async fn test_resolve_picks_url() {
        let resolver = FakeResolver::new().with(
            "acme/tool",
            "v2.0",
            &["https://x/tool-v2.0.AppImage"],
        );
        let v = resolve(&resolver, &id()).await.unwrap();
        assert_eq!(v, VersionRef::new("v2.0", "https://x/tool-v2.0.AppImage"));
    }

    #[tokio::test]
    async fn test_resolve_only_arm_assets() {
        let resolver = FakeResolver::new().with(
            "acme/tool",
            "v1.1",
            &["https://x/tool-aarch64.AppImage", "https://x/tool-i686.AppImage"],
        );
        let err = resolve(&resolver, &id()).await.unwrap_err();
        assert_eq!(
            err,
            ResolveError::AssetExcludedByArchitecture { tag: "v1.1".into() }
        );
        assert_eq!(err.fallback(), VersionRef::tag_only("v1.1"));
    }

    #[tokio::test]
    async fn test_resolve_soft_failures() {
        let resolver = FakeResolver::new()
            .with("acme/tool", "v1.0", &[])
            .with_error("acme/down", ResolveError::NetworkUnavailable("refused".into()));

        let empty = resolve(&resolver, &id()).await.unwrap_err();
        assert_eq!(empty, ResolveError::NoReleaseFound);
        assert!(empty.fallback().is_unknown());

        let down = resolve(&resolver, &ArtifactId::parse("acme/down").unwrap())
            .await
            .unwrap_err();
        assert!(down.fallback().is_unknown());
    }
}
