//! Search Aggregator: discovery followed by a concurrent probe of every
//! candidate's release listing.
//!
//! Each probe is a separate task with its own timeout. The whole fan-out is
//! bounded by an overall deadline; tasks still running at the deadline are
//! aborted and reported as timed out. Outcomes are collected by a single
//! reader from the `JoinSet` and then ordered by discovery position.

mod directory;

pub use directory::{GithubSearch, RepositoryDirectory};

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use aim_schema::ArtifactId;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::resolve::{Release, ReleaseResolver, ResolveError};

/// Result of probing a single candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// Publishes at least one AppImage under a tagged release.
    Confirmed { tag: String },
    /// Reachable, but no tagged release with an AppImage.
    NoMatch,
    /// The listing fetch failed.
    Failed(String),
    /// Did not finish within its timeout or the search deadline.
    TimedOut,
}

impl ProbeOutcome {
    fn from_release(release: Release) -> Self {
        match release.tag {
            Some(tag) if !release.assets.is_empty() => Self::Confirmed { tag },
            _ => Self::NoMatch,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeReport {
    pub id: ArtifactId,
    pub outcome: ProbeOutcome,
}

/// A confirmed search hit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub id: ArtifactId,
    pub tag: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchReport {
    /// Every probed candidate, in discovery order.
    pub probes: Vec<ProbeReport>,
}

impl SearchReport {
    /// Confirmed candidates only, in discovery order.
    pub fn candidates(&self) -> Vec<Candidate> {
        self.probes
            .iter()
            .filter_map(|p| match &p.outcome {
                ProbeOutcome::Confirmed { tag } => Some(Candidate {
                    id: p.id.clone(),
                    tag: tag.clone(),
                }),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, pred: impl Fn(&ProbeOutcome) -> bool) -> usize {
        self.probes.iter().filter(|p| pred(&p.outcome)).count()
    }
}

pub struct SearchAggregator {
    directory: Arc<dyn RepositoryDirectory>,
    resolver: Arc<dyn ReleaseResolver>,
    limit: usize,
    probe_timeout: Duration,
    deadline: Duration,
}

impl std::fmt::Debug for SearchAggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchAggregator")
            .field("limit", &self.limit)
            .field("probe_timeout", &self.probe_timeout)
            .field("deadline", &self.deadline)
            .finish_non_exhaustive()
    }
}

impl SearchAggregator {
    pub fn new(directory: Arc<dyn RepositoryDirectory>, resolver: Arc<dyn ReleaseResolver>) -> Self {
        Self {
            directory,
            resolver,
            limit: 100,
            probe_timeout: Duration::from_secs(15),
            deadline: Duration::from_secs(60),
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    /// Discover and probe candidates for `keywords`.
    ///
    /// Fails only when every discovery query fails.
    pub async fn search(&self, keywords: &str) -> Result<SearchReport, ResolveError> {
        let candidates = self.discover(keywords).await?;
        debug!("Probing {} candidates for '{keywords}'", candidates.len());
        let probes = self.probe_all(candidates).await;
        Ok(SearchReport { probes })
    }

    /// Query by name, then by name plus "appimage"; merge in first-seen order.
    async fn discover(&self, keywords: &str) -> Result<Vec<ArtifactId>, ResolveError> {
        let keywords = keywords.trim();
        let mut queries = vec![keywords.to_string()];
        if !keywords.to_ascii_lowercase().contains("appimage") {
            queries.push(format!("{keywords} appimage"));
        }

        let mut ids: Vec<ArtifactId> = Vec::new();
        let mut last_err = None;
        let mut any_ok = false;
        for query in &queries {
            match self.directory.discover(query).await {
                Ok(found) => {
                    any_ok = true;
                    for id in found {
                        if !ids.contains(&id) {
                            ids.push(id);
                        }
                    }
                }
                Err(e) => {
                    warn!("Discovery query '{query}' failed: {e}");
                    last_err = Some(e);
                }
            }
        }

        if !any_ok {
            return Err(last_err.unwrap_or(ResolveError::NoReleaseFound));
        }
        ids.truncate(self.limit);
        Ok(ids)
    }

    async fn probe_all(&self, candidates: Vec<ArtifactId>) -> Vec<ProbeReport> {
        let deadline = Instant::now() + self.deadline;
        let mut set = JoinSet::new();

        for (pos, id) in candidates.iter().cloned().enumerate() {
            let resolver = Arc::clone(&self.resolver);
            let per_probe = self.probe_timeout;
            set.spawn(async move {
                let outcome = match tokio::time::timeout(per_probe, resolver.latest_release(&id)).await
                {
                    Ok(Ok(release)) => ProbeOutcome::from_release(release),
                    Ok(Err(e)) => ProbeOutcome::Failed(e.to_string()),
                    Err(_) => ProbeOutcome::TimedOut,
                };
                (pos, ProbeReport { id, outcome })
            });
        }

        let mut collected: Vec<(usize, ProbeReport)> = Vec::new();
        let mut deadline_hit = false;
        loop {
            match tokio::time::timeout_at(deadline, set.join_next()).await {
                Ok(Some(Ok(result))) => collected.push(result),
                Ok(Some(Err(e))) => warn!("Probe task ended abnormally: {e}"),
                Ok(None) => break,
                Err(_) => {
                    warn!("Search deadline reached with {} probes pending", set.len());
                    deadline_hit = true;
                    set.abort_all();
                    break;
                }
            }
        }

        let finished: HashSet<usize> = collected.iter().map(|(pos, _)| *pos).collect();
        for (pos, id) in candidates.into_iter().enumerate() {
            if finished.contains(&pos) {
                continue;
            }
            let outcome = if deadline_hit {
                ProbeOutcome::TimedOut
            } else {
                ProbeOutcome::Failed("probe aborted".to_string())
            };
            collected.push((pos, ProbeReport { id, outcome }));
        }

        collected.sort_by_key(|(pos, _)| *pos);
        collected.into_iter().map(|(_, report)| report).collect()
    }
}
