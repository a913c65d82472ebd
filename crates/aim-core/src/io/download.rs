//! Download Pipeline: streams an entry's `latest.url` to its path.
//!
//! The body goes to `<path>.part` in fixed-size chunks. Only after the whole
//! body is on disk is the file made executable, renamed over `path`, and
//! `current` committed to `latest`. Any failure before that leaves the entry
//! and the previously installed file untouched.

use std::path::Path;

use aim_schema::{AppEntry, ArtifactId};
use futures::StreamExt;
use reqwest::Client;
use thiserror::Error;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::Reporter;
use crate::paths::partial_path;

/// Bytes written per progress step.
pub const CHUNK_SIZE: usize = 100 * 1024;

/// Every variant is retryable: nothing was committed.
#[derive(Error, Debug)]
pub enum DownloadError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No download URL known for {0}")]
    MissingUrl(ArtifactId),

    #[error("Download incomplete: got {written} of {expected} bytes")]
    Incomplete { written: u64, expected: u64 },
}

#[derive(Debug, Clone)]
pub struct Downloader {
    client: Client,
}

impl Downloader {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Download `entry.latest` and commit it. Returns the bytes written.
    pub async fn download(
        &self,
        entry: &mut AppEntry,
        reporter: &dyn Reporter,
    ) -> Result<u64, DownloadError> {
        let Some(url) = entry.latest().url.clone() else {
            return Err(DownloadError::MissingUrl(entry.id().clone()));
        };
        let dest = entry.path().to_path_buf();
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let part = partial_path(&dest);
        let tag = entry.latest().tag.clone();
        let written = self
            .fetch_to(&url, &part, entry.id(), tag.as_deref(), reporter)
            .await?;

        set_executable(&part).await?;
        tokio::fs::rename(&part, &dest).await?;
        entry.commit_latest();

        info!("{}: installed {} ({written} bytes)", entry.id(), dest.display());
        Ok(written)
    }

    async fn fetch_to(
        &self,
        url: &str,
        part: &Path,
        id: &ArtifactId,
        tag: Option<&str>,
        reporter: &dyn Reporter,
    ) -> Result<u64, DownloadError> {
        debug!("GET {url}");
        let response = self.client.get(url).send().await?.error_for_status()?;
        let total = response.content_length();
        reporter.downloading(id, tag, 0, total);

        let mut file = File::create(part).await?;
        let mut stream = response.bytes_stream();
        let mut pending: Vec<u8> = Vec::with_capacity(CHUNK_SIZE);
        let mut written: u64 = 0;
        let mut received: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| interrupted(e, received, total))?;
            received += chunk.len() as u64;
            pending.extend_from_slice(&chunk);
            while pending.len() >= CHUNK_SIZE {
                let rest = pending.split_off(CHUNK_SIZE);
                file.write_all(&pending).await?;
                written += pending.len() as u64;
                pending = rest;
                reporter.downloading(id, tag, written, total);
            }
        }

        if !pending.is_empty() {
            file.write_all(&pending).await?;
            written += pending.len() as u64;
            reporter.downloading(id, tag, written, total);
        }
        file.flush().await?;
        file.sync_all().await?;

        if let Some(expected) = total
            && written < expected
        {
            return Err(DownloadError::Incomplete { written, expected });
        }
        Ok(written)
    }
}

/// A body that ended before its declared length is `Incomplete`. Timeouts
/// and transport errors before any length is known stay `Http`.
fn interrupted(err: reqwest::Error, received: u64, total: Option<u64>) -> DownloadError {
    match total {
        Some(expected) if !err.is_timeout() && (err.is_body() || err.is_decode()) => {
            DownloadError::Incomplete {
                written: received,
                expected,
            }
        }
        _ => DownloadError::Http(err),
    }
}

#[cfg(unix)]
async fn set_executable(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let mut perms = tokio::fs::metadata(path).await?.permissions();
    perms.set_mode(0o755);
    tokio::fs::set_permissions(path, perms).await
}

#[cfg(not(unix))]
async fn set_executable(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NullReporter;
    use aim_schema::{AppEntry, VersionRef};
    use mockito::Server;
    use std::sync::Mutex;
    use std::time::Duration;
    use tempfile::TempDir;

    #[derive(Default)]
    struct Recorder {
        progress: Mutex<Vec<(u64, Option<u64>)>>,
    }

    impl Reporter for Recorder {
        fn section(&self, _: &str) {}
        fn checking(&self, _: &ArtifactId) {}
        fn downloading(&self, _: &ArtifactId, _: Option<&str>, current: u64, total: Option<u64>) {
            self.progress.lock().unwrap().push((current, total));
        }
        fn done(&self, _: &ArtifactId, _: &str) {}
        fn failed(&self, _: &ArtifactId, _: &str) {}
        fn status(&self, _: &AppEntry) {}
        fn info(&self, _: &str) {}
        fn success(&self, _: &str) {}
        fn warning(&self, _: &str) {}
        fn error(&self, _: &str) {}
    }

    fn entry(dir: &Path, url: &str) -> AppEntry {
        let mut entry = AppEntry::new(ArtifactId::parse("acme/tool").unwrap(), dir);
        entry.record_latest(VersionRef::new("v2.0", url));
        entry
    }

    #[tokio::test]
    async fn test_download_commits_after_write() {
        let mut server = Server::new_async().await;
        let body = vec![7u8; CHUNK_SIZE * 2 + 10];
        let _m = server
            .mock("GET", "/tool.AppImage")
            .with_status(200)
            .with_body(&body)
            .create_async()
            .await;

        let dir = TempDir::new().unwrap();
        let mut entry = entry(dir.path(), &format!("{}/tool.AppImage", server.url()));
        let recorder = Recorder::default();

        let written = Downloader::new(Client::new())
            .download(&mut entry, &recorder)
            .await
            .unwrap();

        assert_eq!(written, body.len() as u64);
        assert_eq!(std::fs::read(entry.path()).unwrap(), body);
        assert!(!partial_path(entry.path()).exists());
        assert_eq!(entry.current(), entry.latest());
        assert!(!entry.state().needs_update);

        let progress = recorder.progress.lock().unwrap();
        let total = Some(body.len() as u64);
        assert_eq!(
            progress.as_slice(),
            [
                (0, total),
                (CHUNK_SIZE as u64, total),
                (2 * CHUNK_SIZE as u64, total),
                (body.len() as u64, total)
            ]
        );

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(entry.path()).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o755);
        }
    }

    #[tokio::test]
    async fn test_unknown_length_still_downloads() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/tool.AppImage")
            .with_status(200)
            .with_chunked_body(|w| std::io::Write::write_all(w, b"streamed appimage"))
            .create_async()
            .await;

        let dir = TempDir::new().unwrap();
        let mut entry = entry(dir.path(), &format!("{}/tool.AppImage", server.url()));
        let recorder = Recorder::default();

        Downloader::new(Client::new())
            .download(&mut entry, &recorder)
            .await
            .unwrap();

        assert_eq!(std::fs::read(entry.path()).unwrap(), b"streamed appimage");
        let progress = recorder.progress.lock().unwrap();
        assert!(progress.iter().all(|(_, total)| total.is_none()));
        assert_eq!(progress.last(), Some(&(17, None)));
    }

    #[tokio::test]
    async fn test_failed_download_keeps_current() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/tool.AppImage")
            .with_status(503)
            .create_async()
            .await;

        let dir = TempDir::new().unwrap();
        let mut entry = AppEntry::new(ArtifactId::parse("acme/tool").unwrap(), dir.path());
        entry.record_latest(VersionRef::new("v1.0", "https://old/tool.AppImage"));
        entry.commit_latest();
        std::fs::write(entry.path(), b"old build").unwrap();
        entry.record_latest(VersionRef::new("v1.1", format!("{}/tool.AppImage", server.url())));
        let before = entry.current().clone();

        let err = Downloader::new(Client::new())
            .download(&mut entry, &NullReporter)
            .await
            .unwrap_err();

        assert!(matches!(err, DownloadError::Http(_)));
        assert_eq!(entry.current(), &before);
        assert!(entry.state().needs_update);
        assert_eq!(std::fs::read(entry.path()).unwrap(), b"old build");
    }

    /// Serve one response that declares `declared` bytes, sends `sent` of
    /// them, then either closes or stalls.
    async fn truncated_server(declared: usize, sent: usize, stall: bool) -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    return;
                }
                request.extend_from_slice(&buf[..n]);
            }
            let head = format!("HTTP/1.1 200 OK\r\ncontent-length: {declared}\r\n\r\n");
            socket.write_all(head.as_bytes()).await.unwrap();
            socket.write_all(&vec![1u8; sent]).await.unwrap();
            socket.flush().await.unwrap();
            if stall {
                tokio::time::sleep(Duration::from_secs(30)).await;
            }
            let _ = socket.shutdown().await;
        });
        format!("http://{addr}/tool.AppImage")
    }

    fn installed_v1(dir: &Path, url: &str) -> AppEntry {
        let mut entry = AppEntry::new(ArtifactId::parse("acme/tool").unwrap(), dir);
        entry.record_latest(VersionRef::new("v1.0", "https://old/tool.AppImage"));
        entry.commit_latest();
        std::fs::write(entry.path(), b"old build").unwrap();
        entry.record_latest(VersionRef::new("v1.1", url));
        entry
    }

    #[tokio::test]
    async fn test_truncated_body_is_incomplete() {
        let url = truncated_server(500_000, 150_000, false).await;
        let dir = TempDir::new().unwrap();
        let mut entry = installed_v1(dir.path(), &url);
        let before = entry.current().clone();

        let err = Downloader::new(Client::new())
            .download(&mut entry, &NullReporter)
            .await
            .unwrap_err();

        assert!(
            matches!(err, DownloadError::Incomplete { expected: 500_000, written } if written <= 150_000),
            "unexpected error: {err:?}"
        );
        assert_eq!(entry.current(), &before);
        assert!(entry.state().needs_update);
        assert_eq!(std::fs::read(entry.path()).unwrap(), b"old build");
    }

    #[tokio::test]
    async fn test_stalled_body_times_out() {
        let url = truncated_server(1_000, 10, true).await;
        let dir = TempDir::new().unwrap();
        let mut entry = installed_v1(dir.path(), &url);

        let mut config = crate::Config::with_install_dir(dir.path());
        config.request_timeout = Duration::from_millis(200);
        let client = config.http_client().unwrap();

        let err = tokio::time::timeout(
            Duration::from_secs(10),
            Downloader::new(client).download(&mut entry, &NullReporter),
        )
        .await
        .expect("stalled download should hit the read timeout")
        .unwrap_err();

        assert!(matches!(err, DownloadError::Http(ref e) if e.is_timeout()), "unexpected error: {err:?}");
        assert_eq!(entry.current().tag.as_deref(), Some("v1.0"));
        assert_eq!(std::fs::read(entry.path()).unwrap(), b"old build");
    }

    #[tokio::test]
    async fn test_missing_url() {
        let dir = TempDir::new().unwrap();
        let mut entry = AppEntry::new(ArtifactId::parse("acme/tool").unwrap(), dir.path());
        entry.record_latest(VersionRef::tag_only("v1.1"));
        let err = Downloader::new(Client::new())
            .download(&mut entry, &NullReporter)
            .await
            .unwrap_err();
        assert!(matches!(err, DownloadError::MissingUrl(_)));
        assert!(entry.current().is_unknown());
    }
}
