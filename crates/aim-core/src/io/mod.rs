//! IO modules - side effects (network, filesystem)

pub mod download;

pub use download::{DownloadError, Downloader};
