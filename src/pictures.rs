//! Picture downloads for accepted articles.
//!
//! Each picture is saved under the picture directory using the basename of
//! its URL path (`https://host/a/b/photo.jpg?w=600` -> `photo.jpg`). Failures
//! never propagate: they are logged and reported as an empty filename.

use crate::error::DownloadError;
use crate::extraction::PictureFetcher;
use reqwest::Client;
use std::path::PathBuf;
use tokio::fs;
use tracing::{error, info, instrument, warn};
use url::Url;

/// Downloads pictures into a local directory with a shared HTTP client.
#[derive(Debug, Clone)]
pub struct PictureDownloader {
    client: Client,
    dir: PathBuf,
}

impl PictureDownloader {
    /// Create a downloader that stores files under `dir`.
    ///
    /// # Arguments
    ///
    /// * `client` - HTTP client reused for every download.
    /// * `dir` - Target directory. It must already exist; see
    ///   [`crate::utils::ensure_writable_dir`].
    ///
    /// # Returns
    ///
    /// A downloader ready to be passed to the extraction loop.
    pub fn new(client: Client, dir: impl Into<PathBuf>) -> Self {
        Self {
            client,
            dir: dir.into(),
        }
    }

    /// Download `url` and return the stored filename.
    ///
    /// # Errors
    ///
    /// Returns a [`DownloadError`] for URLs without a file name, transport
    /// failures, non-2xx statuses and write failures.
    pub async fn download(&self, url: &str) -> Result<String, DownloadError> {
        let filename =
            picture_filename(url).ok_or_else(|| DownloadError::NoFileName(url.to_string()))?;

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::Http(status));
        }
        let bytes = response.bytes().await?;

        let path = self.dir.join(&filename);
        fs::write(&path, &bytes).await?;
        info!(path = %path.display(), bytes = bytes.len(), "Saved picture");
        Ok(filename)
    }
}

impl PictureFetcher for PictureDownloader {
    #[instrument(level = "info", skip_all, fields(%url))]
    async fn fetch(&self, url: &str) -> String {
        match self.download(url).await {
            Ok(filename) => filename,
            Err(e @ (DownloadError::Transport(_) | DownloadError::Io(_))) => {
                error!(error = %e, "Error downloading picture");
                String::new()
            }
            Err(e @ (DownloadError::Http(_) | DownloadError::NoFileName(_))) => {
                warn!(error = %e, "Failed to download picture");
                String::new()
            }
        }
    }
}

/// Basename of the URL path, or `None` when the path ends in `/`.
pub fn picture_filename(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let name = parsed.path_segments()?.next_back()?;
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_picture_filename_strips_query() {
        assert_eq!(
            picture_filename("https://dims.apnews.com/dims4/default/abc/photo.jpeg?w=600&q=80"),
            Some("photo.jpeg".to_string())
        );
    }

    #[test]
    fn test_picture_filename_without_name() {
        assert_eq!(picture_filename("https://apnews.com/"), None);
        assert_eq!(picture_filename("https://apnews.com/images/"), None);
        assert_eq!(picture_filename("not a url"), None);
    }

    #[tokio::test]
    async fn test_fetch_unreachable_host_returns_empty() {
        let dir = tempfile::tempdir().unwrap();
        let downloader = PictureDownloader::new(Client::new(), dir.path());
        // Nothing listens on the discard port.
        let filename = downloader.fetch("http://127.0.0.1:9/photo.jpg").await;
        assert_eq!(filename, "");
    }

    #[tokio::test]
    async fn test_download_error_kinds() {
        let dir = tempfile::tempdir().unwrap();
        let downloader = PictureDownloader::new(Client::new(), dir.path());

        assert!(matches!(
            downloader.download("https://apnews.com/").await,
            Err(DownloadError::NoFileName(url)) if url == "https://apnews.com/"
        ));
        assert!(matches!(
            downloader.download("http://127.0.0.1:9/photo.jpg").await,
            Err(DownloadError::Transport(_))
        ));
        assert!(!dir.path().join("photo.jpg").exists());
    }

    #[tokio::test]
    async fn test_fetch_url_without_name_returns_empty() {
        let dir = tempfile::tempdir().unwrap();
        let downloader = PictureDownloader::new(Client::new(), dir.path());
        assert_eq!(downloader.fetch("https://apnews.com/").await, "");
    }
}
