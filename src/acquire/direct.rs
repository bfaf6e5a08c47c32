use anyhow::Result;
use async_trait::async_trait;
use futures_util::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Client;
use std::io::Write;
use std::path::{Path, PathBuf};
use url::Url;

use super::{fetched_filename, AcquireError, MediaSource};
use crate::utils::format_file_size;

const MEDIA_EXTENSIONS: &[&str] = &[".mp4", ".mov", ".mkv", ".avi", ".webm", ".m4v"];

/// Direct URL source for plain video files
pub struct DirectSource {
    client: Client,
}

impl DirectSource {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    /// Derive a title and extension from the URL's filename
    fn title_and_extension(url: &str) -> (String, String) {
        let parsed = match Url::parse(url) {
            Ok(parsed) => parsed,
            Err(_) => return ("video".to_string(), "mp4".to_string()),
        };

        let filename = parsed
            .path_segments()
            .and_then(|segments| segments.last())
            .filter(|name| !name.is_empty())
            .unwrap_or("video");

        let (stem, ext) = match filename.rfind('.') {
            Some(pos) => (&filename[..pos], &filename[pos + 1..]),
            None => (filename, "mp4"),
        };

        let title = urlencoding::decode(stem)
            .unwrap_or_else(|_| stem.into())
            .replace(['_', '-'], " ");

        (title, ext.to_lowercase())
    }

    async fn fetch_inner(
        &self,
        url: &str,
        dest_dir: &Path,
        session_id: &str,
    ) -> Result<PathBuf> {
        let (title, extension) = Self::title_and_extension(url);
        let file_path = dest_dir.join(fetched_filename(session_id, &title, &extension));

        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            anyhow::bail!("HTTP {}", response.status());
        }

        let total_size = response.content_length().unwrap_or(0);
        tracing::info!(
            "Downloading {} ({}) to {}",
            url,
            format_file_size(total_size),
            file_path.display()
        );

        let progress = ProgressBar::new(total_size);
        progress.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} {msg}")
                .unwrap(),
        );
        progress.set_message("Downloading video...");

        let mut file = fs_err::File::create(&file_path)?;
        let mut downloaded = 0u64;
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk)?;
            downloaded += chunk.len() as u64;
            progress.set_position(downloaded);
        }

        progress.finish_with_message("Download complete");

        Ok(file_path)
    }
}

#[async_trait]
impl MediaSource for DirectSource {
    async fn fetch(
        &self,
        url: &str,
        dest_dir: &Path,
        session_id: &str,
    ) -> Result<PathBuf, AcquireError> {
        self.fetch_inner(url, dest_dir, session_id)
            .await
            .map_err(|source| AcquireError::Fetch {
                url: url.to_string(),
                source,
            })
    }

    fn supports_url(&self, url: &str) -> bool {
        if Url::parse(url).is_err() {
            return false;
        }

        let url_lower = url.to_lowercase();
        MEDIA_EXTENSIONS.iter().any(|ext| url_lower.contains(ext))
    }

    fn source_name(&self) -> &'static str {
        "Direct URL"
    }
}

impl Default for DirectSource {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supports_media_urls_only() {
        let source = DirectSource::new();
        assert!(source.supports_url("https://cdn.example.com/clip.mp4"));
        assert!(source.supports_url("https://cdn.example.com/video.webm?token=1"));
        assert!(!source.supports_url("https://example.com/page.html"));
        assert!(!source.supports_url("not a url"));
    }

    #[test]
    fn test_title_and_extension_from_url() {
        let (title, ext) =
            DirectSource::title_and_extension("https://cdn.example.com/my_summer%20trip.mp4");
        assert_eq!(title, "my summer trip");
        assert_eq!(ext, "mp4");

        let (title, ext) = DirectSource::title_and_extension("https://cdn.example.com/");
        assert_eq!(title, "video");
        assert_eq!(ext, "mp4");
    }
}
