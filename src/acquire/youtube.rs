use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

use super::{fetched_filename, AcquireError, MediaSource};

/// YouTube video source using yt-dlp
pub struct YoutubeSource {
    yt_dlp_path: String,
}

impl YoutubeSource {
    pub fn new() -> Self {
        Self {
            yt_dlp_path: "yt-dlp".to_string(),
        }
    }

    /// Get video metadata using yt-dlp
    async fn get_video_info(&self, url: &str) -> Result<Value> {
        tracing::debug!("Extracting video info for: {}", url);

        let output = Command::new(&self.yt_dlp_path)
            .args(["--dump-json", "--no-playlist", url])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        if !output.status.success() {
            let error = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("yt-dlp failed: {}", error);
        }

        let json_str = String::from_utf8(output.stdout)?;
        let info: Value = serde_json::from_str(&json_str)?;

        Ok(info)
    }

    async fn fetch_inner(
        &self,
        url: &str,
        dest_dir: &Path,
        session_id: &str,
    ) -> Result<PathBuf> {
        let info = self.get_video_info(url).await?;
        let title = info["title"].as_str().unwrap_or("video");

        let filename = fetched_filename(session_id, title, "mp4");
        let file_path = dest_dir.join(&filename);

        tracing::info!("Downloading '{}' to {}", title, file_path.display());

        let output = Command::new(&self.yt_dlp_path)
            .args([
                "--output",
                &file_path.to_string_lossy(),
                // Prefer a progressive mp4 stream carrying both video and audio
                "--format",
                "best[ext=mp4]/best",
                "--no-playlist",
                "--newline",
                url,
            ])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        if !output.status.success() {
            let error = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("yt-dlp download failed: {}", error);
        }

        Ok(file_path)
    }
}

#[async_trait]
impl MediaSource for YoutubeSource {
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
        // Support various YouTube URL formats
        let url_lower = url.to_lowercase();
        url_lower.contains("youtube.com/watch")
            || url_lower.contains("youtu.be/")
            || url_lower.contains("youtube.com/embed/")
            || url_lower.contains("youtube.com/v/")
            || url_lower.contains("m.youtube.com/")
    }

    fn source_name(&self) -> &'static str {
        "YouTube"
    }
}

impl Default for YoutubeSource {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supports_youtube_urls() {
        let source = YoutubeSource::new();
        assert!(source.supports_url("https://www.youtube.com/watch?v=abc"));
        assert!(source.supports_url("https://youtu.be/abc"));
        assert!(!source.supports_url("https://vimeo.com/12345"));
        assert!(!source.supports_url("https://example.com/clip.mp4"));
    }
}
