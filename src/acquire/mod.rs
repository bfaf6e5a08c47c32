use async_trait::async_trait;
use std::path::{Path, PathBuf};

pub mod direct;
pub mod youtube;

use crate::utils::title_slug;

/// Errors while fetching a remote source video
#[derive(thiserror::Error, Debug)]
pub enum AcquireError {
    #[error("unsupported source URL: {0}")]
    UnsupportedUrl(String),

    #[error("failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: anyhow::Error,
    },
}

/// External media source boundary: a URL in, a local playable file out
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaSource: Send + Sync {
    /// Fetch the video behind `url` into `dest_dir`, returning the local path
    async fn fetch(
        &self,
        url: &str,
        dest_dir: &Path,
        session_id: &str,
    ) -> Result<PathBuf, AcquireError>;

    /// Check if this source supports the given URL
    fn supports_url(&self, url: &str) -> bool;

    /// Get the name of this source
    fn source_name(&self) -> &'static str;
}

/// Build the local filename for a fetched video:
/// `{session_id}_{title-slug}.{ext}` with the slug capped at 30 characters
pub fn fetched_filename(session_id: &str, title: &str, extension: &str) -> String {
    format!("{}_{}.{}", session_id, title_slug(title), extension)
}

/// Registry for managing multiple media sources
pub struct SourceRegistry {
    sources: Vec<Box<dyn MediaSource>>,
}

impl SourceRegistry {
    /// Create a new registry with default sources
    pub fn new() -> Self {
        let mut registry = Self {
            sources: Vec::new(),
        };

        registry.register(Box::new(youtube::YoutubeSource::new()));
        registry.register(Box::new(direct::DirectSource::new()));

        registry
    }

    /// Register a new source
    pub fn register(&mut self, source: Box<dyn MediaSource>) {
        self.sources.push(source);
    }

    /// Find a source that supports the given URL
    pub fn find_source(&self, url: &str) -> Option<&dyn MediaSource> {
        self.sources
            .iter()
            .find(|source| source.supports_url(url))
            .map(|boxed| boxed.as_ref())
    }

    /// List all supported source names
    pub fn list_sources(&self) -> Vec<&'static str> {
        self.sources.iter().map(|s| s.source_name()).collect()
    }

    /// Fetch a video using the appropriate source
    pub async fn fetch(
        &self,
        url: &str,
        dest_dir: &Path,
        session_id: &str,
    ) -> Result<PathBuf, AcquireError> {
        let source = self
            .find_source(url)
            .ok_or_else(|| AcquireError::UnsupportedUrl(url.to_string()))?;

        tracing::info!("Fetching via {} source: {}", source.source_name(), url);
        source.fetch(url, dest_dir, session_id).await
    }
}

impl Default for SourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetched_filename_convention() {
        assert_eq!(
            fetched_filename("abc123", "My Cool Video", "mp4"),
            "abc123_My_Cool_Video.mp4"
        );

        let long_title = "an extremely long title that will certainly be cut off";
        let name = fetched_filename("s1", long_title, "mp4");
        // session id + '_' + 30-char slug + '.mp4'
        assert_eq!(name.len(), 2 + 1 + 30 + 4);
    }

    #[tokio::test]
    async fn test_registry_rejects_unsupported_url() {
        let registry = SourceRegistry {
            sources: Vec::new(),
        };

        let err = registry
            .fetch("https://example.com/page", Path::new("/tmp"), "s1")
            .await
            .unwrap_err();
        assert!(matches!(err, AcquireError::UnsupportedUrl(_)));
    }

    #[tokio::test]
    async fn test_registry_dispatches_to_supporting_source() {
        let mut mock = MockMediaSource::new();
        mock.expect_supports_url().return_const(true);
        mock.expect_source_name().return_const("Mock");
        mock.expect_fetch()
            .returning(|_, _, _| Ok(PathBuf::from("/tmp/s1_video.mp4")));

        let mut registry = SourceRegistry {
            sources: Vec::new(),
        };
        registry.register(Box::new(mock));

        let path = registry
            .fetch("https://example.com/video.mp4", Path::new("/tmp"), "s1")
            .await
            .unwrap();
        assert_eq!(path, PathBuf::from("/tmp/s1_video.mp4"));
    }

    #[test]
    fn test_default_registry_source_order() {
        let registry = SourceRegistry::new();
        assert_eq!(registry.list_sources(), vec!["YouTube", "Direct URL"]);
    }
}
