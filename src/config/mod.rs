use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;

use crate::media::EncoderProfile;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application settings
    pub app: AppConfig,

    /// Speech-recognition endpoint settings
    pub recognizer: RecognizerConfig,

    /// Encoding profile applied to every rendered clip
    pub encoder: EncoderProfile,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory for fetched videos (current directory if unset)
    pub download_dir: Option<PathBuf>,

    /// Transcription window length in seconds
    pub window_seconds: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecognizerConfig {
    /// HTTP transcription endpoint (OpenAI-compatible)
    pub endpoint: String,

    /// Model name passed to the endpoint, if it needs one
    pub model: Option<String>,

    /// Language hint (auto-detect if unset)
    pub language: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app: AppConfig {
                download_dir: None,
                window_seconds: 10.0,
            },
            recognizer: RecognizerConfig {
                endpoint: "http://localhost:9000/v1/audio/transcriptions".to_string(),
                model: None,
                language: None,
            },
            encoder: EncoderProfile::default(),
        }
    }
}

impl Config {
    /// Load configuration from file or create default
    pub async fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = fs_err::read_to_string(&config_path)
                .context("Failed to read config file")?;

            let config: Config = serde_yaml::from_str(&content)
                .context("Failed to parse config file")?;

            config.validate()?;
            Ok(config)
        } else {
            let config = Self::default();
            config.save().await?;
            Ok(config)
        }
    }

    /// Save configuration to file
    pub async fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            fs_err::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(self)
            .context("Failed to serialize config")?;

        fs_err::write(&config_path, content)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Get configuration file path
    fn config_path() -> Result<PathBuf> {
        // First try current directory for easy testing
        let local_config = PathBuf::from("config.yaml");
        if local_config.exists() {
            return Ok(local_config);
        }

        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?;

        Ok(config_dir.join("clipsmith").join("config.yaml"))
    }

    /// Validate configuration
    fn validate(&self) -> Result<()> {
        if self.app.window_seconds <= 0.0 {
            anyhow::bail!("Transcription window length must be positive");
        }

        Url::parse(&self.recognizer.endpoint)
            .context("Recognizer endpoint is not a valid URL")?;

        Ok(())
    }

    /// Display current configuration
    pub fn display(&self) {
        println!("Current Configuration:");
        if let Some(dir) = &self.app.download_dir {
            println!("  Download Dir: {}", dir.display());
        }
        println!("  Window Length: {}s", self.app.window_seconds);
        println!("  Recognizer Endpoint: {}", self.recognizer.endpoint);
        if let Some(model) = &self.recognizer.model {
            println!("  Recognizer Model: {}", model);
        }
        println!(
            "  Encoder: {} / {} (crf {}, preset {})",
            self.encoder.video_codec,
            self.encoder.audio_codec,
            self.encoder.crf,
            self.encoder.preset
        );
    }
}
