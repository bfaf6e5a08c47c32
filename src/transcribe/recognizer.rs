use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use std::path::Path;

/// Errors from the external speech-recognition capability
#[derive(thiserror::Error, Debug)]
pub enum RecognitionError {
    #[error("recognition request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("recognition service returned HTTP {status}: {message}")]
    Service { status: u16, message: String },

    #[error("could not read window audio: {0}")]
    Io(#[from] std::io::Error),
}

/// External speech-recognition boundary: raw window audio in, plain text out.
///
/// Implementations receive one window's WAV file per call and report failure
/// through `RecognitionError`; the caller decides whether to skip or abort.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    async fn recognize(&self, audio: &Path) -> Result<String, RecognitionError>;
}

/// Recognizer backed by an OpenAI-compatible HTTP transcription endpoint
/// (e.g. a local whisper server)
pub struct HttpRecognizer {
    client: Client,
    endpoint: String,
    model: Option<String>,
    language: Option<String>,
}

impl HttpRecognizer {
    pub fn new(endpoint: String, model: Option<String>, language: Option<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint,
            model,
            language,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
}

#[async_trait]
impl SpeechRecognizer for HttpRecognizer {
    async fn recognize(&self, audio: &Path) -> Result<String, RecognitionError> {
        let bytes = fs_err::read(audio)?;

        let part = Part::bytes(bytes)
            .file_name("window.wav")
            .mime_str("audio/wav")?;

        let mut form = Form::new().part("file", part);
        if let Some(model) = &self.model {
            form = form.text("model", model.clone());
        }
        if let Some(language) = &self.language {
            form = form.text("language", language.clone());
        }

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(RecognitionError::Service {
                status: status.as_u16(),
                message,
            });
        }

        let body: TranscriptionResponse = response.json().await?;
        Ok(body.text)
    }
}
