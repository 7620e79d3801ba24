//! Speech-to-text over the OpenAI transcription endpoint

use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::config::Settings;
use crate::llm::{build_http_client, ensure_success, normalize_openai_endpoint};
use crate::{DeckbotError, Result};

/// Whisper API transcriber
pub struct WhisperTranscriber {
    http: Client,
    api_key: String,
    model: String,
    endpoint: String,
    language: Option<String>,
    temp_dir: PathBuf,
}

impl WhisperTranscriber {
    /// Create a new transcriber from settings
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let api_key = settings.transcription.api_key.trim().to_string();
        if api_key.is_empty() {
            return Err(DeckbotError::Config(
                "Transcription API key is missing. Set transcription.api_key in config or OPENAI_API_KEY."
                    .to_string(),
            ));
        }

        let language = if settings.transcription.language.trim().is_empty() {
            None
        } else {
            Some(settings.transcription.language.trim().to_string())
        };

        Ok(Self {
            http: build_http_client(settings.llm.timeout_secs)?,
            api_key,
            model: settings.transcription.model.trim().to_string(),
            endpoint: normalize_openai_endpoint(&settings.transcription.endpoint),
            language,
            temp_dir: std::env::temp_dir(),
        })
    }

    /// Stage audio under `dir` instead of the system temp directory
    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = dir.into();
        self
    }

    /// Transcribe a WAV-encoded buffer.
    ///
    /// The buffer is staged in a temporary `.wav` file that is removed
    /// when this returns, whether or not transcription succeeded.
    pub async fn transcribe(&self, audio: &[u8]) -> Result<String> {
        let mut staged = tempfile::Builder::new()
            .prefix("deckbot-")
            .suffix(".wav")
            .tempfile_in(&self.temp_dir)?;
        staged.write_all(audio)?;
        staged.flush()?;

        tracing::debug!(
            "Staged {} bytes of audio at {}",
            audio.len(),
            staged.path().display()
        );

        self.upload(staged.path()).await
    }

    /// Transcribe a WAV file on disk
    pub async fn transcribe_file(&self, path: &Path) -> Result<String> {
        let audio = tokio::fs::read(path).await?;
        self.transcribe(&audio).await
    }

    async fn upload(&self, path: &Path) -> Result<String> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "audio.wav".to_string());

        let file = Part::bytes(bytes).file_name(file_name).mime_str("audio/wav")?;
        let mut form = Form::new()
            .text("model", self.model.clone())
            .part("file", file);
        if let Some(ref language) = self.language {
            form = form.text("language", language.clone());
        }

        let response = self
            .http
            .post(format!("{}/audio/transcriptions", self.endpoint))
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await?;

        let payload: TranscriptionResponse = ensure_success("OpenAI transcription", response)
            .await?
            .json()
            .await
            .map_err(|e| DeckbotError::Schema(format!("unreadable transcription: {}", e)))?;

        let text = payload.text.trim().to_string();
        tracing::info!("Transcribed {} characters", text.len());
        Ok(text)
    }
}

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
}
