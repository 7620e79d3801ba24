use async_trait::async_trait;
use reqwest::{Client, Response};
use std::time::Duration;

use crate::config::Settings;
use crate::llm::gemini::GeminiClient;
use crate::llm::openai::OpenAiClient;
use crate::slides::{Slide, SlideDeck};
use crate::{DeckbotError, Result};

/// A structured-output model that produces validated slides and decks.
#[async_trait]
pub trait SlideGenerator: Send + Sync {
    /// Produce one slide for the request.
    async fn generate_slide(&self, request: &str) -> Result<Slide>;

    /// Produce a whole deck for the request.
    async fn generate_deck(&self, request: &str) -> Result<SlideDeck>;
}

/// Build a slide generator from runtime settings.
pub fn build_generator(settings: &Settings) -> Result<Box<dyn SlideGenerator>> {
    match settings.llm.provider.to_lowercase().as_str() {
        "openai" => Ok(Box::new(OpenAiClient::from_settings(settings)?)),
        "gemini" => Ok(Box::new(GeminiClient::from_settings(settings)?)),
        other => Err(DeckbotError::Config(format!(
            "Unsupported llm.provider '{}'. Supported providers: openai, gemini",
            other
        ))),
    }
}

/// HTTP client shared by the model, embedding and transcription clients.
pub(crate) fn build_http_client(timeout_secs: u64) -> Result<Client> {
    Ok(Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()?)
}

/// Turn a non-success response into a service error carrying the body.
pub(crate) async fn ensure_success(service: &'static str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    tracing::warn!("{} returned {}: {}", service, status, body.trim());
    Err(DeckbotError::Service {
        service,
        message: format!("{} {}", status, body.trim()),
    })
}
