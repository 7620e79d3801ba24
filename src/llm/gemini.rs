use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::Settings;
use crate::llm::client::{build_http_client, ensure_success, SlideGenerator};
use crate::llm::prompts::{DECK_SYSTEM_PROMPT, SLIDE_SYSTEM_PROMPT};
use crate::llm::schema::{gemini_deck_schema, gemini_slide_schema, parse_deck, parse_slide};
use crate::slides::{Slide, SlideDeck};
use crate::{DeckbotError, Result};

pub const DEFAULT_GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
const SERVICE: &str = "Gemini";

/// Header carrying the API key; the URL never contains it
pub(crate) const API_KEY_HEADER: &str = "x-goog-api-key";

pub struct GeminiClient {
    http: Client,
    api_key: String,
    model: String,
    endpoint: String,
}

impl GeminiClient {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let api_key = settings.llm.api_key.trim().to_string();
        if api_key.is_empty() {
            return Err(DeckbotError::Config(
                "Gemini API key is missing. Set llm.api_key in config or DECKBOT_GEMINI_API_KEY."
                    .to_string(),
            ));
        }

        let model = if settings.llm.model.trim().is_empty() {
            DEFAULT_GEMINI_MODEL.to_string()
        } else {
            settings.llm.model.trim().to_string()
        };

        Ok(Self {
            http: build_http_client(settings.llm.timeout_secs)?,
            api_key,
            model,
            endpoint: normalize_endpoint(&settings.llm.endpoint),
        })
    }

    fn request_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.endpoint, self.model
        )
    }

    async fn generate_json(&self, system: &str, prompt: &str, schema: Value) -> Result<String> {
        let body = GenerateContentRequest {
            system_instruction: GeminiContent {
                parts: vec![GeminiPart {
                    text: system.to_string(),
                }],
            },
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: schema,
            },
        };

        let response = self
            .http
            .post(self.request_url())
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body)
            .send()
            .await?;

        let payload: GenerateContentResponse = ensure_success(SERVICE, response)
            .await?
            .json()
            .await
            .map_err(|e| DeckbotError::Schema(format!("unreadable Gemini response: {}", e)))?;

        payload
            .candidates
            .iter()
            .flat_map(|c| c.content.parts.iter())
            .filter_map(|p| p.text.as_deref())
            .map(str::trim)
            .find(|t| !t.is_empty())
            .map(str::to_string)
            .ok_or_else(|| DeckbotError::Schema("Gemini response did not contain JSON text".to_string()))
    }
}

#[async_trait]
impl SlideGenerator for GeminiClient {
    async fn generate_slide(&self, request: &str) -> Result<Slide> {
        let text = self
            .generate_json(SLIDE_SYSTEM_PROMPT, request, gemini_slide_schema())
            .await?;
        parse_slide(&text)
    }

    async fn generate_deck(&self, request: &str) -> Result<SlideDeck> {
        let text = self
            .generate_json(DECK_SYSTEM_PROMPT, request, gemini_deck_schema())
            .await?;
        let deck = parse_deck(&text)?;
        tracing::info!("Generated '{}' with {} slides", deck.talk_title, deck.len());
        Ok(deck)
    }
}

pub(crate) fn normalize_endpoint(endpoint: &str) -> String {
    let endpoint = endpoint.trim().trim_end_matches('/');
    if endpoint.is_empty() {
        DEFAULT_GEMINI_ENDPOINT.to_string()
    } else {
        endpoint.to_string()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    system_instruction: GeminiContent,
    contents: Vec<GeminiContent>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: Value,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: GeminiContentResponse,
}

#[derive(Debug, Deserialize)]
struct GeminiContentResponse {
    #[serde(default)]
    parts: Vec<GeminiPartResponse>,
}

#[derive(Debug, Deserialize)]
struct GeminiPartResponse {
    text: Option<String>,
}
