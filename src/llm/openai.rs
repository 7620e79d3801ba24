use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::config::Settings;
use crate::llm::client::{build_http_client, ensure_success, SlideGenerator};
use crate::llm::prompts::{DECK_SYSTEM_PROMPT, SLIDE_SYSTEM_PROMPT};
use crate::llm::schema::{openai_deck_schema, openai_slide_schema, parse_deck, parse_slide};
use crate::slides::{Slide, SlideDeck};
use crate::{DeckbotError, Result};

pub const DEFAULT_OPENAI_ENDPOINT: &str = "https://api.openai.com/v1";
const DEFAULT_OPENAI_MODEL: &str = "gpt-4.1-mini";
const SERVICE: &str = "OpenAI";

/// Chat completions client constrained to a JSON schema per call.
pub struct OpenAiClient {
    http: Client,
    api_key: String,
    model: String,
    endpoint: String,
}

impl OpenAiClient {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let api_key = settings.llm.api_key.trim().to_string();
        if api_key.is_empty() {
            return Err(DeckbotError::Config(
                "OpenAI API key is missing. Set llm.api_key in config or OPENAI_API_KEY."
                    .to_string(),
            ));
        }

        let model = if settings.llm.model.trim().is_empty() {
            DEFAULT_OPENAI_MODEL.to_string()
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

    /// Run one chat completion whose reply must match `schema`; returns the raw JSON text.
    async fn complete_structured(
        &self,
        system: &str,
        user: &str,
        schema_name: &str,
        schema: Value,
    ) -> Result<String> {
        let body = ChatCompletionRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            response_format: json!({
                "type": "json_schema",
                "json_schema": {
                    "name": schema_name,
                    "strict": true,
                    "schema": schema,
                }
            }),
        };

        tracing::debug!("Requesting {} from {}", schema_name, self.model);

        let response = self
            .http
            .post(format!("{}/chat/completions", self.endpoint))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let payload: ChatCompletionResponse = ensure_success(SERVICE, response)
            .await?
            .json()
            .await
            .map_err(|e| DeckbotError::Schema(format!("unreadable completion: {}", e)))?;

        let message = payload
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message)
            .ok_or_else(|| DeckbotError::Schema("completion had no choices".to_string()))?;

        if let Some(refusal) = message.refusal {
            return Err(DeckbotError::Service {
                service: SERVICE,
                message: format!("model refused: {}", refusal),
            });
        }

        message
            .content
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| DeckbotError::Schema("completion had no content".to_string()))
    }
}

#[async_trait]
impl SlideGenerator for OpenAiClient {
    async fn generate_slide(&self, request: &str) -> Result<Slide> {
        let text = self
            .complete_structured(SLIDE_SYSTEM_PROMPT, request, "slide", openai_slide_schema())
            .await?;
        parse_slide(&text)
    }

    async fn generate_deck(&self, request: &str) -> Result<SlideDeck> {
        let text = self
            .complete_structured(DECK_SYSTEM_PROMPT, request, "slide_deck", openai_deck_schema())
            .await?;
        let deck = parse_deck(&text)?;
        tracing::info!("Generated '{}' with {} slides", deck.talk_title, deck.len());
        Ok(deck)
    }
}

/// Trim a configured endpoint, falling back to the public OpenAI API.
pub(crate) fn normalize_endpoint(endpoint: &str) -> String {
    let endpoint = endpoint.trim().trim_end_matches('/');
    if endpoint.is_empty() {
        DEFAULT_OPENAI_ENDPOINT.to_string()
    } else {
        endpoint.to_string()
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    response_format: Value,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
    refusal: Option<String>,
}
