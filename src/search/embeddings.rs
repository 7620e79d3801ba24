//! Text embedding clients

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::Settings;
use crate::llm::{
    build_http_client, ensure_success, normalize_gemini_endpoint, normalize_openai_endpoint,
    GEMINI_API_KEY_HEADER,
};
use crate::{DeckbotError, Result};

const DEFAULT_OPENAI_EMBEDDING_MODEL: &str = "text-embedding-3-small";
const DEFAULT_GEMINI_EMBEDDING_MODEL: &str = "text-embedding-004";

/// Turns texts into vectors, one per input and in input order.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

/// Build an embedder from runtime settings.
pub fn build_embedder(settings: &Settings) -> Result<Box<dyn Embedder>> {
    let api_key = settings.embeddings.api_key.trim().to_string();
    let provider = settings.embeddings.provider.to_lowercase();

    if api_key.is_empty() && matches!(provider.as_str(), "openai" | "gemini") {
        return Err(DeckbotError::Config(format!(
            "Embedding API key is missing for provider '{}'. Set embeddings.api_key in config.",
            provider
        )));
    }

    let http = build_http_client(settings.llm.timeout_secs)?;
    let model = settings.embeddings.model.trim();

    match provider.as_str() {
        "openai" => Ok(Box::new(OpenAiEmbedder {
            http,
            api_key,
            model: non_empty_or(model, DEFAULT_OPENAI_EMBEDDING_MODEL),
            endpoint: normalize_openai_endpoint(&settings.embeddings.endpoint),
        })),
        "gemini" => Ok(Box::new(GeminiEmbedder {
            http,
            api_key,
            model: non_empty_or(model, DEFAULT_GEMINI_EMBEDDING_MODEL),
            endpoint: normalize_gemini_endpoint(&settings.embeddings.endpoint),
        })),
        other => Err(DeckbotError::Config(format!(
            "Unsupported embeddings.provider '{}'. Supported providers: openai, gemini",
            other
        ))),
    }
}

fn non_empty_or(value: &str, default: &str) -> String {
    if value.is_empty() {
        default.to_string()
    } else {
        value.to_string()
    }
}

fn check_count(expected: usize, vectors: Vec<Vec<f32>>) -> Result<Vec<Vec<f32>>> {
    if vectors.len() != expected {
        return Err(DeckbotError::Schema(format!(
            "expected {} embeddings, got {}",
            expected,
            vectors.len()
        )));
    }
    Ok(vectors)
}

/// OpenAI `/embeddings` client.
pub struct OpenAiEmbedder {
    http: Client,
    api_key: String,
    model: String,
    endpoint: String,
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        tracing::debug!("Embedding {} texts with {}", texts.len(), self.model);

        let response = self
            .http
            .post(format!("{}/embeddings", self.endpoint))
            .bearer_auth(&self.api_key)
            .json(&OpenAiEmbeddingRequest {
                model: &self.model,
                input: texts,
            })
            .send()
            .await?;

        let mut payload: OpenAiEmbeddingResponse = ensure_success("OpenAI embeddings", response)
            .await?
            .json()
            .await
            .map_err(|e| DeckbotError::Schema(format!("unreadable embeddings: {}", e)))?;

        payload.data.sort_by_key(|item| item.index);
        check_count(
            texts.len(),
            payload.data.into_iter().map(|item| item.embedding).collect(),
        )
    }
}

#[derive(Debug, Serialize)]
struct OpenAiEmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct OpenAiEmbeddingResponse {
    #[serde(default)]
    data: Vec<OpenAiEmbedding>,
}

#[derive(Debug, Deserialize)]
struct OpenAiEmbedding {
    #[serde(default)]
    index: usize,
    embedding: Vec<f32>,
}

/// Gemini `batchEmbedContents` client.
pub struct GeminiEmbedder {
    http: Client,
    api_key: String,
    model: String,
    endpoint: String,
}

#[async_trait]
impl Embedder for GeminiEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let model = format!("models/{}", self.model);
        let body = GeminiBatchRequest {
            requests: texts
                .iter()
                .map(|text| GeminiEmbedRequest {
                    model: &model,
                    content: GeminiContent {
                        parts: vec![GeminiPart {
                            text: text.as_str(),
                        }],
                    },
                })
                .collect(),
        };

        let response = self
            .http
            .post(format!("{}/{}:batchEmbedContents", self.endpoint, model))
            .header(GEMINI_API_KEY_HEADER, &self.api_key)
            .json(&body)
            .send()
            .await?;

        let payload: GeminiBatchResponse = ensure_success("Gemini embeddings", response)
            .await?
            .json()
            .await
            .map_err(|e| DeckbotError::Schema(format!("unreadable embeddings: {}", e)))?;

        check_count(
            texts.len(),
            payload.embeddings.into_iter().map(|e| e.values).collect(),
        )
    }
}

#[derive(Debug, Serialize)]
struct GeminiBatchRequest<'a> {
    requests: Vec<GeminiEmbedRequest<'a>>,
}

#[derive(Debug, Serialize)]
struct GeminiEmbedRequest<'a> {
    model: &'a str,
    content: GeminiContent<'a>,
}

#[derive(Debug, Serialize)]
struct GeminiContent<'a> {
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Debug, Serialize)]
struct GeminiPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GeminiBatchResponse {
    #[serde(default)]
    embeddings: Vec<GeminiEmbedding>,
}

#[derive(Debug, Deserialize)]
struct GeminiEmbedding {
    #[serde(default)]
    values: Vec<f32>,
}
