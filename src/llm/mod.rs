//! LLM module for deckbot
//!
//! Structured-output calls that turn a request into a validated slide or deck.

mod client;
mod gemini;
mod openai;
pub mod prompts;
pub mod schema;

pub use client::{build_generator, SlideGenerator};
pub(crate) use client::{build_http_client, ensure_success};
pub use gemini::GeminiClient;
pub use openai::OpenAiClient;
pub(crate) use openai::normalize_endpoint as normalize_openai_endpoint;
pub(crate) use gemini::normalize_endpoint as normalize_gemini_endpoint;
pub(crate) use gemini::API_KEY_HEADER as GEMINI_API_KEY_HEADER;
