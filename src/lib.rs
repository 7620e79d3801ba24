//! deckbot - A CLI tool that drafts and edits slide decks with a structured-output LLM
//!
//! Describe the talk you want, get back a deck of markdown/HTML slides, then
//! refine individual slides by index or by description.

pub mod audio;
pub mod cli;
pub mod config;
pub mod llm;
pub mod search;
pub mod slides;
pub mod storage;
pub mod transcription;

use thiserror::Error;

use crate::slides::SlideError;

/// Main error type for deckbot
#[derive(Error, Debug)]
pub enum DeckbotError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid slide content: {0}")]
    Slide(#[from] SlideError),

    #[error("Slide index {index} is out of range for a deck of {len} slides")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Deck has no slides")]
    EmptyDeck,

    #[error("Model output did not match the expected schema: {0}")]
    Schema(String),

    #[error("{service} request failed: {message}")]
    Service {
        service: &'static str,
        message: String,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DeckbotError>;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "deckbot";
