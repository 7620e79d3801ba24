//! Configuration module for deckbot
//!
//! Handles loading and managing application settings from TOML files.

mod settings;

pub use settings::{
    AudioSettings, EmbeddingSettings, GeneralSettings, LlmSettings, Settings,
    TranscriptionSettings,
};
