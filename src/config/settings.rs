//! Application settings management

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::APP_NAME;

/// Main application settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// General settings
    #[serde(default)]
    pub general: GeneralSettings,

    /// Slide generation model settings
    #[serde(default)]
    pub llm: LlmSettings,

    /// Embedding model used to select slides by description
    #[serde(default)]
    pub embeddings: EmbeddingSettings,

    /// Speech-to-text settings
    #[serde(default)]
    pub transcription: TranscriptionSettings,

    /// Microphone capture settings
    #[serde(default)]
    pub audio: AudioSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralSettings {
    /// Data directory for the deck library
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Directory `save` writes to when no path is given
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    /// LLM provider (openai, gemini)
    #[serde(default = "default_provider")]
    pub provider: String,

    /// API key
    #[serde(default)]
    pub api_key: String,

    /// Model name (empty = provider default)
    #[serde(default)]
    pub model: String,

    /// API endpoint (empty = provider default)
    #[serde(default)]
    pub endpoint: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingSettings {
    /// Embedding provider (openai, gemini)
    #[serde(default = "default_provider")]
    pub provider: String,

    /// API key (empty = reuse llm.api_key when the provider matches)
    #[serde(default)]
    pub api_key: String,

    /// Model name (empty = provider default)
    #[serde(default)]
    pub model: String,

    /// API endpoint (empty = provider default)
    #[serde(default)]
    pub endpoint: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptionSettings {
    /// API key (empty = reuse llm.api_key when the llm provider is openai)
    #[serde(default)]
    pub api_key: String,

    /// Transcription model
    #[serde(default = "default_transcription_model")]
    pub model: String,

    /// API endpoint (empty = OpenAI)
    #[serde(default)]
    pub endpoint: String,

    /// Spoken language as ISO-639-1 (empty = auto-detect)
    #[serde(default)]
    pub language: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioSettings {
    /// Sample rate for recording (16000 is enough for speech)
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    /// Number of audio channels (1 = mono, 2 = stereo)
    #[serde(default = "default_channels")]
    pub channels: u16,

    /// Recording length used when `--seconds` is not given
    #[serde(default = "default_max_seconds")]
    pub max_seconds: u64,
}

// Default value functions

fn default_data_dir() -> PathBuf {
    ProjectDirs::from("com", APP_NAME, APP_NAME)
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("~/.local/share/deckbot"))
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("decks")
}

fn default_provider() -> String {
    "openai".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_transcription_model() -> String {
    "whisper-1".to_string()
}

fn default_sample_rate() -> u32 {
    16000
}

fn default_channels() -> u16 {
    1
}

fn default_max_seconds() -> u64 {
    30
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            output_dir: default_output_dir(),
        }
    }
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            api_key: String::new(),
            model: String::new(),
            endpoint: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            api_key: String::new(),
            model: String::new(),
            endpoint: String::new(),
        }
    }
}

impl Default for TranscriptionSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_transcription_model(),
            endpoint: String::new(),
            language: String::new(),
        }
    }
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            sample_rate: default_sample_rate(),
            channels: default_channels(),
            max_seconds: default_max_seconds(),
        }
    }
}

/// Environment variable consulted for a provider's key.
fn api_key_var(provider: &str) -> Option<&'static str> {
    match provider.to_lowercase().as_str() {
        "openai" => Some("OPENAI_API_KEY"),
        "gemini" => Some("DECKBOT_GEMINI_API_KEY"),
        _ => None,
    }
}

impl Settings {
    /// Load settings from the configuration file
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        let mut settings = if config_path.exists() {
            Self::load_from(&config_path)?
        } else {
            tracing::info!("No config file found, using defaults");
            Self::default()
        };

        settings.apply_env_overrides(|name| std::env::var(name).ok());
        Ok(settings)
    }

    /// Parse a settings file without applying environment overrides
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Fill empty API keys from the environment, then from sibling sections
    /// that talk to the same provider.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let from_env = |provider: &str| {
            api_key_var(provider)
                .and_then(|name| lookup(name))
                .filter(|key| !key.trim().is_empty())
        };

        if self.llm.api_key.trim().is_empty() {
            if let Some(key) = from_env(&self.llm.provider) {
                self.llm.api_key = key;
            }
        }

        if self.embeddings.api_key.trim().is_empty() {
            if let Some(key) = from_env(&self.embeddings.provider) {
                self.embeddings.api_key = key;
            } else if self.embeddings.provider.eq_ignore_ascii_case(&self.llm.provider) {
                self.embeddings.api_key = self.llm.api_key.clone();
            }
        }

        if self.transcription.api_key.trim().is_empty() {
            if let Some(key) = from_env("openai") {
                self.transcription.api_key = key;
            } else if self.llm.provider.eq_ignore_ascii_case("openai") {
                self.transcription.api_key = self.llm.api_key.clone();
            }
        }
    }

    /// Get the path to the configuration file
    pub fn config_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("com", APP_NAME, APP_NAME)
            .context("Could not determine config directory")?;

        let config_dir = dirs.config_dir();
        Ok(config_dir.join("config.toml"))
    }

    /// Write default configuration to a file
    pub fn write_default(path: &Path) -> Result<()> {
        let settings = Self::default();
        let content = toml::to_string_pretty(&settings)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the database path
    pub fn database_path(&self) -> PathBuf {
        self.general.data_dir.join(format!("{}.db", APP_NAME))
    }
}
