//! Application configuration value object

use serde::{Deserialize, Serialize};

use crate::domain::recording::Duration;

/// Default Whisper-compatible transcription model
pub const DEFAULT_TRANSCRIBE_MODEL: &str = "whisper-1";

/// Default chat model for note generation
pub const DEFAULT_NOTE_MODEL: &str = "gpt-4o-mini";

/// Application configuration.
/// All fields are optional to support partial configs and merging.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub api_key: Option<String>,
    pub upload_url: Option<String>,
    pub provider_url: Option<String>,
    pub transcribe_model: Option<String>,
    pub note_model: Option<String>,
    pub language: Option<String>,
    pub max_duration: Option<String>,
    pub auto_process: Option<bool>,
}

impl AppConfig {
    /// Create config with default values
    pub fn defaults() -> Self {
        Self {
            api_key: None,
            upload_url: None,
            provider_url: Some("https://api.openai.com/v1".to_string()),
            transcribe_model: Some(DEFAULT_TRANSCRIBE_MODEL.to_string()),
            note_model: Some(DEFAULT_NOTE_MODEL.to_string()),
            language: None,
            max_duration: Some("90m".to_string()),
            auto_process: Some(false),
        }
    }

    /// Create an empty config (all None)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Merge this config with another, where other takes precedence.
    /// Only non-None values from other will override this.
    pub fn merge(self, other: Self) -> Self {
        Self {
            api_key: other.api_key.or(self.api_key),
            upload_url: other.upload_url.or(self.upload_url),
            provider_url: other.provider_url.or(self.provider_url),
            transcribe_model: other.transcribe_model.or(self.transcribe_model),
            note_model: other.note_model.or(self.note_model),
            language: other.language.or(self.language),
            max_duration: other.max_duration.or(self.max_duration),
            auto_process: other.auto_process.or(self.auto_process),
        }
    }

    /// Get provider base URL, or the public default if not set
    pub fn provider_url_or_default(&self) -> &str {
        self.provider_url
            .as_deref()
            .unwrap_or("https://api.openai.com/v1")
    }

    /// Get transcription model, or default if not set
    pub fn transcribe_model_or_default(&self) -> &str {
        self.transcribe_model
            .as_deref()
            .unwrap_or(DEFAULT_TRANSCRIBE_MODEL)
    }

    /// Get note model, or default if not set
    pub fn note_model_or_default(&self) -> &str {
        self.note_model.as_deref().unwrap_or(DEFAULT_NOTE_MODEL)
    }

    /// Get max_duration as parsed Duration, or default if not set/invalid
    pub fn max_duration_or_default(&self) -> Duration {
        self.max_duration
            .as_ref()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(Duration::default_max_duration)
    }

    /// Get auto_process setting, or false if not set
    pub fn auto_process_or_default(&self) -> bool {
        self.auto_process.unwrap_or(false)
    }
}
