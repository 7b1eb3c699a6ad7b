//! Whisper-compatible transcription API adapter
//!
//! Works against any OpenAI-compatible `/audio/transcriptions` endpoint.
//! Single attempt per call; transient provider failures surface to the
//! pipeline, which marks the run failed.

use async_trait::async_trait;
use reqwest::multipart;
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

use crate::application::ports::{TranscribeOptions, Transcriber, TranscriptionError};
use crate::domain::note::Transcript;
use crate::domain::recording::AudioData;

/// Transcriber over an OpenAI-compatible speech-to-text endpoint
pub struct WhisperApiTranscriber {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

/// JSON response from the transcription endpoint
#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
    #[serde(default)]
    language: Option<String>,
}

/// Error payload some providers wrap their failures in
#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

impl WhisperApiTranscriber {
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/audio/transcriptions", self.base_url)
    }

    fn build_form(
        audio: &AudioData,
        model: &str,
        options: &TranscribeOptions,
    ) -> Result<multipart::Form, TranscriptionError> {
        let part = multipart::Part::bytes(audio.data().to_vec())
            .file_name(audio.file_name())
            .mime_str(audio.mime_type().as_str())
            .map_err(|e| TranscriptionError::RequestFailed(format!("Invalid mime type: {}", e)))?;

        let mut form = multipart::Form::new()
            .part("file", part)
            .text("model", model.to_string())
            .text("response_format", "json")
            // Deterministic decoding keeps repeat runs comparable
            .text("temperature", "0");

        if let Some(ref language) = options.language_hint {
            form = form.text("language", language.clone());
        }
        if let Some(ref prompt) = options.context_prompt {
            form = form.text("prompt", prompt.clone());
        }

        Ok(form)
    }

    /// Pull a provider error message out of the response body if present
    fn extract_error_message(body: &str) -> String {
        serde_json::from_str::<ApiErrorResponse>(body)
            .map(|e| e.error.message)
            .unwrap_or_else(|_| body.to_string())
    }
}

#[async_trait]
impl Transcriber for WhisperApiTranscriber {
    async fn transcribe(
        &self,
        audio: &AudioData,
        recording_id: Uuid,
        options: &TranscribeOptions,
    ) -> Result<Transcript, TranscriptionError> {
        let form = Self::build_form(audio, &self.model, options)?;

        debug!(
            recording_id = %recording_id,
            model = %self.model,
            bytes = audio.size_bytes(),
            "Requesting transcription"
        );

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| TranscriptionError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                401 | 403 => TranscriptionError::InvalidApiKey,
                429 => TranscriptionError::RateLimited,
                _ => TranscriptionError::ApiError(format!(
                    "HTTP {}: {}",
                    status.as_u16(),
                    Self::extract_error_message(&body)
                )),
            });
        }

        let body: TranscriptionResponse = response
            .json()
            .await
            .map_err(|e| TranscriptionError::ParseError(e.to_string()))?;

        let text = body.text.trim();
        if text.is_empty() {
            return Err(TranscriptionError::EmptyTranscript);
        }

        let language_hint = body.language.or_else(|| options.language_hint.clone());
        Ok(Transcript::new(recording_id, text, language_hint))
    }
}
