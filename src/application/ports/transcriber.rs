//! Transcription port interface

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::note::Transcript;
use crate::domain::recording::AudioData;

/// Transcription errors
#[derive(Debug, Clone, Error)]
pub enum TranscriptionError {
    #[error("Invalid API key")]
    InvalidApiKey,

    #[error("Rate limit exceeded. Please try again later.")]
    RateLimited,

    #[error("Transcription returned no text")]
    EmptyTranscript,

    #[error("API request failed: {0}")]
    RequestFailed(String),

    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    #[error("API error: {0}")]
    ApiError(String),
}

/// Options for one transcription request
#[derive(Debug, Clone, Default)]
pub struct TranscribeOptions {
    /// ISO language hint passed to the provider
    pub language_hint: Option<String>,
    /// Free-text context prompt to bias the provider's vocabulary
    pub context_prompt: Option<String>,
}

/// Port for converting a stored recording into raw text.
///
/// Single attempt per call; no retry or backoff is performed here, so a
/// transient provider failure surfaces immediately to the caller.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe a recording blob to text.
    ///
    /// # Arguments
    /// * `audio` - The recording to transcribe
    /// * `recording_id` - Identity of the recording the transcript derives from
    /// * `options` - Language hint and context prompt
    ///
    /// # Returns
    /// The transcript or an error
    async fn transcribe(
        &self,
        audio: &AudioData,
        recording_id: Uuid,
        options: &TranscribeOptions,
    ) -> Result<Transcript, TranscriptionError>;
}

/// Blanket implementation for boxed transcribers
#[async_trait]
impl Transcriber for Box<dyn Transcriber> {
    async fn transcribe(
        &self,
        audio: &AudioData,
        recording_id: Uuid,
        options: &TranscribeOptions,
    ) -> Result<Transcript, TranscriptionError> {
        self.as_ref().transcribe(audio, recording_id, options).await
    }
}
