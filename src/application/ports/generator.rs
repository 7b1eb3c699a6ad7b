//! Note generation port interface

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::note::{ClinicalNote, SessionContext};

/// Error when a provider reply cannot be decoded into the note schema,
/// including the fenced-code-block fallback
#[derive(Debug, Clone, Error)]
#[error("Response did not match the note schema: {reason}")]
pub struct SchemaError {
    pub reason: String,
}

/// Generation errors
#[derive(Debug, Clone, Error)]
pub enum GenerationError {
    #[error("Invalid API key")]
    InvalidApiKey,

    #[error("Rate limit exceeded. Please try again later.")]
    RateLimited,

    #[error("Generation returned an empty response")]
    EmptyResponse,

    #[error("API request failed: {0}")]
    RequestFailed(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Port for requesting a structured clinical note from a language model.
///
/// Only de-identified text may ever cross this boundary. The implementation
/// must decode strictly: direct JSON parse, then fenced-block extraction,
/// then a hard failure. Missing fields are never fabricated.
#[async_trait]
pub trait NoteGenerator: Send + Sync {
    /// Generate a structured note from de-identified transcript text.
    async fn generate(
        &self,
        de_identified_text: &str,
        context: &SessionContext,
    ) -> Result<ClinicalNote, GenerationError>;
}

/// Blanket implementation for boxed generators
#[async_trait]
impl NoteGenerator for Box<dyn NoteGenerator> {
    async fn generate(
        &self,
        de_identified_text: &str,
        context: &SessionContext,
    ) -> Result<ClinicalNote, GenerationError> {
        self.as_ref().generate(de_identified_text, context).await
    }
}
