//! Chat-completions note generation adapter
//!
//! Sends the de-identified transcript to an OpenAI-compatible
//! `/chat/completions` endpoint and decodes the reply into the note
//! schema: direct JSON parse first, then fenced-block extraction, then
//! a hard schema failure. Fields are never backfilled.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::application::ports::{GenerationError, NoteGenerator, SchemaError};
use crate::domain::note::{ClinicalNote, NotePrompt, SessionContext};

/// Matches a fenced code block with an optional language tag, capturing
/// the fenced content
static FENCE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```(?:[a-zA-Z]+)?\s*(.*?)```").unwrap());

/// Note generator over an OpenAI-compatible chat endpoint
pub struct ChatApiGenerator {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

impl ChatApiGenerator {
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
        format!("{}/chat/completions", self.base_url)
    }

    /// Decode a model reply into the note schema.
    ///
    /// Direct parse first. If the model wrapped its JSON in a fenced code
    /// block despite instructions, extract the first block and retry.
    /// Anything else is a schema failure.
    fn decode_note(content: &str) -> Result<ClinicalNote, SchemaError> {
        let trimmed = content.trim();

        match serde_json::from_str::<ClinicalNote>(trimmed) {
            Ok(note) => return Ok(note),
            Err(direct_err) => {
                if let Some(captures) = FENCE_REGEX.captures(trimmed) {
                    if let Some(inner) = captures.get(1) {
                        if let Ok(note) =
                            serde_json::from_str::<ClinicalNote>(inner.as_str().trim())
                        {
                            return Ok(note);
                        }
                    }
                }
                Err(SchemaError {
                    reason: direct_err.to_string(),
                })
            }
        }
    }
}

#[async_trait]
impl NoteGenerator for ChatApiGenerator {
    async fn generate(
        &self,
        de_identified_text: &str,
        context: &SessionContext,
    ) -> Result<ClinicalNote, GenerationError> {
        let prompt = NotePrompt::build(de_identified_text, context);

        let payload = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": prompt.system()},
                {"role": "user", "content": prompt.user()},
            ],
            "response_format": {"type": "json_object"},
            "temperature": 0,
        });

        debug!(model = %self.model, chars = de_identified_text.len(), "Requesting note generation");

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| GenerationError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                401 | 403 => GenerationError::InvalidApiKey,
                429 => GenerationError::RateLimited,
                _ => GenerationError::ApiError(format!("HTTP {}: {}", status.as_u16(), body)),
            });
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::RequestFailed(format!("Malformed response: {}", e)))?;

        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();

        if content.trim().is_empty() {
            return Err(GenerationError::EmptyResponse);
        }

        Ok(Self::decode_note(&content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note_json() -> String {
        json!({
            "subjective": "s",
            "objective": "o",
            "assessment": "a",
            "plan": "p",
            "patientComplaint": "pc",
            "personalHistory": "ph",
            "familyHistory": "fh",
            "presentation": "pr",
            "formulationAndDiagnosis": "fd",
            "treatmentPlan": "tp",
            "assignments": "as"
        })
        .to_string()
    }

    #[test]
    fn decode_direct_json() {
        let note = ChatApiGenerator::decode_note(&note_json()).unwrap();
        assert_eq!(note.subjective, "s");
        assert_eq!(note.assignments, "as");
    }

    #[test]
    fn decode_fenced_json() {
        let content = format!("```\n{}\n```", note_json());
        assert!(ChatApiGenerator::decode_note(&content).is_ok());
    }

    #[test]
    fn decode_json_tagged_fence() {
        let content = format!("```json\n{}\n```", note_json());
        assert!(ChatApiGenerator::decode_note(&content).is_ok());
    }

    #[test]
    fn decode_fence_with_surrounding_prose() {
        let content = format!("Here is the note:\n```json\n{}\n```\nLet me know!", note_json());
        assert!(ChatApiGenerator::decode_note(&content).is_ok());
    }

    #[test]
    fn missing_field_is_schema_error() {
        let content = r#"{"subjective": "only one field"}"#;
        let err = ChatApiGenerator::decode_note(content).unwrap_err();
        assert!(err.reason.contains("missing field"));
    }

    #[test]
    fn garbage_is_schema_error() {
        assert!(ChatApiGenerator::decode_note("I cannot help with that.").is_err());
    }

    #[test]
    fn chat_response_parses() {
        let json = r#"{"choices": [{"message": {"role": "assistant", "content": "{}"}}]}"#;
        let parsed: ChatResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.choices.len(), 1);
        assert_eq!(parsed.choices[0].message.content.as_deref(), Some("{}"));
    }

    #[test]
    fn endpoint_shape() {
        let generator = ChatApiGenerator::new(
            reqwest::Client::new(),
            "https://api.openai.com/v1",
            "key",
            "gpt-4o-mini",
        );
        assert_eq!(
            generator.endpoint(),
            "https://api.openai.com/v1/chat/completions"
        );
    }
}
