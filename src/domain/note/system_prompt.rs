//! Note generation prompt value object

use super::SessionContext;

/// Fixed instruction sent as the system message for note generation
const BASE_INSTRUCTION: &str = r#"You are a clinical documentation assistant for therapy sessions. From the de-identified session transcript, produce a structured clinical note.

Instructions:
- Respond with strict JSON only, no prose and no markdown
- The JSON object must contain exactly these keys: "subjective", "objective", "assessment", "plan", "patientComplaint", "personalHistory", "familyHistory", "presentation", "formulationAndDiagnosis", "treatmentPlan", "assignments"
- Every value must be a string; write "Not discussed" when the transcript gives no information for a field
- Preserve placeholder tokens such as [PATIENT_NAME] and [LOCATION] exactly as they appear; never invent identifying details
- Base every statement on the transcript; do not speculate beyond it"#;

/// Value object holding the complete prompt pair for one generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotePrompt {
    system: &'static str,
    user: String,
}

impl NotePrompt {
    /// Build the prompt for a de-identified transcript and session context
    pub fn build(de_identified_text: &str, context: &SessionContext) -> Self {
        let rendered = context.render();
        let user = if rendered.is_empty() {
            format!("Session transcript:\n{}", de_identified_text)
        } else {
            format!("{}\n\nSession transcript:\n{}", rendered, de_identified_text)
        };
        Self {
            system: BASE_INSTRUCTION,
            user,
        }
    }

    /// Get the system message content
    pub fn system(&self) -> &str {
        self.system
    }

    /// Get the user message content
    pub fn user(&self) -> &str {
        &self.user
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_contains_schema_keys() {
        let prompt = NotePrompt::build("text", &SessionContext::default());
        assert!(prompt.system().contains("formulationAndDiagnosis"));
        assert!(prompt.system().contains("strict JSON"));
    }

    #[test]
    fn user_message_contains_transcript() {
        let prompt = NotePrompt::build("the transcript body", &SessionContext::default());
        assert!(prompt.user().contains("the transcript body"));
    }

    #[test]
    fn user_message_includes_context_when_set() {
        let ctx = SessionContext {
            session_type: Some("initial consultation".to_string()),
            presenting_concerns: None,
        };
        let prompt = NotePrompt::build("t", &ctx);
        assert!(prompt.user().contains("initial consultation"));
    }
}
