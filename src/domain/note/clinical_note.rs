//! Structured clinical note entity

use serde::{Deserialize, Serialize};

/// Structured clinical note in extended SOAP form.
///
/// Every field is required: the generator must return the complete schema or
/// fail, it never backfills missing fields. Completion of the note itself is
/// owned by the downstream therapist review workflow, not by this crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClinicalNote {
    pub subjective: String,
    pub objective: String,
    pub assessment: String,
    pub plan: String,
    pub patient_complaint: String,
    pub personal_history: String,
    pub family_history: String,
    pub presentation: String,
    pub formulation_and_diagnosis: String,
    pub treatment_plan: String,
    pub assignments: String,
}

/// Context about the session passed alongside the de-identified transcript.
/// Free of direct identifiers by construction.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    pub session_type: Option<String>,
    pub presenting_concerns: Option<String>,
}

impl SessionContext {
    /// Render the context lines appended to the generation request
    pub fn render(&self) -> String {
        let mut lines = Vec::new();
        if let Some(ref kind) = self.session_type {
            lines.push(format!("Session type: {}", kind));
        }
        if let Some(ref concerns) = self.presenting_concerns {
            lines.push(format!("Presenting concerns: {}", concerns));
        }
        lines.join("\n")
    }
}
