//! Transcript entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Raw transcript derived from one recording.
/// At most one live transcript per recording; a re-run overwrites it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transcript {
    pub recording_id: Uuid,
    pub raw_text: String,
    pub language_hint: Option<String>,
    pub generated_at: DateTime<Utc>,
}

impl Transcript {
    pub fn new(
        recording_id: Uuid,
        raw_text: impl Into<String>,
        language_hint: Option<String>,
    ) -> Self {
        Self {
            recording_id,
            raw_text: raw_text.into(),
            language_hint,
            generated_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_sets_timestamp() {
        let id = Uuid::new_v4();
        let t = Transcript::new(id, "hello", Some("en".to_string()));
        assert_eq!(t.recording_id, id);
        assert_eq!(t.raw_text, "hello");
        assert_eq!(t.language_hint.as_deref(), Some("en"));
    }
}
