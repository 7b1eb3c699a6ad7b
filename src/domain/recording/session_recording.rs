//! Session recording metadata entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::AudioMimeType;

/// Metadata for one finished session recording.
/// Created the instant recording stops; immutable once uploaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecording {
    pub id: Uuid,
    pub booking_id: String,
    pub mime_type: String,
    pub duration_seconds: f64,
    pub byte_size: u64,
    pub storage_ref: String,
    pub created_at: DateTime<Utc>,
}

impl SessionRecording {
    /// Create metadata for a recording that just finished
    pub fn new(
        booking_id: impl Into<String>,
        mime_type: AudioMimeType,
        duration_seconds: f64,
        byte_size: u64,
        storage_ref: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            booking_id: booking_id.into(),
            mime_type: mime_type.as_str().to_string(),
            duration_seconds,
            byte_size,
            storage_ref: storage_ref.into(),
            created_at: Utc::now(),
        }
    }
}
