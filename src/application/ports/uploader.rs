//! Upload transport port interface

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::recording::AudioData;

/// Upload errors
#[derive(Debug, Clone, Error)]
pub enum UploadError {
    #[error("Upload request failed: {0}")]
    ConnectionFailed(String),

    #[error("Upload rejected (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Server reported validation failure for {recording_ref}")]
    ValidationFailed { recording_ref: String },

    #[error("Failed to parse upload response: {0}")]
    ParseError(String),

    #[error("An upload for {recording_ref} is already in flight")]
    AlreadyInFlight { recording_ref: String },
}

/// Progress callback reporting a completed fraction in [0, 1]
pub type ProgressCallback = Arc<dyn Fn(f64) + Send + Sync>;

/// Confirmation returned by a successful upload
#[derive(Debug, Clone)]
pub struct UploadReceipt {
    pub recording_ref: String,
}

/// Port for transmitting a finished recording to storage.
#[async_trait]
pub trait UploadTransport: Send + Sync {
    /// Perform the multipart transfer. Progress fractions are emitted in
    /// `[0, 1]`, reaching exactly 1.0 on success. At most one upload per
    /// recording ref may be in flight.
    async fn upload(
        &self,
        audio: &AudioData,
        recording_ref: &str,
        auto_process: bool,
        on_progress: Option<ProgressCallback>,
    ) -> Result<UploadReceipt, UploadError>;

    /// Best-effort fire-and-forget path for page/process teardown, used
    /// only when no confirmed upload exists. Delivery is NOT confirmed;
    /// callers must not treat this as reliable.
    fn send_on_teardown(&self, audio: AudioData, recording_ref: String);

    /// Ask the server to run the note pipeline for an uploaded recording
    async fn trigger_processing(&self, note_id: &str) -> Result<(), UploadError>;
}

/// Blanket implementation for boxed transports
#[async_trait]
impl UploadTransport for Box<dyn UploadTransport> {
    async fn upload(
        &self,
        audio: &AudioData,
        recording_ref: &str,
        auto_process: bool,
        on_progress: Option<ProgressCallback>,
    ) -> Result<UploadReceipt, UploadError> {
        self.as_ref()
            .upload(audio, recording_ref, auto_process, on_progress)
            .await
    }

    fn send_on_teardown(&self, audio: AudioData, recording_ref: String) {
        self.as_ref().send_on_teardown(audio, recording_ref)
    }

    async fn trigger_processing(&self, note_id: &str) -> Result<(), UploadError> {
        self.as_ref().trigger_processing(note_id).await
    }
}
