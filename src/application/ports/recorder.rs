//! Recording session port interface

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use super::mixer::AudioMixer;
use crate::domain::recording::AudioData;

/// Capture errors
#[derive(Debug, Clone, Error)]
pub enum CaptureError {
    #[error("Failed to start recording: {0}")]
    StartFailed(String),

    #[error("Recording failed: {0}")]
    CaptureFailed(String),

    #[error("Recording produced no audio data")]
    EmptyCapture,

    #[error("Failed to encode recording: {0}")]
    EncodeFailed(String),
}

/// A finished recording blob with its measured length
#[derive(Debug, Clone)]
pub struct FinishedRecording {
    pub audio: AudioData,
    pub duration_seconds: f64,
}

/// Port for the chunked recording session over a mixed stream.
///
/// At most one recording is active per session. `start` while active and
/// `stop` while inactive are both no-ops; the finished blob is yielded
/// exactly once, by the `stop` call that ended the active recording.
#[async_trait]
pub trait RecordingSession: Send + Sync {
    /// Begin capturing chunks from the mixed stream. Idempotent.
    async fn start(&self, mixer: Arc<dyn AudioMixer>) -> Result<(), CaptureError>;

    /// Finalize the recording. Returns `None` when no recording was active.
    /// On underlying failure the error surfaces here and no partial blob is
    /// ever returned as valid.
    async fn stop(&self) -> Result<Option<FinishedRecording>, CaptureError>;

    /// Check if a recording is currently active
    fn is_active(&self) -> bool;
}

/// Blanket implementation for Arc-wrapped sessions
#[async_trait]
impl<R: RecordingSession + ?Sized> RecordingSession for Arc<R> {
    async fn start(&self, mixer: Arc<dyn AudioMixer>) -> Result<(), CaptureError> {
        self.as_ref().start(mixer).await
    }

    async fn stop(&self) -> Result<Option<FinishedRecording>, CaptureError> {
        self.as_ref().stop().await
    }

    fn is_active(&self) -> bool {
        self.as_ref().is_active()
    }
}
