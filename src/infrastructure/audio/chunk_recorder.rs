//! Chunked recording session over a mixing graph
//!
//! A timer task drains the mixer roughly once per second and appends the
//! mixed chunk to an in-memory buffer. Stopping drains one final time,
//! then encodes the accumulated PCM to FLAC off the async runtime.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::debug;

use super::flac::{encode_to_flac, TARGET_SAMPLE_RATE};
use crate::application::ports::{AudioMixer, CaptureError, FinishedRecording, RecordingSession};
use crate::domain::{AudioData, AudioMimeType};

/// Recording session that pulls mixed chunks on a timer.
///
/// At most one recording is active at a time; `start` while active is a
/// no-op, as is `stop` while inactive.
pub struct ChunkRecorder {
    buffer: Arc<StdMutex<Vec<i16>>>,
    active: Arc<AtomicBool>,
    drain_task: StdMutex<Option<JoinHandle<()>>>,
    chunk_interval: StdDuration,
}

impl ChunkRecorder {
    /// Default chunk cadence
    pub const DEFAULT_CHUNK_INTERVAL: StdDuration = StdDuration::from_secs(1);

    pub fn new() -> Self {
        Self::with_interval(Self::DEFAULT_CHUNK_INTERVAL)
    }

    /// Construct with a custom chunk cadence (tests use a short one)
    pub fn with_interval(chunk_interval: StdDuration) -> Self {
        Self {
            buffer: Arc::new(StdMutex::new(Vec::new())),
            active: Arc::new(AtomicBool::new(false)),
            drain_task: StdMutex::new(None),
            chunk_interval,
        }
    }
}

impl Default for ChunkRecorder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecordingSession for ChunkRecorder {
    async fn start(&self, mixer: Arc<dyn AudioMixer>) -> Result<(), CaptureError> {
        if self.active.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        self.buffer.lock().unwrap().clear();

        let buffer = Arc::clone(&self.buffer);
        let active = Arc::clone(&self.active);
        let chunk_interval = self.chunk_interval;

        let handle = tokio::spawn(async move {
            let mut ticker = interval(chunk_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let chunk = mixer.drain_mixed();
                if !chunk.is_empty() {
                    if let Ok(mut buffer) = buffer.lock() {
                        buffer.extend_from_slice(&chunk);
                    }
                }
                // The drain above already collected whatever remained,
                // so a cleared flag means we are done.
                if !active.load(Ordering::SeqCst) {
                    break;
                }
            }
        });

        *self.drain_task.lock().unwrap() = Some(handle);
        debug!(interval_ms = chunk_interval.as_millis() as u64, "Chunked capture started");
        Ok(())
    }

    async fn stop(&self) -> Result<Option<FinishedRecording>, CaptureError> {
        if !self.active.swap(false, Ordering::SeqCst) {
            return Ok(None);
        }

        let handle = self.drain_task.lock().unwrap().take();
        if let Some(handle) = handle {
            handle
                .await
                .map_err(|e| CaptureError::CaptureFailed(format!("Drain task failed: {}", e)))?;
        }

        let samples = {
            let mut buffer = self.buffer.lock().unwrap();
            std::mem::take(&mut *buffer)
        };

        if samples.is_empty() {
            debug!("Capture ended with no samples");
            return Ok(None);
        }

        let duration_seconds = samples.len() as f64 / TARGET_SAMPLE_RATE as f64;

        // FLAC encoding is CPU-bound
        let flac_data = tokio::task::spawn_blocking(move || encode_to_flac(&samples))
            .await
            .map_err(|e| CaptureError::EncodeFailed(format!("Encode task failed: {}", e)))?
            .map_err(|e| CaptureError::EncodeFailed(e.to_string()))?;

        if flac_data.is_empty() {
            return Err(CaptureError::EmptyCapture);
        }

        Ok(Some(FinishedRecording {
            audio: AudioData::new(flac_data, AudioMimeType::Flac),
            duration_seconds,
        }))
    }

    fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}
