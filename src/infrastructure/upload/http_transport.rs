//! HTTP upload transport for the platform backend
//!
//! Streams the recording blob as a multipart part so upload progress can
//! be reported in fractions of bytes sent. One upload per recording ref
//! may be in flight at a time.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex};

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::multipart;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::application::ports::{ProgressCallback, UploadError, UploadReceipt, UploadTransport};
use crate::domain::AudioData;

/// Chunk size for the streamed multipart body
const STREAM_CHUNK_SIZE: usize = 64 * 1024;

/// Upload transport over the platform's HTTP API
pub struct HttpUploadTransport {
    client: reqwest::Client,
    base_url: String,
    in_flight: Arc<StdMutex<HashSet<String>>>,
}

/// Response body for a completed upload
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadResponse {
    success: bool,
    #[serde(default)]
    recording_ref: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl HttpUploadTransport {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            in_flight: Arc::new(StdMutex::new(HashSet::new())),
        }
    }

    fn upload_url(&self) -> String {
        format!("{}/recordings/audio", self.base_url)
    }

    fn processing_url(&self, note_id: &str) -> String {
        format!("{}/notes/{}/process-audio", self.base_url, note_id)
    }

    /// Fraction of the transfer completed after `sent` of `total` bytes
    fn progress_fraction(sent: u64, total: u64) -> f64 {
        if total == 0 {
            return 1.0;
        }
        (sent as f64 / total as f64).min(1.0)
    }

    /// Build the streamed audio part, wiring the byte counter to the
    /// progress callback. The final chunk reports exactly 1.0.
    fn audio_part(
        audio: &AudioData,
        on_progress: Option<ProgressCallback>,
    ) -> Result<multipart::Part, UploadError> {
        let total_bytes = audio.size_bytes() as u64;
        let file_name = audio.file_name();
        let mime_type = audio.mime_type().as_str();

        let chunks: Vec<Vec<u8>> = audio
            .data()
            .chunks(STREAM_CHUNK_SIZE)
            .map(|c| c.to_vec())
            .collect();

        let sent = Arc::new(AtomicU64::new(0));
        let byte_stream = futures_util::stream::iter(chunks).map(move |chunk| {
            let sent_so_far =
                sent.fetch_add(chunk.len() as u64, Ordering::SeqCst) + chunk.len() as u64;
            if let Some(ref progress) = on_progress {
                progress(Self::progress_fraction(sent_so_far, total_bytes));
            }
            Ok::<Vec<u8>, std::io::Error>(chunk)
        });

        multipart::Part::stream_with_length(reqwest::Body::wrap_stream(byte_stream), total_bytes)
            .file_name(file_name)
            .mime_str(mime_type)
            .map_err(|e| UploadError::ConnectionFailed(format!("Invalid mime type: {}", e)))
    }
}

#[async_trait]
impl UploadTransport for HttpUploadTransport {
    async fn upload(
        &self,
        audio: &AudioData,
        recording_ref: &str,
        auto_process: bool,
        on_progress: Option<ProgressCallback>,
    ) -> Result<UploadReceipt, UploadError> {
        {
            let mut in_flight = self.in_flight.lock().unwrap();
            if !in_flight.insert(recording_ref.to_string()) {
                return Err(UploadError::AlreadyInFlight {
                    recording_ref: recording_ref.to_string(),
                });
            }
        }

        let result = self
            .perform_upload(audio, recording_ref, auto_process, on_progress)
            .await;

        self.in_flight.lock().unwrap().remove(recording_ref);
        result
    }

    fn send_on_teardown(&self, audio: AudioData, recording_ref: String) {
        let client = self.client.clone();
        let url = self.upload_url();

        // Fire and forget: the process may exit before this lands, and no
        // confirmation is ever observed by the caller.
        tokio::spawn(async move {
            let part = match Self::audio_part(&audio, None) {
                Ok(part) => part,
                Err(e) => {
                    debug!(recording_ref = %recording_ref, error = %e, "Teardown upload skipped");
                    return;
                }
            };
            let form = multipart::Form::new()
                .part("audio", part)
                .text("recordingRef", recording_ref.clone())
                .text("autoProcess", "false");

            match client.post(&url).multipart(form).send().await {
                Ok(response) => {
                    debug!(
                        recording_ref = %recording_ref,
                        status = response.status().as_u16(),
                        "Teardown upload dispatched"
                    );
                }
                Err(e) => {
                    debug!(recording_ref = %recording_ref, error = %e, "Teardown upload failed");
                }
            }
        });
    }

    async fn trigger_processing(&self, note_id: &str) -> Result<(), UploadError> {
        let response = self
            .client
            .post(self.processing_url(note_id))
            .send()
            .await
            .map_err(|e| UploadError::ConnectionFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(UploadError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        Ok(())
    }
}

impl HttpUploadTransport {
    async fn perform_upload(
        &self,
        audio: &AudioData,
        recording_ref: &str,
        auto_process: bool,
        on_progress: Option<ProgressCallback>,
    ) -> Result<UploadReceipt, UploadError> {
        let part = Self::audio_part(audio, on_progress)?;
        let form = multipart::Form::new()
            .part("audio", part)
            .text("recordingRef", recording_ref.to_string())
            .text("autoProcess", auto_process.to_string());

        debug!(
            recording_ref = %recording_ref,
            bytes = audio.size_bytes(),
            auto_process,
            "Uploading recording"
        );

        let response = self
            .client
            .post(self.upload_url())
            .multipart(form)
            .send()
            .await
            .map_err(|e| UploadError::ConnectionFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!(
                recording_ref = %recording_ref,
                status = status.as_u16(),
                "Upload rejected"
            );
            return Err(UploadError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| UploadError::ParseError(e.to_string()))?;

        if !body.success {
            if let Some(message) = body.message {
                warn!(recording_ref = %recording_ref, message = %message, "Upload not accepted");
            }
            return Err(UploadError::ValidationFailed {
                recording_ref: recording_ref.to_string(),
            });
        }

        Ok(UploadReceipt {
            recording_ref: body.recording_ref.unwrap_or_else(|| recording_ref.to_string()),
        })
    }
}
