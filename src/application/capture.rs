//! Call capture binding use case
//!
//! Drives the call lifecycle state machine from provider events and
//! binds recorder start/stop to participant presence.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::application::ports::{
    AudioMixer, CaptureError, FinishedRecording, MixerError, RecordingSession,
};
use crate::domain::{CallEvent, CallSession, CallState, InvalidStateTransition};

/// Errors that occur while binding call events to the recorder
#[derive(Debug, Error)]
pub enum BindError {
    #[error("Call failed: {0}")]
    CallFailed(String),

    #[error(transparent)]
    InvalidTransition(#[from] InvalidStateTransition),

    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error(transparent)]
    Mixer(#[from] MixerError),
}

/// Result of a completed call: whatever audio was captured, plus the
/// terminal state the call session ended in.
pub struct CaptureOutcome {
    pub finished: Option<FinishedRecording>,
    pub final_state: CallState,
}

/// Binds a call session's event stream to a mixer and recorder.
///
/// Consumes provider events from a channel and drives the call state
/// machine: recording starts once the call is joined and at least one
/// audio source is attached, and stops when the call ends. The binder
/// owns the session for the duration of the call.
pub struct CaptureBinder {
    session: CallSession,
    mixer: Arc<dyn AudioMixer>,
    recorder: Arc<dyn RecordingSession>,
    settle_delay: StdDuration,
}

impl CaptureBinder {
    /// Default delay between join confirmation and recorder start,
    /// giving remote tracks a moment to attach.
    pub const DEFAULT_SETTLE_DELAY: StdDuration = StdDuration::from_millis(500);

    pub fn new(mixer: Arc<dyn AudioMixer>, recorder: Arc<dyn RecordingSession>) -> Self {
        Self {
            session: CallSession::new(),
            mixer,
            recorder,
            settle_delay: Self::DEFAULT_SETTLE_DELAY,
        }
    }

    /// Override the settle delay (used by tests to avoid sleeping).
    pub fn with_settle_delay(mut self, delay: StdDuration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Runs the event loop until the call ends or fails.
    ///
    /// A closed channel is treated as the provider disconnecting and is
    /// handled like a normal leave.
    pub async fn run(
        mut self,
        mut events: mpsc::Receiver<CallEvent>,
    ) -> Result<CaptureOutcome, BindError> {
        self.session.begin_join()?;

        while let Some(event) = events.recv().await {
            match event {
                CallEvent::Joined => {
                    self.session.confirm_join()?;
                    info!("Call joined");
                    if !self.settle_delay.is_zero() {
                        tokio::time::sleep(self.settle_delay).await;
                    }
                    self.try_start_recording().await?;
                }
                CallEvent::ParticipantJoined(id) => {
                    debug!(participant = %id, "Participant joined");
                    match self.mixer.add_source(id) {
                        Ok(()) => {}
                        // Re-join after a dropped connection reuses the
                        // same participant id; keep the existing source.
                        Err(MixerError::SourceAlreadyAttached(_)) => {}
                        Err(e) => return Err(self.teardown_failed(e.into()).await),
                    }
                    if self.session.state() == CallState::Joined {
                        self.try_start_recording().await?;
                    }
                }
                CallEvent::ParticipantLeft(id) => {
                    debug!(participant = %id, "Participant left");
                    match self.mixer.remove_source(&id) {
                        Ok(()) | Err(MixerError::UnknownSource(_)) => {}
                        Err(e) => return Err(self.teardown_failed(e.into()).await),
                    }
                }
                CallEvent::Left => {
                    return self.finish().await;
                }
                CallEvent::Error(message) => {
                    return Err(self.teardown_failed(BindError::CallFailed(message)).await);
                }
            }
        }

        // Provider went away without a leave event
        warn!("Call event channel closed without leave event");
        self.finish().await
    }

    /// Starts the recorder if the call is joined and audio is flowing.
    /// Recording never starts with zero attached sources.
    async fn try_start_recording(&mut self) -> Result<(), BindError> {
        if self.session.state() != CallState::Joined {
            return Ok(());
        }
        if self.mixer.track_count() == 0 {
            warn!("No audio sources attached yet, deferring recorder start");
            return Ok(());
        }
        if let Err(e) = self.recorder.start(Arc::clone(&self.mixer)).await {
            return Err(self.teardown_failed(e.into()).await);
        }
        self.session.start_recording()?;
        info!(tracks = self.mixer.track_count(), "Recording started");
        Ok(())
    }

    /// Normal teardown: stop the recorder, leave the call, release the mixer.
    async fn finish(mut self) -> Result<CaptureOutcome, BindError> {
        let finished = if self.recorder.is_active() {
            self.recorder.stop().await?
        } else {
            None
        };
        self.session.leave();
        self.mixer.release();
        if let Some(ref recording) = finished {
            info!(
                duration_seconds = recording.duration_seconds,
                bytes = recording.audio.size_bytes(),
                "Capture finished"
            );
        } else {
            info!("Call ended without captured audio");
        }
        Ok(CaptureOutcome {
            finished,
            final_state: self.session.state(),
        })
    }

    /// Failure teardown: discard any partial capture, mark the session
    /// failed and release the mixer before surfacing the error.
    async fn teardown_failed(&mut self, error: BindError) -> BindError {
        if self.recorder.is_active() {
            if let Err(e) = self.recorder.stop().await {
                warn!("Recorder stop during teardown failed: {}", e);
            }
        }
        self.session.fail();
        self.mixer.release();
        error
    }
}
