//! Audio mixer port interface

use thiserror::Error;

use crate::domain::call::ParticipantId;

/// Mixer errors
#[derive(Debug, Clone, Error)]
pub enum MixerError {
    #[error("Source already attached: {0}")]
    SourceAlreadyAttached(ParticipantIdDisplay),

    #[error("Unknown source: {0}")]
    UnknownSource(ParticipantIdDisplay),

    #[error("Mixer has been released")]
    Released,

    #[error("No audio input device available")]
    NoAudioDevice,

    #[error("Failed to open audio input: {0}")]
    InputFailed(String),
}

/// Owned display form of a participant id for error values
#[derive(Debug, Clone)]
pub struct ParticipantIdDisplay(pub String);

impl std::fmt::Display for ParticipantIdDisplay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&ParticipantId> for ParticipantIdDisplay {
    fn from(id: &ParticipantId) -> Self {
        Self(id.as_str().to_string())
    }
}

/// Port for the per-call audio mixing graph.
///
/// Combines the local input and every connected remote source into one
/// logical output stream. Adding or removing a source never interrupts the
/// output for sources that remain connected. Zero connected tracks means
/// "nothing to record", not an error.
///
/// All methods are synchronous and non-blocking: they run on the audio/timer
/// path and must never stall it.
pub trait AudioMixer: Send + Sync {
    /// Attach a remote source to the graph
    fn add_source(&self, id: ParticipantId) -> Result<(), MixerError>;

    /// Detach a remote source; remaining sources keep flowing
    fn remove_source(&self, id: &ParticipantId) -> Result<(), MixerError>;

    /// Feed samples (16 kHz mono i16) for a connected source
    fn push_samples(&self, id: &ParticipantId, samples: &[i16]) -> Result<(), MixerError>;

    /// Number of currently connected audio tracks, local input included
    fn track_count(&self) -> usize;

    /// Drain and sum everything buffered since the previous drain.
    /// Returns an empty chunk when no source has produced samples.
    fn drain_mixed(&self) -> Vec<i16>;

    /// Release all underlying platform audio resources. Idempotent; called
    /// on every exit path.
    fn release(&self);
}

/// Blanket implementation for Arc-wrapped mixers
impl<M: AudioMixer + ?Sized> AudioMixer for std::sync::Arc<M> {
    fn add_source(&self, id: ParticipantId) -> Result<(), MixerError> {
        self.as_ref().add_source(id)
    }

    fn remove_source(&self, id: &ParticipantId) -> Result<(), MixerError> {
        self.as_ref().remove_source(id)
    }

    fn push_samples(&self, id: &ParticipantId, samples: &[i16]) -> Result<(), MixerError> {
        self.as_ref().push_samples(id, samples)
    }

    fn track_count(&self) -> usize {
        self.as_ref().track_count()
    }

    fn drain_mixed(&self) -> Vec<i16> {
        self.as_ref().drain_mixed()
    }

    fn release(&self) {
        self.as_ref().release()
    }
}
