//! Domain layer - Core business logic
//!
//! Contains value objects, entities, state machines, and domain errors.
//! This layer has no dependencies on external systems.

pub mod call;
pub mod config;
pub mod error;
pub mod note;
pub mod recording;
pub mod redaction;

// Re-export common types
pub use call::{CallEvent, CallSession, CallState, InvalidStateTransition, ParticipantId};
pub use config::AppConfig;
pub use error::*;
pub use note::{ClinicalNote, ProcessingRun, RunStatus, SessionContext, Transcript};
pub use recording::{AudioData, AudioMimeType, Duration, SessionRecording};
pub use redaction::{de_identify, re_identify, PhiCategory, PhiMap};
