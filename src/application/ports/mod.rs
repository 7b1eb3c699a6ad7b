//! Port interfaces (traits) for external systems
//!
//! These traits define the boundaries between the application
//! and infrastructure layers.

pub mod config;
pub mod generator;
pub mod mixer;
pub mod recorder;
pub mod run_store;
pub mod transcriber;
pub mod uploader;

// Re-export common types
pub use config::ConfigStore;
pub use generator::{GenerationError, NoteGenerator, SchemaError};
pub use mixer::{AudioMixer, MixerError};
pub use recorder::{CaptureError, FinishedRecording, RecordingSession};
pub use run_store::{RunStore, RunStoreError};
pub use transcriber::{TranscribeOptions, Transcriber, TranscriptionError};
pub use uploader::{ProgressCallback, UploadError, UploadReceipt, UploadTransport};
