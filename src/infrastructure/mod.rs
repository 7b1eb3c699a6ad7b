//! Infrastructure layer - External system adapters
//!
//! Implements the application's port interfaces against real systems:
//! cpal audio capture, the platform backend, and AI provider APIs.

pub mod audio;
pub mod config;
pub mod generation;
pub mod store;
pub mod transcription;
pub mod upload;

// Re-export adapters
pub use audio::{ChunkRecorder, GraphMixer};
pub use config::XdgConfigStore;
pub use generation::ChatApiGenerator;
pub use store::InMemoryRunStore;
pub use transcription::WhisperApiTranscriber;
pub use upload::HttpUploadTransport;
