//! Recording domain module

mod audio_data;
mod duration;
mod session_recording;

pub use audio_data::{AudioData, AudioMimeType};
pub use duration::Duration;
pub use session_recording::SessionRecording;
