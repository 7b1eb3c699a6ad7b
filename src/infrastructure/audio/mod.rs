//! Audio capture and encoding adapters

mod chunk_recorder;
pub mod flac;
mod graph_mixer;

pub use chunk_recorder::ChunkRecorder;
pub use graph_mixer::{GraphMixer, LOCAL_SOURCE};
