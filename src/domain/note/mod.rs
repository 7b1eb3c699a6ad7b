//! Clinical note domain module

mod clinical_note;
mod processing_run;
mod system_prompt;
mod transcript;

pub use clinical_note::{ClinicalNote, SessionContext};
pub use processing_run::{ProcessingRun, RunStatus, StatusTransitionError};
pub use system_prompt::NotePrompt;
pub use transcript::Transcript;
