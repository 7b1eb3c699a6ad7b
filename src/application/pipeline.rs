//! Recording processing pipeline use case
//!
//! Orchestrates the stages that turn a finished recording into a
//! clinical note: transcription, de-identification, note generation.
//! The processing run record advances monotonically through the stages
//! and is marked failed on the first stage error.

use tracing::{error, info};

use crate::application::ports::{
    GenerationError, NoteGenerator, RunStore, RunStoreError, TranscribeOptions, Transcriber,
    TranscriptionError,
};
use crate::domain::{
    de_identify, AudioData, ClinicalNote, PhiMap, ProcessingRun, RunStatus, SessionContext,
    SessionRecording, Transcript,
};

/// Pipeline errors, one variant per failing stage
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Transcription failed: {0}")]
    Transcription(#[from] TranscriptionError),

    #[error("Note generation failed: {0}")]
    Generation(#[from] GenerationError),

    #[error("Run tracking failed: {0}")]
    RunStore(#[from] RunStoreError),
}

/// Everything the pipeline produced for one recording.
///
/// The raw transcript and the PHI map never leave the process; callers
/// decide what to surface. The note text contains placeholder tokens
/// until re-identified against the map.
pub struct PipelineOutput {
    pub transcript: Transcript,
    pub de_identified_text: String,
    pub phi_map: PhiMap,
    pub note: ClinicalNote,
    pub run: ProcessingRun,
}

/// Use case for processing a recorded session into a clinical note
pub struct ProcessRecordingUseCase<T, G, S>
where
    T: Transcriber,
    G: NoteGenerator,
    S: RunStore,
{
    transcriber: T,
    generator: G,
    runs: S,
}

impl<T, G, S> ProcessRecordingUseCase<T, G, S>
where
    T: Transcriber,
    G: NoteGenerator,
    S: RunStore,
{
    pub fn new(transcriber: T, generator: G, runs: S) -> Self {
        Self {
            transcriber,
            generator,
            runs,
        }
    }

    /// Run the full pipeline for one recording.
    ///
    /// Only placeholder-substituted text ever reaches the note
    /// generator. Log fields carry identifiers and sizes, never
    /// transcript content or map values.
    pub async fn execute(
        &self,
        recording: &SessionRecording,
        audio: &AudioData,
        options: &TranscribeOptions,
        context: &SessionContext,
    ) -> Result<PipelineOutput, PipelineError> {
        let id = recording.id;
        self.runs.create(id).await?;
        info!(recording_id = %id, bytes = audio.size_bytes(), "Processing started");

        self.runs.advance(id, RunStatus::Transcribing).await?;
        let transcript = match self.transcriber.transcribe(audio, id, options).await {
            Ok(t) => t,
            Err(e) => return Err(self.mark_failed(id, e.into()).await),
        };
        info!(
            recording_id = %id,
            chars = transcript.raw_text.len(),
            "Transcription complete"
        );

        self.runs.advance(id, RunStatus::Redacting).await?;
        let (de_identified_text, phi_map) = de_identify(&transcript.raw_text);
        info!(
            recording_id = %id,
            replacements = phi_map.len(),
            "De-identification complete"
        );

        self.runs.advance(id, RunStatus::Generating).await?;
        let note = match self.generator.generate(&de_identified_text, context).await {
            Ok(n) => n,
            Err(e) => return Err(self.mark_failed(id, e.into()).await),
        };

        let run = self.runs.advance(id, RunStatus::Completed).await?;
        info!(recording_id = %id, "Processing completed");

        Ok(PipelineOutput {
            transcript,
            de_identified_text,
            phi_map,
            note,
            run,
        })
    }

    /// Record the failure on the run before surfacing the stage error.
    async fn mark_failed(&self, id: uuid::Uuid, cause: PipelineError) -> PipelineError {
        error!(recording_id = %id, error = %cause, "Processing failed");
        if let Err(store_err) = self.runs.fail(id, cause.to_string()).await {
            error!(recording_id = %id, error = %store_err, "Failed to record run failure");
        }
        cause
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::RunStoreError;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use uuid::Uuid;

    struct StubTranscriber {
        result: Result<String, TranscriptionError>,
    }

    #[async_trait]
    impl Transcriber for StubTranscriber {
        async fn transcribe(
            &self,
            _audio: &AudioData,
            recording_id: Uuid,
            _options: &TranscribeOptions,
        ) -> Result<Transcript, TranscriptionError> {
            match &self.result {
                Ok(text) => Ok(Transcript::new(recording_id, text.clone(), None)),
                Err(e) => Err(e.clone()),
            }
        }
    }

    struct StubGenerator {
        result: Result<ClinicalNote, GenerationError>,
        seen_input: Mutex<Option<String>>,
    }

    #[async_trait]
    impl NoteGenerator for StubGenerator {
        async fn generate(
            &self,
            de_identified_text: &str,
            _context: &SessionContext,
        ) -> Result<ClinicalNote, GenerationError> {
            *self.seen_input.lock().unwrap() = Some(de_identified_text.to_string());
            match &self.result {
                Ok(note) => Ok(note.clone()),
                Err(e) => Err(e.clone()),
            }
        }
    }

    #[derive(Default)]
    struct StubRunStore {
        runs: Mutex<HashMap<Uuid, ProcessingRun>>,
    }

    #[async_trait]
    impl RunStore for StubRunStore {
        async fn create(&self, recording_id: Uuid) -> Result<ProcessingRun, RunStoreError> {
            let run = ProcessingRun::new(recording_id);
            self.runs.lock().unwrap().insert(recording_id, run.clone());
            Ok(run)
        }

        async fn advance(
            &self,
            recording_id: Uuid,
            status: RunStatus,
        ) -> Result<ProcessingRun, RunStoreError> {
            let mut runs = self.runs.lock().unwrap();
            let run = runs
                .get_mut(&recording_id)
                .ok_or(RunStoreError::NotFound(recording_id))?;
            run.advance(status)?;
            Ok(run.clone())
        }

        async fn fail(
            &self,
            recording_id: Uuid,
            message: String,
        ) -> Result<ProcessingRun, RunStoreError> {
            let mut runs = self.runs.lock().unwrap();
            let run = runs
                .get_mut(&recording_id)
                .ok_or(RunStoreError::NotFound(recording_id))?;
            run.fail(message)?;
            Ok(run.clone())
        }

        async fn get(&self, recording_id: Uuid) -> Result<Option<ProcessingRun>, RunStoreError> {
            Ok(self.runs.lock().unwrap().get(&recording_id).cloned())
        }
    }

    fn sample_note() -> ClinicalNote {
        serde_json::from_value(serde_json::json!({
            "subjective": "Reports ongoing anxiety",
            "objective": "Alert and oriented",
            "assessment": "Symptoms consistent with generalized anxiety",
            "plan": "Weekly CBT sessions",
            "patientComplaint": "Difficulty sleeping and persistent worry",
            "personalHistory": "No prior treatment",
            "familyHistory": "Not discussed",
            "presentation": "Engaged and receptive",
            "formulationAndDiagnosis": "Generalized anxiety disorder",
            "treatmentPlan": "CBT with relaxation training",
            "assignments": "Daily thought record"
        }))
        .unwrap()
    }

    fn recording() -> SessionRecording {
        SessionRecording::new(
            "booking-1",
            crate::domain::AudioMimeType::Flac,
            60.0,
            1024,
            "recordings/booking-1.flac",
        )
    }

    fn audio() -> AudioData {
        AudioData::from_bytes(&[0u8; 16], Default::default())
    }

    #[tokio::test]
    async fn happy_path_completes_run() {
        let use_case = ProcessRecordingUseCase::new(
            StubTranscriber {
                result: Ok("Patient discussed work stress with Dr. Adaeze.".to_string()),
            },
            StubGenerator {
                result: Ok(sample_note()),
                seen_input: Mutex::new(None),
            },
            StubRunStore::default(),
        );

        let output = use_case
            .execute(
                &recording(),
                &audio(),
                &TranscribeOptions::default(),
                &SessionContext::default(),
            )
            .await
            .unwrap();

        assert_eq!(output.run.status, RunStatus::Completed);
        assert!(output.run.completed_at.is_some());
        assert_eq!(
            output.note.patient_complaint,
            "Difficulty sleeping and persistent worry"
        );
    }

    #[tokio::test]
    async fn generator_never_sees_raw_phi() {
        let generator = StubGenerator {
            result: Ok(sample_note()),
            seen_input: Mutex::new(None),
        };
        let raw = "Call Ngozi on 08012345678 or ngozi@example.com.";
        let use_case = ProcessRecordingUseCase::new(
            StubTranscriber {
                result: Ok(raw.to_string()),
            },
            generator,
            StubRunStore::default(),
        );

        let output = use_case
            .execute(
                &recording(),
                &audio(),
                &TranscribeOptions::default(),
                &SessionContext::default(),
            )
            .await
            .unwrap();

        let seen = output.de_identified_text;
        assert!(!seen.contains("Ngozi"));
        assert!(!seen.contains("08012345678"));
        assert!(!seen.contains("ngozi@example.com"));
        assert!(seen.contains("[PATIENT_NAME]"));
        assert!(seen.contains("[PHONE]"));
        assert!(seen.contains("[EMAIL]"));
    }

    #[tokio::test]
    async fn transcription_failure_marks_run_failed() {
        let store = StubRunStore::default();
        let rec = recording();
        let id = rec.id;
        let use_case = ProcessRecordingUseCase::new(
            StubTranscriber {
                result: Err(TranscriptionError::EmptyTranscript),
            },
            StubGenerator {
                result: Ok(sample_note()),
                seen_input: Mutex::new(None),
            },
            store,
        );

        let result = use_case
            .execute(
                &rec,
                &audio(),
                &TranscribeOptions::default(),
                &SessionContext::default(),
            )
            .await;

        assert!(matches!(result, Err(PipelineError::Transcription(_))));
        let run = use_case.runs.get(id).await.unwrap().unwrap();
        assert_eq!(run.status, RunStatus::Failed);
        assert!(run.error.is_some());
    }

    #[tokio::test]
    async fn generation_failure_marks_run_failed() {
        let rec = recording();
        let id = rec.id;
        let use_case = ProcessRecordingUseCase::new(
            StubTranscriber {
                result: Ok("A short session transcript.".to_string()),
            },
            StubGenerator {
                result: Err(GenerationError::EmptyResponse),
                seen_input: Mutex::new(None),
            },
            StubRunStore::default(),
        );

        let result = use_case
            .execute(
                &rec,
                &audio(),
                &TranscribeOptions::default(),
                &SessionContext::default(),
            )
            .await;

        assert!(matches!(result, Err(PipelineError::Generation(_))));
        let run = use_case.runs.get(id).await.unwrap().unwrap();
        assert_eq!(run.status, RunStatus::Failed);
    }

    #[tokio::test]
    async fn failed_run_records_stage_message() {
        let rec = recording();
        let id = rec.id;
        let use_case = ProcessRecordingUseCase::new(
            StubTranscriber {
                result: Err(TranscriptionError::RateLimited),
            },
            StubGenerator {
                result: Ok(sample_note()),
                seen_input: Mutex::new(None),
            },
            StubRunStore::default(),
        );

        let _ = use_case
            .execute(
                &rec,
                &audio(),
                &TranscribeOptions::default(),
                &SessionContext::default(),
            )
            .await;

        let run = use_case.runs.get(id).await.unwrap().unwrap();
        let message = run.error.unwrap();
        assert!(message.contains("Transcription failed"));
    }
}
