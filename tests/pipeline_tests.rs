//! End-to-end pipeline tests against mocked provider APIs

use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use clinic_scribe::application::ports::TranscribeOptions;
use clinic_scribe::application::ProcessRecordingUseCase;
use clinic_scribe::domain::{
    AudioData, AudioMimeType, RunStatus, SessionContext, SessionRecording,
};
use clinic_scribe::infrastructure::{ChatApiGenerator, InMemoryRunStore, WhisperApiTranscriber};

const RAW_TRANSCRIPT: &str =
    "Patient Ngozi mentioned feeling anxious. Reach her at 08012345678 or ngozi@example.com.";

fn note_body() -> serde_json::Value {
    json!({
        "subjective": "Reports feeling anxious",
        "objective": "Engaged throughout the session",
        "assessment": "Anxiety symptoms persist",
        "plan": "Continue weekly sessions",
        "patientComplaint": "Anxiety",
        "personalHistory": "Not discussed",
        "familyHistory": "Not discussed",
        "presentation": "Calm but worried",
        "formulationAndDiagnosis": "Generalized anxiety",
        "treatmentPlan": "CBT",
        "assignments": "Breathing exercises"
    })
}

fn chat_response(content: &str) -> serde_json::Value {
    json!({
        "choices": [{"message": {"role": "assistant", "content": content}}]
    })
}

fn recording() -> SessionRecording {
    SessionRecording::new(
        "booking-7",
        AudioMimeType::Flac,
        120.0,
        2048,
        "recordings/booking-7.flac",
    )
}

fn audio() -> AudioData {
    AudioData::new(vec![0u8; 256], AudioMimeType::Flac)
}

fn use_case(
    server_uri: &str,
) -> ProcessRecordingUseCase<WhisperApiTranscriber, ChatApiGenerator, InMemoryRunStore> {
    let client = reqwest::Client::new();
    ProcessRecordingUseCase::new(
        WhisperApiTranscriber::new(client.clone(), server_uri, "test-key", "whisper-1"),
        ChatApiGenerator::new(client, server_uri, "test-key", "gpt-4o-mini"),
        InMemoryRunStore::new(),
    )
}

#[tokio::test]
async fn full_pipeline_produces_completed_run() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/audio/transcriptions"))
        .and(header("authorization", "Bearer test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"text": RAW_TRANSCRIPT})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(chat_response(&note_body().to_string())),
        )
        .expect(1)
        .mount(&server)
        .await;

    let output = use_case(&server.uri())
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
    assert_eq!(output.note.patient_complaint, "Anxiety");
    assert_eq!(output.transcript.raw_text, RAW_TRANSCRIPT);
    assert!(output.de_identified_text.contains("[PATIENT_NAME]"));
}

#[tokio::test]
async fn raw_identifiers_never_cross_the_generation_boundary() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/audio/transcriptions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"text": RAW_TRANSCRIPT})))
        .mount(&server)
        .await;

    // The chat request body must carry placeholders, not the raw values
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_string_contains("[PATIENT_NAME]"))
        .and(body_string_contains("[PHONE]"))
        .and(body_string_contains("[EMAIL]"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(chat_response(&note_body().to_string())),
        )
        .expect(1)
        .mount(&server)
        .await;

    let output = use_case(&server.uri())
        .execute(
            &recording(),
            &audio(),
            &TranscribeOptions::default(),
            &SessionContext::default(),
        )
        .await
        .unwrap();

    assert!(!output.de_identified_text.contains("Ngozi"));
    assert!(!output.de_identified_text.contains("08012345678"));
    assert!(!output.de_identified_text.contains("ngozi@example.com"));

    // Requests observed by the server carry no raw identifiers
    for request in server.received_requests().await.unwrap_or_default() {
        if request.url.path() == "/chat/completions" {
            let body = String::from_utf8_lossy(&request.body).to_string();
            assert!(!body.contains("Ngozi"));
            assert!(!body.contains("08012345678"));
            assert!(!body.contains("ngozi@example.com"));
        }
    }
}

#[tokio::test]
async fn transcription_failure_fails_the_run() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/audio/transcriptions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream error"))
        .mount(&server)
        .await;

    let rec = recording();
    let uc = use_case(&server.uri());
    let result = uc
        .execute(
            &rec,
            &audio(),
            &TranscribeOptions::default(),
            &SessionContext::default(),
        )
        .await;

    assert!(result.is_err());
}

#[tokio::test]
async fn malformed_generation_reply_fails_the_run() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/audio/transcriptions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"text": "Short session."})))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(chat_response("I'm sorry, I cannot produce a note.")),
        )
        .mount(&server)
        .await;

    let result = use_case(&server.uri())
        .execute(
            &recording(),
            &audio(),
            &TranscribeOptions::default(),
            &SessionContext::default(),
        )
        .await;

    assert!(result.is_err());
}

#[tokio::test]
async fn fenced_generation_reply_is_recovered() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/audio/transcriptions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"text": "Short session."})))
        .mount(&server)
        .await;

    let fenced = format!("```json\n{}\n```", note_body());
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_response(&fenced)))
        .mount(&server)
        .await;

    let output = use_case(&server.uri())
        .execute(
            &recording(),
            &audio(),
            &TranscribeOptions::default(),
            &SessionContext::default(),
        )
        .await
        .unwrap();

    assert_eq!(output.run.status, RunStatus::Completed);
}

#[tokio::test]
async fn empty_transcription_text_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/audio/transcriptions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"text": "   "})))
        .mount(&server)
        .await;

    let result = use_case(&server.uri())
        .execute(
            &recording(),
            &audio(),
            &TranscribeOptions::default(),
            &SessionContext::default(),
        )
        .await;

    assert!(result.is_err());
}
