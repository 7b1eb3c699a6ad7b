//! Main app runners for the CLI commands

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;

use tokio::fs;
use tokio::sync::mpsc;
use tracing::info;

use crate::application::ports::{
    AudioMixer, ConfigStore, ProgressCallback, RecordingSession, TranscribeOptions,
    UploadTransport,
};
use crate::application::{CaptureBinder, ProcessRecordingUseCase};
use crate::domain::config::AppConfig;
use crate::domain::{
    de_identify, re_identify, AudioData, AudioMimeType, CallEvent, Duration, SessionContext,
    SessionRecording,
};
use crate::infrastructure::{
    ChatApiGenerator, ChunkRecorder, GraphMixer, HttpUploadTransport, InMemoryRunStore,
    WhisperApiTranscriber, XdgConfigStore,
};

use super::presenter::Presenter;

/// Exit codes
pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_ERROR: u8 = 1;
pub const EXIT_USAGE_ERROR: u8 = 2;

/// Parsed record command options
#[derive(Debug, Clone)]
pub struct RecordOptions {
    pub booking_id: String,
    pub max_duration: Option<String>,
    pub no_upload: bool,
    pub auto_process: bool,
    pub output: Option<PathBuf>,
}

/// Parsed process command options
#[derive(Debug, Clone)]
pub struct ProcessOptions {
    pub file: PathBuf,
    pub booking_id: Option<String>,
    pub language: Option<String>,
    pub session_type: Option<String>,
    pub reidentify: bool,
}

/// Record a session call, then upload the captured audio
pub async fn run_record(options: RecordOptions) -> ExitCode {
    let mut presenter = Presenter::new();

    let cli_config = AppConfig {
        max_duration: options.max_duration.clone(),
        auto_process: options.auto_process.then_some(true),
        ..Default::default()
    };
    let config = load_merged_config(cli_config).await;

    let max_duration = match config
        .max_duration
        .as_deref()
        .map(str::parse::<Duration>)
        .transpose()
    {
        Ok(parsed) => parsed.unwrap_or_else(Duration::default_max_duration),
        Err(e) => {
            presenter.error(&e.to_string());
            return ExitCode::from(EXIT_USAGE_ERROR);
        }
    };

    // Wire mixer and recorder
    let mixer = Arc::new(GraphMixer::new());
    if let Err(e) = mixer.attach_local_input() {
        presenter.error(&format!("Audio input unavailable: {}", e));
        return ExitCode::from(EXIT_ERROR);
    }

    let recorder = Arc::new(ChunkRecorder::new());
    let binder = CaptureBinder::new(
        Arc::clone(&mixer) as Arc<dyn AudioMixer>,
        Arc::clone(&recorder) as Arc<dyn RecordingSession>,
    );

    let (tx, rx) = mpsc::channel(16);
    if tx.send(CallEvent::Joined).await.is_err() {
        presenter.error("Call session channel closed unexpectedly");
        return ExitCode::from(EXIT_ERROR);
    }

    let run_handle = tokio::spawn(binder.run(rx));

    presenter.start_spinner("Recording... press Ctrl-C to finish");
    let started = Instant::now();
    let max_ms = max_duration.as_millis();

    loop {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                if signal.is_err() {
                    presenter.warn("Signal handler unavailable, stopping");
                }
                break;
            }
            _ = tokio::time::sleep(std::time::Duration::from_secs(1)) => {
                let elapsed = started.elapsed().as_millis() as u64;
                if elapsed >= max_ms {
                    presenter.warn("Max duration reached, stopping");
                    break;
                }
                presenter.update_recording_progress(elapsed, max_ms);
            }
        }
    }

    let _ = tx.send(CallEvent::Left).await;
    drop(tx);

    let outcome = match run_handle.await {
        Ok(Ok(outcome)) => outcome,
        Ok(Err(e)) => {
            presenter.spinner_fail("Recording failed");
            presenter.error(&e.to_string());
            return ExitCode::from(EXIT_ERROR);
        }
        Err(e) => {
            presenter.spinner_fail("Recording failed");
            presenter.error(&format!("Capture task failed: {}", e));
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let finished = match outcome.finished {
        Some(finished) => finished,
        None => {
            presenter.stop_spinner();
            presenter.warn("Call ended without captured audio");
            return ExitCode::from(EXIT_SUCCESS);
        }
    };

    presenter.spinner_success(&format!(
        "Recording complete ({}, {:.0}s)",
        finished.audio.human_readable_size(),
        finished.duration_seconds
    ));

    let recording = SessionRecording::new(
        options.booking_id.clone(),
        finished.audio.mime_type(),
        finished.duration_seconds,
        finished.audio.size_bytes() as u64,
        format!("recordings/{}.flac", options.booking_id),
    );

    if let Some(ref path) = options.output {
        if let Err(e) = fs::write(path, finished.audio.data()).await {
            presenter.error(&format!("Failed to write {}: {}", path.display(), e));
            return ExitCode::from(EXIT_ERROR);
        }
        presenter.info(&format!("Saved recording to {}", path.display()));
    }

    if options.no_upload {
        return ExitCode::from(EXIT_SUCCESS);
    }

    let upload_url = match config.upload_url {
        Some(ref url) => url.clone(),
        None => {
            presenter.error(
                "Missing upload URL. Run 'clinic-scribe config set upload_url <url>' \
                 or use --no-upload",
            );
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let transport = HttpUploadTransport::new(reqwest::Client::new(), upload_url);
    let recording_ref = recording.id.to_string();
    let auto_process = config.auto_process_or_default();

    let bar = presenter.upload_bar();
    let bar_handle = bar.clone();
    let on_progress: ProgressCallback = Arc::new(move |fraction| {
        bar_handle.set_position((fraction * 100.0).round() as u64);
    });

    match transport
        .upload(&finished.audio, &recording_ref, auto_process, Some(on_progress))
        .await
    {
        Ok(receipt) => {
            bar.finish_and_clear();
            presenter.success(&format!("Uploaded recording {}", receipt.recording_ref));
            if auto_process {
                match transport.trigger_processing(&receipt.recording_ref).await {
                    Ok(()) => presenter.info("Server-side note processing started"),
                    Err(e) => presenter.warn(&format!("Processing not started: {}", e)),
                }
            }
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            bar.finish_and_clear();
            presenter.error(&e.to_string());
            // Last-resort path; delivery is not confirmed
            transport.send_on_teardown(finished.audio.clone(), recording_ref);
            presenter.warn("Scheduled a best-effort background upload (unconfirmed)");
            tokio::time::sleep(std::time::Duration::from_millis(500)).await;
            ExitCode::from(EXIT_ERROR)
        }
    }
}

/// Run the note pipeline over a recorded audio file
pub async fn run_process(options: ProcessOptions) -> ExitCode {
    let mut presenter = Presenter::new();

    let api_key = match get_api_key().await {
        Ok(key) => key,
        Err(e) => {
            presenter.error(&e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let cli_config = AppConfig {
        language: options.language.clone(),
        ..Default::default()
    };
    let config = load_merged_config(cli_config).await;

    let data = match fs::read(&options.file).await {
        Ok(data) => data,
        Err(e) => {
            presenter.error(&format!("Failed to read {}: {}", options.file.display(), e));
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let mime_type = options
        .file
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(AudioMimeType::from_extension)
        .unwrap_or_default();
    let audio = AudioData::new(data, mime_type);

    let booking_id = options
        .booking_id
        .clone()
        .unwrap_or_else(|| "ad-hoc".to_string());
    // Duration is unknown for a pre-recorded file; the provider measures it
    let recording = SessionRecording::new(
        booking_id,
        mime_type,
        0.0,
        audio.size_bytes() as u64,
        options.file.to_string_lossy().to_string(),
    );

    let client = reqwest::Client::new();
    let provider_url = config.provider_url_or_default().to_string();
    let use_case = ProcessRecordingUseCase::new(
        WhisperApiTranscriber::new(
            client.clone(),
            provider_url.clone(),
            api_key.clone(),
            config.transcribe_model_or_default(),
        ),
        ChatApiGenerator::new(client, provider_url, api_key, config.note_model_or_default()),
        InMemoryRunStore::new(),
    );

    let transcribe_options = TranscribeOptions {
        language_hint: config.language.clone(),
        context_prompt: None,
    };
    let context = SessionContext {
        session_type: options.session_type.clone(),
        presenting_concerns: None,
    };

    presenter.start_spinner("Transcribing and generating note...");

    let output = match use_case
        .execute(&recording, &audio, &transcribe_options, &context)
        .await
    {
        Ok(output) => output,
        Err(e) => {
            presenter.spinner_fail("Processing failed");
            presenter.error(&e.to_string());
            return ExitCode::from(EXIT_ERROR);
        }
    };

    presenter.spinner_success(&format!(
        "Note generated ({} identifier(s) redacted)",
        output.phi_map.len()
    ));
    info!(recording_id = %output.run.recording_id, status = %output.run.status.as_str(), "Pipeline finished");

    let note_json = match serde_json::to_string_pretty(&output.note) {
        Ok(json) => json,
        Err(e) => {
            presenter.error(&format!("Failed to render note: {}", e));
            return ExitCode::from(EXIT_ERROR);
        }
    };

    if options.reidentify {
        presenter.warn("Restoring identifiers locally; handle the output as PHI");
        presenter.output(&re_identify(&note_json, &output.phi_map));
    } else {
        presenter.output(&note_json);
    }

    ExitCode::from(EXIT_SUCCESS)
}

/// De-identify transcript text from a file or stdin
pub async fn run_redact(file: Option<PathBuf>, show_map: bool) -> ExitCode {
    let presenter = Presenter::new();

    let text = match file {
        Some(ref path) => match fs::read_to_string(path).await {
            Ok(text) => text,
            Err(e) => {
                presenter.error(&format!("Failed to read {}: {}", path.display(), e));
                return ExitCode::from(EXIT_ERROR);
            }
        },
        None => {
            let mut buffer = String::new();
            if let Err(e) = std::io::Read::read_to_string(&mut std::io::stdin(), &mut buffer) {
                presenter.error(&format!("Failed to read stdin: {}", e));
                return ExitCode::from(EXIT_ERROR);
            }
            buffer
        }
    };

    let (redacted, map) = de_identify(&text);
    presenter.output(&redacted);

    if show_map {
        if map.is_empty() {
            presenter.info("No identifiers found");
        } else {
            // Categories only; original values stay out of logs and terminals
            for (category, _) in map.iter() {
                presenter.info(&format!("substituted {}", category.placeholder()));
            }
        }
    }

    ExitCode::from(EXIT_SUCCESS)
}

/// Get API key from environment or config file
pub async fn get_api_key() -> Result<String, String> {
    // Check environment first
    if let Ok(key) = env::var("CLINIC_SCRIBE_API_KEY") {
        if !key.is_empty() {
            return Ok(key);
        }
    }

    // Check config file
    let store = XdgConfigStore::new();
    let config = store.load().await.unwrap_or_else(|_| AppConfig::empty());

    config.api_key.ok_or_else(|| {
        "Missing API key. Set CLINIC_SCRIBE_API_KEY environment variable or run \
         'clinic-scribe config set api_key <key>'"
            .to_string()
    })
}

/// Load and merge configuration from file, env, and CLI
pub async fn load_merged_config(cli_config: AppConfig) -> AppConfig {
    let store = XdgConfigStore::new();
    let file_config = store.load().await.unwrap_or_else(|_| AppConfig::empty());

    // Build env config
    let env_config = AppConfig {
        api_key: env::var("CLINIC_SCRIBE_API_KEY").ok().filter(|s| !s.is_empty()),
        upload_url: env::var("CLINIC_SCRIBE_UPLOAD_URL").ok().filter(|s| !s.is_empty()),
        ..Default::default()
    };

    // Merge: defaults < file < env < cli
    AppConfig::defaults()
        .merge(file_config)
        .merge(env_config)
        .merge(cli_config)
}
