//! CLI argument definitions using Clap

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// ClinicScribe - session audio capture and clinical note pipeline
#[derive(Parser, Debug)]
#[command(name = "clinic-scribe")]
#[command(version)]
#[command(about = "Capture therapy session audio and turn it into structured clinical notes")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Record a session call and upload the captured audio
    Record {
        /// Booking the recording belongs to
        #[arg(short, long, value_name = "ID")]
        booking_id: String,

        /// Max recording duration (e.g., 30m, 1m30s)
        #[arg(long, value_name = "TIME")]
        max_duration: Option<String>,

        /// Skip the upload and keep the recording local
        #[arg(long)]
        no_upload: bool,

        /// Ask the server to start note processing after upload
        #[arg(long)]
        auto_process: bool,

        /// Also write the FLAC blob to this file
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Run the note pipeline over a recorded audio file
    Process {
        /// Audio file to process
        file: PathBuf,

        /// Booking the recording belongs to
        #[arg(short, long, value_name = "ID")]
        booking_id: Option<String>,

        /// ISO language hint for transcription
        #[arg(short, long, value_name = "LANG")]
        language: Option<String>,

        /// Session type passed as generation context
        #[arg(long, value_name = "TYPE")]
        session_type: Option<String>,

        /// Restore original identifiers in the printed note
        #[arg(long)]
        reidentify: bool,
    },

    /// De-identify transcript text from a file or stdin
    Redact {
        /// Text file to redact (stdin when omitted)
        file: Option<PathBuf>,

        /// List which identifier categories were substituted
        #[arg(long)]
        show_map: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config action subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Create config file with defaults
    Init,
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// Config value
        value: String,
    },
    /// Get a config value
    Get {
        /// Config key
        key: String,
    },
    /// List all config values
    List,
    /// Show config file path
    Path,
}

/// Valid config keys
pub const VALID_CONFIG_KEYS: &[&str] = &[
    "api_key",
    "upload_url",
    "provider_url",
    "transcribe_model",
    "note_model",
    "language",
    "max_duration",
    "auto_process",
];

/// Check if a config key is valid
pub fn is_valid_config_key(key: &str) -> bool {
    VALID_CONFIG_KEYS.contains(&key)
}
