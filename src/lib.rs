//! ClinicScribe - session audio capture and AI-assisted clinical note pipeline
//!
//! This crate records a mixed audio stream of all call participants, uploads
//! the finished recording, and drives the note pipeline: transcription,
//! PHI de-identification, and structured clinical note generation.
//!
//! # Architecture
//!
//! The crate follows hexagonal (ports & adapters) architecture:
//!
//! - **Domain**: Core business logic, value objects, entities, and errors
//! - **Application**: Use cases and port interfaces (traits)
//! - **Infrastructure**: Adapter implementations (cpal, FLAC, HTTP providers)
//! - **CLI**: Command-line interface, argument parsing, and output formatting

pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
