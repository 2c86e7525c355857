//! scribed - HTTP speech-to-text transcription service
//!
//! Whisper transcription with word-level alignment and speaker diarization,
//! served over a small HTTP API.

// Enforce error handling discipline
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod align;
pub mod audio;
pub mod cli;
pub mod config;
pub mod defaults;
pub mod diarize;
pub mod error;
pub mod format;
pub mod merge;
pub mod models;
pub mod pipeline;
pub mod server;
pub mod stt;

// Core traits (decode → transcribe → label → format)
pub use align::Aligner;
pub use diarize::Diarizer;
pub use stt::Transcriber;

// Pipeline
pub use pipeline::{PipelineOptions, TranscriptOutput, TranscriptionPipeline};

// Error handling
pub use error::{Result, ScribedError};

// Config
pub use config::Config;

/// Build version string with optional git commit hash.
///
/// Returns `"0.1.0+abc1234"` when git hash is available, `"0.1.0"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}
