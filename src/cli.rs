//! Command-line interface for scribed
//!
//! Provides argument parsing using clap derive macros.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Speech-to-text transcription service with speaker diarization
#[derive(Parser, Debug)]
#[command(
    name = "scribed",
    version,
    about = "Speech-to-text transcription service with speaker diarization"
)]
pub struct Cli {
    /// Subcommand to execute; default is to run the server
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Bind address override
    #[arg(long, value_name = "HOST")]
    pub host: Option<String>,

    /// Port override
    #[arg(long, short, value_name = "PORT")]
    pub port: Option<u16>,

    /// Whisper model (default: base, multilingual). Use base.en for English-only
    #[arg(long, value_name = "MODEL")]
    pub model: Option<String>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP server (the default when no command is given)
    Serve,

    /// Manage Whisper models
    Models {
        #[command(subcommand)]
        action: ModelsAction,
    },
}

/// Model management actions
#[derive(Subcommand, Debug)]
pub enum ModelsAction {
    /// List catalog models and their installation status
    List,

    /// Download a model into the local cache
    Install {
        /// Model name (e.g. tiny, base, small.en, large-v3)
        name: String,
    },
}
