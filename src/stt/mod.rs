//! Speech-to-text: data model, the `Transcriber` seam, and the Whisper backend.

pub mod transcriber;
pub mod whisper;

pub use transcriber::{MockTranscriber, Segment, TranscriptionResult, Transcriber, Word};
pub use whisper::{WhisperConfig, WhisperTranscriber};
