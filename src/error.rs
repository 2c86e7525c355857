//! Error types for scribed.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScribedError {
    // Audio decode errors
    #[error("Audio decode failed: {message}")]
    AudioDecode { message: String },

    // Model management errors
    #[error("Transcription model not found at {path}")]
    ModelNotFound { path: String },

    #[error("Unknown model: {name}")]
    UnknownModel { name: String },

    #[error("Model download failed: {message}")]
    ModelDownload { message: String },

    // Transcription errors
    #[error("Transcription inference failed: {message}")]
    TranscriptionInferenceFailed { message: String },

    #[error("Transcription error: {message}")]
    Transcription { message: String },

    // Alignment errors (degrade gracefully in the pipeline)
    #[error("Alignment failed: {message}")]
    Alignment { message: String },

    // Diarization errors (degrade gracefully in the pipeline)
    #[error("Diarization failed: {message}")]
    Diarization { message: String },

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Generic error for cases not covered above
    #[error("{0}")]
    Other(String),
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, ScribedError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn audio_decode_display() {
        let error = ScribedError::AudioDecode {
            message: "not a RIFF file".to_string(),
        };
        assert_eq!(error.to_string(), "Audio decode failed: not a RIFF file");
    }

    #[test]
    fn model_not_found_display() {
        let error = ScribedError::ModelNotFound {
            path: "/models/ggml-base.bin".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Transcription model not found at /models/ggml-base.bin"
        );
    }

    #[test]
    fn unknown_model_display() {
        let error = ScribedError::UnknownModel {
            name: "gigantic".to_string(),
        };
        assert_eq!(error.to_string(), "Unknown model: gigantic");
    }

    #[test]
    fn transcription_inference_failed_display() {
        let error = ScribedError::TranscriptionInferenceFailed {
            message: "out of memory".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Transcription inference failed: out of memory"
        );
    }

    #[test]
    fn alignment_display() {
        let error = ScribedError::Alignment {
            message: "no tokens".to_string(),
        };
        assert_eq!(error.to_string(), "Alignment failed: no tokens");
    }

    #[test]
    fn diarization_display() {
        let error = ScribedError::Diarization {
            message: "backend returned 503".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Diarization failed: backend returned 503"
        );
    }

    #[test]
    fn from_io_error() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let error: ScribedError = io_error.into();
        assert!(error.to_string().contains("file not found"));
    }

    #[test]
    fn error_source_chain_io() {
        let io_error = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let error: ScribedError = io_error.into();
        let error_trait: &dyn std::error::Error = &error;
        assert!(error_trait.source().is_some());
    }

    #[test]
    fn error_is_send_and_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<ScribedError>();
        assert_sync::<ScribedError>();
    }

    #[test]
    fn result_type_alias() {
        fn returns_result() -> Result<i32> {
            Ok(42)
        }
        assert_eq!(returns_result().unwrap(), 42);
    }
}
