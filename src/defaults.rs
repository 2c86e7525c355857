//! Default configuration constants for scribed.
//!
//! Shared constants used across configuration types and the HTTP surface,
//! kept in one place so the server, pipeline, and CLI agree.

/// Audio sample rate in Hz fed to the transcription model.
///
/// 16kHz mono is what Whisper expects; every upload is decoded and
/// resampled to this rate before inference.
pub const SAMPLE_RATE: u32 = 16000;

/// Default Whisper model name.
///
/// "base" (multilingual) supports auto-detection of any language.
/// Use "base.en" explicitly for English-only optimized transcription.
pub const DEFAULT_MODEL: &str = "base";

/// Language value that triggers automatic language detection.
pub const AUTO_LANGUAGE: &str = "auto";

/// Fallback language code reported when detection yields nothing.
pub const FALLBACK_LANGUAGE: &str = "en";

/// Speaker label used for segments left unlabeled in a diarized transcript.
pub const UNKNOWN_SPEAKER: &str = "UNKNOWN";

/// Default bind address for the HTTP server.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default port for the HTTP server.
pub const DEFAULT_PORT: u16 = 48001;

/// Default diarization backend: a sidecar on the adjacent port.
///
/// Used whenever the credential is present but no endpoint is configured,
/// so setting `HF_TOKEN` alone is enough to turn diarization on.
pub const DEFAULT_DIARIZATION_ENDPOINT: &str = "http://127.0.0.1:48002";

/// Maximum accepted upload size in megabytes.
pub const MAX_UPLOAD_MB: usize = 256;

/// Content types accepted by `POST /transcribe`.
///
/// Fixed allow-list of audio/video containers; anything else is rejected
/// with HTTP 400 before the upload is spooled or a model is touched.
pub const ALLOWED_CONTENT_TYPES: &[&str] = &[
    "audio/mpeg",
    "audio/mp3",
    "audio/wav",
    "audio/x-wav",
    "audio/mp4",
    "audio/m4a",
    "audio/x-m4a",
    "video/mp4",
    "video/webm",
    "audio/webm",
    "audio/ogg",
    "video/ogg",
];

/// Check a MIME type against the upload allow-list.
pub fn is_allowed_content_type(content_type: &str) -> bool {
    ALLOWED_CONTENT_TYPES.contains(&content_type)
}

/// Report the GPU backend compiled into this build.
///
/// Returns a human-readable name based on the compile-time feature flags.
/// Only one GPU backend can be active at a time; if none is enabled, returns "CPU".
pub fn gpu_backend() -> &'static str {
    if cfg!(feature = "cuda") {
        "CUDA"
    } else if cfg!(feature = "vulkan") {
        "Vulkan"
    } else if cfg!(feature = "hipblas") {
        "HipBLAS (AMD)"
    } else if cfg!(feature = "openblas") {
        "OpenBLAS"
    } else {
        "CPU"
    }
}

/// Device identifier reported by `/health`.
pub fn device() -> &'static str {
    if cfg!(any(feature = "cuda", feature = "vulkan", feature = "hipblas")) {
        "gpu"
    } else {
        "cpu"
    }
}

/// Compute type reported by `/health`, following whisper.cpp conventions:
/// GPU builds run fp16 kernels, CPU builds run the quantized int8 path.
pub fn compute_type() -> &'static str {
    if cfg!(any(feature = "cuda", feature = "vulkan", feature = "hipblas")) {
        "float16"
    } else {
        "int8"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gpu_backend_matches_compiled_feature() {
        let expected = if cfg!(feature = "cuda") {
            "CUDA"
        } else if cfg!(feature = "vulkan") {
            "Vulkan"
        } else if cfg!(feature = "hipblas") {
            "HipBLAS (AMD)"
        } else if cfg!(feature = "openblas") {
            "OpenBLAS"
        } else {
            "CPU"
        };
        assert_eq!(gpu_backend(), expected);
    }

    #[test]
    fn device_and_compute_type_agree() {
        match device() {
            "gpu" => assert_eq!(compute_type(), "float16"),
            "cpu" => assert_eq!(compute_type(), "int8"),
            other => panic!("unexpected device: {}", other),
        }
    }

    #[test]
    fn diarization_endpoint_default_is_local_sidecar() {
        assert!(DEFAULT_DIARIZATION_ENDPOINT.starts_with("http://127.0.0.1"));
    }

    #[test]
    fn wav_and_mp3_are_allowed() {
        assert!(is_allowed_content_type("audio/wav"));
        assert!(is_allowed_content_type("audio/mpeg"));
        assert!(is_allowed_content_type("video/mp4"));
    }

    #[test]
    fn text_and_unknown_types_are_rejected() {
        assert!(!is_allowed_content_type("text/plain"));
        assert!(!is_allowed_content_type("application/octet-stream"));
        assert!(!is_allowed_content_type(""));
    }

    #[test]
    fn allow_list_has_no_duplicates() {
        let mut types: Vec<_> = ALLOWED_CONTENT_TYPES.to_vec();
        types.sort_unstable();
        types.dedup();
        assert_eq!(types.len(), ALLOWED_CONTENT_TYPES.len());
    }
}
