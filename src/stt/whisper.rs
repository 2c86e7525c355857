//! Whisper-based speech-to-text backend.
//!
//! Implements the `Transcriber` trait (segment-level transcription) and the
//! `Aligner` trait (a second decoding pass with token timestamps) on a single
//! whisper.cpp context via whisper-rs.
//!
//! # Feature Gate
//!
//! This module requires the `whisper` feature to be enabled and cmake to be
//! installed. Without the feature a stub is compiled that reports itself as
//! not ready and errors on use, so the HTTP surface still builds and tests.

use crate::align::Aligner;
use crate::defaults;
use crate::error::{Result, ScribedError};
use crate::stt::transcriber::{Segment, TranscriptionResult, Transcriber, Word};
use std::path::PathBuf;

#[cfg(feature = "whisper")]
use std::sync::{Mutex, Once};
#[cfg(feature = "whisper")]
use whisper_rs::{
    FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters, WhisperState,
    install_logging_hooks,
};

#[cfg(feature = "whisper")]
static LOGGING_HOOKS_INSTALLED: Once = Once::new();

/// Configuration for the Whisper backend.
#[derive(Debug, Clone)]
pub struct WhisperConfig {
    /// Path to the ggml model file
    pub model_path: PathBuf,
    /// Number of threads for inference (None = auto-detect)
    pub threads: Option<usize>,
}

impl Default for WhisperConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("models/ggml-base.bin"),
            threads: None,
        }
    }
}

/// Whisper-based transcriber and aligner.
///
/// The WhisperContext is wrapped in a Mutex: whisper.cpp states must not run
/// concurrently on one context, so requests serialize at this point.
#[cfg(feature = "whisper")]
pub struct WhisperTranscriber {
    context: Mutex<WhisperContext>,
    config: WhisperConfig,
    model_name: String,
}

#[cfg(feature = "whisper")]
impl std::fmt::Debug for WhisperTranscriber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WhisperTranscriber")
            .field("config", &self.config)
            .field("model_name", &self.model_name)
            .field("context", &"<WhisperContext>")
            .finish()
    }
}

/// Whisper-based transcriber placeholder (without whisper feature).
///
/// This is a stub implementation that returns errors when used.
/// Enable the `whisper` feature to use real transcription.
#[cfg(not(feature = "whisper"))]
#[derive(Debug)]
pub struct WhisperTranscriber {
    config: WhisperConfig,
    model_name: String,
}

fn model_name_from_path(path: &std::path::Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(|s| s.strip_prefix("ggml-").unwrap_or(s))
        .unwrap_or("unknown")
        .to_string()
}

#[cfg(feature = "whisper")]
impl WhisperTranscriber {
    /// Load the model at `config.model_path`.
    ///
    /// # Errors
    /// Returns `ScribedError::ModelNotFound` if the model file doesn't exist
    /// and `ScribedError::TranscriptionInferenceFailed` if loading fails.
    pub fn new(config: WhisperConfig) -> Result<Self> {
        // Install logging hooks to suppress whisper.cpp output (only once)
        LOGGING_HOOKS_INSTALLED.call_once(|| {
            install_logging_hooks();
        });

        if !config.model_path.exists() {
            return Err(ScribedError::ModelNotFound {
                path: config.model_path.to_string_lossy().to_string(),
            });
        }

        let model_name = model_name_from_path(&config.model_path);

        let mut context_params = WhisperContextParameters::default();
        // Fused attention kernels avoid the standalone softmax CUDA kernel,
        // which crashes on Blackwell GPUs (sm_120) with ggml <= 1.7.6
        context_params.flash_attn(true);
        let context = WhisperContext::new_with_params(
            config.model_path.to_str().ok_or_else(|| {
                ScribedError::TranscriptionInferenceFailed {
                    message: "Invalid UTF-8 in model path".to_string(),
                }
            })?,
            context_params,
        )
        .map_err(|e| ScribedError::TranscriptionInferenceFailed {
            message: format!("Failed to load Whisper model: {}", e),
        })?;

        Ok(Self {
            context: Mutex::new(context),
            config,
            model_name,
        })
    }

    /// Get the configuration
    pub fn config(&self) -> &WhisperConfig {
        &self.config
    }

    /// Convert i16 audio samples to f32 normalized to [-1.0, 1.0]
    ///
    /// Whisper expects audio in f32 format normalized to the range [-1.0, 1.0].
    /// Input is 16-bit PCM audio where samples range from -32768 to 32767.
    fn convert_audio(samples: &[i16]) -> Vec<f32> {
        samples
            .iter()
            .map(|&sample| sample as f32 / 32768.0)
            .collect()
    }

    /// Base decoding parameters shared by the transcription and alignment passes.
    fn base_params<'a>(&self, language: Option<&'a str>) -> FullParams<'a, 'a> {
        let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });

        match language {
            None | Some(defaults::AUTO_LANGUAGE) => params.set_language(None),
            Some(lang) => params.set_language(Some(lang)),
        }

        if let Some(threads) = self.config.threads {
            params.set_n_threads(threads as i32);
        }

        // Disable printing to stdout/stderr
        params.set_print_special(false);
        params.set_print_progress(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);

        params
    }

    /// Run one decoding pass and return the state for segment extraction.
    fn run_pass(&self, params: FullParams, audio_f32: &[f32]) -> Result<WhisperState> {
        let context = self
            .context
            .lock()
            .map_err(|e| ScribedError::TranscriptionInferenceFailed {
                message: format!("Failed to acquire context lock: {}", e),
            })?;

        let mut state =
            context
                .create_state()
                .map_err(|e| ScribedError::TranscriptionInferenceFailed {
                    message: format!("Failed to create Whisper state: {}", e),
                })?;

        state
            .full(params, audio_f32)
            .map_err(|e| ScribedError::TranscriptionInferenceFailed {
                message: format!("Whisper inference failed: {}", e),
            })?;

        Ok(state)
    }
}

#[cfg(not(feature = "whisper"))]
impl WhisperTranscriber {
    /// Create a new Whisper transcriber (stub implementation).
    ///
    /// Validates the model path so configuration errors surface the same way
    /// as in a full build; any transcription attempt returns an error.
    pub fn new(config: WhisperConfig) -> Result<Self> {
        if !config.model_path.exists() {
            return Err(ScribedError::ModelNotFound {
                path: config.model_path.to_string_lossy().to_string(),
            });
        }

        let model_name = model_name_from_path(&config.model_path);

        Ok(Self { config, model_name })
    }

    /// Get the configuration
    pub fn config(&self) -> &WhisperConfig {
        &self.config
    }

    /// Convert i16 audio samples to f32 normalized to [-1.0, 1.0]
    ///
    /// This function is available even without the whisper feature for testing.
    pub fn convert_audio(samples: &[i16]) -> Vec<f32> {
        samples
            .iter()
            .map(|&sample| sample as f32 / 32768.0)
            .collect()
    }
}

/// Convert a whisper centisecond timestamp to seconds.
#[allow(dead_code)]
fn centis_to_secs(t: i64) -> f64 {
    t as f64 / 100.0
}

#[cfg(feature = "whisper")]
impl Transcriber for WhisperTranscriber {
    fn transcribe(&self, audio: &[i16], language: Option<&str>) -> Result<TranscriptionResult> {
        let audio_f32 = Self::convert_audio(audio);
        let params = self.base_params(language);
        let state = self.run_pass(params, &audio_f32)?;

        // Extract detected language
        let lang_id = state.full_lang_id_from_state();
        let detected = whisper_rs::get_lang_str(lang_id)
            .unwrap_or(defaults::FALLBACK_LANGUAGE)
            .to_string();

        let mut segments = Vec::new();
        for segment in state.as_iter() {
            let text = segment.to_string().trim().to_string();
            if text.is_empty() {
                continue;
            }
            segments.push(Segment::new(
                centis_to_secs(segment.start_timestamp()),
                centis_to_secs(segment.end_timestamp()),
                text,
            ));
        }

        let language = match language {
            Some(lang) if lang != defaults::AUTO_LANGUAGE => lang.to_string(),
            _ => detected,
        };

        Ok(TranscriptionResult { segments, language })
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn is_ready(&self) -> bool {
        // The transcriber is ready if we successfully created it
        true
    }
}

#[cfg(feature = "whisper")]
impl Aligner for WhisperTranscriber {
    /// Word-alignment pass: decode again with token timestamps and one-word
    /// segments, then fold the words back into the coarse segments.
    fn align(&self, result: &TranscriptionResult, audio: &[i16]) -> Result<TranscriptionResult> {
        if result.segments.is_empty() {
            return Ok(result.clone());
        }

        let audio_f32 = Self::convert_audio(audio);
        let lang = if result.language == defaults::AUTO_LANGUAGE {
            None
        } else {
            Some(result.language.as_str())
        };
        let mut params = self.base_params(lang);
        params.set_token_timestamps(true);
        params.set_split_on_word(true);
        params.set_max_len(1);

        let state = self
            .run_pass(params, &audio_f32)
            .map_err(|e| ScribedError::Alignment {
                message: e.to_string(),
            })?;

        let mut words = Vec::new();
        for segment in state.as_iter() {
            let text = segment.to_string().trim().to_string();
            if text.is_empty() {
                continue;
            }
            words.push(Word {
                start: centis_to_secs(segment.start_timestamp()),
                end: centis_to_secs(segment.end_timestamp()),
                text,
                speaker: None,
            });
        }

        if words.is_empty() {
            return Err(ScribedError::Alignment {
                message: "alignment pass produced no words".to_string(),
            });
        }

        Ok(attach_words(result, words))
    }
}

/// Assign each word to the segment containing its midpoint, then tighten
/// segment boundaries to the words they received.
fn attach_words(result: &TranscriptionResult, words: Vec<Word>) -> TranscriptionResult {
    let mut aligned = result.clone();
    for segment in &mut aligned.segments {
        segment.words.clear();
    }

    for word in words {
        let mid = (word.start + word.end) / 2.0;
        let idx = aligned
            .segments
            .iter()
            .position(|s| mid >= s.start && mid < s.end)
            .unwrap_or_else(|| nearest_segment(&aligned.segments, mid));
        aligned.segments[idx].words.push(word);
    }

    for segment in &mut aligned.segments {
        if let (Some(first), Some(last)) = (segment.words.first(), segment.words.last()) {
            segment.start = first.start;
            segment.end = last.end;
        }
    }

    aligned
}

/// Index of the segment whose span is closest to time `t`.
///
/// Only called with non-empty segment lists (align returns early otherwise).
fn nearest_segment(segments: &[Segment], t: f64) -> usize {
    let mut best = 0;
    let mut best_dist = f64::MAX;
    for (i, s) in segments.iter().enumerate() {
        let dist = if t < s.start {
            s.start - t
        } else if t >= s.end {
            t - s.end
        } else {
            0.0
        };
        if dist < best_dist {
            best_dist = dist;
            best = i;
        }
    }
    best
}

#[cfg(not(feature = "whisper"))]
impl Transcriber for WhisperTranscriber {
    fn transcribe(&self, _audio: &[i16], _language: Option<&str>) -> Result<TranscriptionResult> {
        Err(ScribedError::TranscriptionInferenceFailed {
            message: concat!(
                "Whisper feature not enabled. This binary was built without speech recognition.\n",
                "To fix: cargo build --release (whisper is enabled by default)\n",
                "If build fails with cmake errors, install: sudo apt install cmake"
            )
            .to_string(),
        })
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn is_ready(&self) -> bool {
        false
    }
}

#[cfg(not(feature = "whisper"))]
impl Aligner for WhisperTranscriber {
    fn align(&self, _result: &TranscriptionResult, _audio: &[i16]) -> Result<TranscriptionResult> {
        Err(ScribedError::Alignment {
            message: "Whisper feature not enabled".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn whisper_config_default() {
        let config = WhisperConfig::default();
        assert_eq!(config.model_path, PathBuf::from("models/ggml-base.bin"));
        assert_eq!(config.threads, None);
    }

    #[test]
    fn new_fails_for_missing_model() {
        let config = WhisperConfig {
            model_path: PathBuf::from("/nonexistent/model.bin"),
            threads: None,
        };

        match WhisperTranscriber::new(config) {
            Err(ScribedError::ModelNotFound { path }) => {
                assert_eq!(path, "/nonexistent/model.bin");
            }
            _ => panic!("Expected ModelNotFound error"),
        }
    }

    #[test]
    fn model_name_strips_ggml_prefix() {
        assert_eq!(model_name_from_path(Path::new("/x/ggml-base.en.bin")), "base.en");
        assert_eq!(model_name_from_path(Path::new("/x/large-v2.bin")), "large-v2");
        assert_eq!(model_name_from_path(Path::new("/")), "unknown");
    }

    #[test]
    fn centis_conversion() {
        assert_eq!(centis_to_secs(0), 0.0);
        assert_eq!(centis_to_secs(150), 1.5);
        assert_eq!(centis_to_secs(100), 1.0);
    }

    #[test]
    fn convert_audio_i16_to_f32() {
        let samples = vec![0i16, 16384, -16384, 32767, -32768];
        let converted = WhisperTranscriber::convert_audio(&samples);

        assert_eq!(converted.len(), samples.len());
        assert_eq!(converted[0], 0.0);
        assert!((converted[1] - 0.5).abs() < 0.01);
        assert!((converted[2] + 0.5).abs() < 0.01);
        assert!((converted[3] - 0.999969).abs() < 0.01);
        assert_eq!(converted[4], -1.0);
    }

    #[test]
    fn convert_audio_empty() {
        let samples: Vec<i16> = vec![];
        assert!(WhisperTranscriber::convert_audio(&samples).is_empty());
    }

    #[test]
    fn attach_words_by_midpoint() {
        let result = TranscriptionResult {
            segments: vec![
                Segment::new(0.0, 2.0, "hello there"),
                Segment::new(2.0, 4.0, "ok"),
            ],
            language: "en".to_string(),
        };
        let words = vec![
            Word { start: 0.1, end: 0.8, text: "hello".into(), speaker: None },
            Word { start: 0.9, end: 1.8, text: "there".into(), speaker: None },
            Word { start: 2.2, end: 2.9, text: "ok".into(), speaker: None },
        ];

        let aligned = attach_words(&result, words);

        assert_eq!(aligned.segments[0].words.len(), 2);
        assert_eq!(aligned.segments[1].words.len(), 1);
        // Boundaries tighten to the received words
        assert_eq!(aligned.segments[0].start, 0.1);
        assert_eq!(aligned.segments[0].end, 1.8);
        assert_eq!(aligned.segments[1].start, 2.2);
    }

    #[test]
    fn attach_words_out_of_range_goes_to_nearest() {
        let result = TranscriptionResult {
            segments: vec![Segment::new(1.0, 2.0, "hi")],
            language: "en".to_string(),
        };
        let words = vec![Word { start: 5.0, end: 5.5, text: "hi".into(), speaker: None }];

        let aligned = attach_words(&result, words);
        assert_eq!(aligned.segments[0].words.len(), 1);
    }

    #[test]
    fn nearest_segment_picks_closest_span() {
        let segments = vec![
            Segment::new(0.0, 1.0, "a"),
            Segment::new(5.0, 6.0, "b"),
        ];
        assert_eq!(nearest_segment(&segments, 1.2), 0);
        assert_eq!(nearest_segment(&segments, 4.9), 1);
        assert_eq!(nearest_segment(&segments, 5.5), 1);
    }

    #[test]
    fn whisper_transcriber_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<WhisperTranscriber>();
        assert_sync::<WhisperTranscriber>();
    }

    // Integration tests — run automatically when a model is installed in the
    // scribed cache, silently skip when not.

    #[cfg(feature = "whisper")]
    fn try_find_model() -> Option<PathBuf> {
        for name in ["base.en", "tiny.en", "base", "tiny", "small"] {
            let path = crate::models::download::model_path(name);
            if path.exists() {
                return Some(path);
            }
        }
        eprintln!("no whisper model installed; skipping (run `scribed models install base.en`)");
        None
    }

    #[cfg(feature = "whisper")]
    #[test]
    fn transcribe_silence_with_real_model() {
        let Some(model_path) = try_find_model() else {
            return;
        };

        let transcriber = WhisperTranscriber::new(WhisperConfig {
            model_path,
            threads: Some(4),
        })
        .unwrap();
        assert!(transcriber.is_ready());

        let audio = vec![0i16; 16000];
        let result = transcriber.transcribe(&audio, Some("en")).unwrap();
        assert_eq!(result.language, "en");
    }
}
