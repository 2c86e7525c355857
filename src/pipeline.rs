//! Request pipeline: transcribe, optionally align and diarize, then format.
//!
//! Error handling is two-tier: transcription failure aborts the request;
//! alignment and diarization failures are logged and degrade gracefully to
//! the unaligned / speakerless result.

use crate::align::Aligner;
use crate::diarize::Diarizer;
use crate::error::{Result, ScribedError};
use crate::format::format_transcript;
use crate::merge::assign_speakers;
use crate::stt::{Segment, Transcriber};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

/// Per-request knobs, mirroring the `/transcribe` form fields.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Attribute segments to speakers (needs the diarization credential).
    pub diarize: bool,
    /// Refine timing to word-level boundaries.
    pub align: bool,
    /// Language code to force, None for auto-detection.
    pub language: Option<String>,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            diarize: true,
            align: true,
            language: None,
        }
    }
}

/// Final result of one request.
#[derive(Debug, Clone, Serialize)]
pub struct TranscriptOutput {
    /// Formatted transcript text.
    pub transcript: String,
    /// The segments the transcript was built from.
    pub segments: Vec<Segment>,
    /// Detected (or forced) language code.
    pub language: String,
    /// Whether speaker labels were attached.
    pub has_speakers: bool,
}

/// Orchestrates the model calls for one upload.
///
/// Owns nothing but handles: the transcriber and aligner are typically the
/// same shared Whisper backend, the diarizer is present only when the
/// credential is configured.
pub struct TranscriptionPipeline {
    transcriber: Arc<dyn Transcriber>,
    aligner: Arc<dyn Aligner>,
    diarizer: Option<Arc<dyn Diarizer>>,
}

impl TranscriptionPipeline {
    pub fn new(
        transcriber: Arc<dyn Transcriber>,
        aligner: Arc<dyn Aligner>,
        diarizer: Option<Arc<dyn Diarizer>>,
    ) -> Self {
        Self {
            transcriber,
            aligner,
            diarizer,
        }
    }

    /// Run the full pipeline on decoded audio.
    ///
    /// Model inference is synchronous CPU work and runs on the blocking pool.
    pub async fn run(&self, audio: Vec<i16>, options: PipelineOptions) -> Result<TranscriptOutput> {
        let audio = Arc::new(audio);

        info!(samples = audio.len(), "transcribing audio");
        let transcriber = self.transcriber.clone();
        let language = options.language.clone();
        let audio_for_stt = audio.clone();
        let mut result = tokio::task::spawn_blocking(move || {
            transcriber.transcribe(&audio_for_stt, language.as_deref())
        })
        .await
        .map_err(|e| ScribedError::Other(format!("transcription task failed: {}", e)))??;

        if options.align {
            info!("aligning transcript");
            let aligner = self.aligner.clone();
            let unaligned = result.clone();
            let audio_for_align = audio.clone();
            let aligned = tokio::task::spawn_blocking(move || {
                aligner.align(&unaligned, &audio_for_align)
            })
            .await
            .map_err(|e| ScribedError::Other(format!("alignment task failed: {}", e)))?;

            match aligned {
                Ok(aligned) => result = aligned,
                Err(e) => {
                    warn!("alignment failed: {}. Returning unaligned transcript.", e);
                }
            }
        }

        let mut has_speakers = false;
        let mut segments = result.segments;

        if options.diarize {
            match &self.diarizer {
                Some(diarizer) => {
                    info!("running speaker diarization");
                    match diarizer.diarize(&audio).await {
                        Ok(turns) => {
                            segments = assign_speakers(segments, &turns);
                            has_speakers = true;
                            info!(turns = turns.len(), "speaker diarization completed");
                        }
                        Err(e) => {
                            warn!(
                                "diarization failed: {}. Returning transcript without speakers.",
                                e
                            );
                        }
                    }
                }
                None => {
                    warn!("diarization requested but unavailable; set HF_TOKEN to enable it");
                }
            }
        }

        let transcript = format_transcript(&segments, has_speakers);

        Ok(TranscriptOutput {
            transcript,
            segments,
            language: result.language,
            has_speakers,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::align::MockAligner;
    use crate::diarize::{MockDiarizer, SpeakerTurn};
    use crate::stt::MockTranscriber;

    fn turn(start: f64, end: f64, speaker: &str) -> SpeakerTurn {
        SpeakerTurn {
            start,
            end,
            speaker: speaker.to_string(),
        }
    }

    fn two_speaker_segments() -> Vec<Segment> {
        vec![
            Segment::new(0.0, 1.0, "hi"),
            Segment::new(1.0, 2.0, "there"),
            Segment::new(2.0, 3.0, "ok"),
        ]
    }

    fn pipeline_with(
        transcriber: MockTranscriber,
        diarizer: Option<MockDiarizer>,
    ) -> TranscriptionPipeline {
        TranscriptionPipeline::new(
            Arc::new(transcriber),
            Arc::new(MockAligner::new()),
            diarizer.map(|d| Arc::new(d) as Arc<dyn Diarizer>),
        )
    }

    #[tokio::test]
    async fn full_pipeline_labels_and_groups_speakers() {
        let transcriber = MockTranscriber::new("mock").with_segments(two_speaker_segments());
        let diarizer = MockDiarizer::new()
            .with_turns(vec![turn(0.0, 2.0, "A"), turn(2.0, 3.0, "B")]);
        let pipeline = pipeline_with(transcriber, Some(diarizer));

        let output = pipeline
            .run(vec![0i16; 16000], PipelineOptions::default())
            .await
            .unwrap();

        assert!(output.has_speakers);
        assert_eq!(output.transcript, "A: hi there\n\nB: ok");
        assert_eq!(output.language, "en");
        // Alignment attached word timing
        assert!(!output.segments[0].words.is_empty());
    }

    #[tokio::test]
    async fn transcription_failure_aborts_request() {
        let pipeline = pipeline_with(MockTranscriber::new("mock").with_failure(), None);

        let result = pipeline
            .run(vec![0i16; 100], PipelineOptions::default())
            .await;

        match result {
            Err(ScribedError::Transcription { .. }) => {}
            other => panic!("Expected Transcription error, got {:?}", other.is_ok()),
        }
    }

    #[tokio::test]
    async fn alignment_failure_degrades_to_unaligned() {
        let transcriber = MockTranscriber::new("mock").with_segments(two_speaker_segments());
        let pipeline = TranscriptionPipeline::new(
            Arc::new(transcriber),
            Arc::new(MockAligner::new().with_failure()),
            None,
        );

        let output = pipeline
            .run(
                vec![0i16; 100],
                PipelineOptions {
                    diarize: false,
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(output.transcript, "hi there ok");
        assert!(output.segments.iter().all(|s| s.words.is_empty()));
    }

    #[tokio::test]
    async fn diarization_failure_degrades_to_speakerless() {
        let transcriber = MockTranscriber::new("mock").with_segments(two_speaker_segments());
        let pipeline = pipeline_with(transcriber, Some(MockDiarizer::new().with_failure()));

        let output = pipeline
            .run(vec![0i16; 100], PipelineOptions::default())
            .await
            .unwrap();

        assert!(!output.has_speakers);
        assert_eq!(output.transcript, "hi there ok");
    }

    #[tokio::test]
    async fn diarize_without_credential_yields_plain_transcript() {
        let transcriber = MockTranscriber::new("mock").with_segments(two_speaker_segments());
        let pipeline = pipeline_with(transcriber, None);

        let output = pipeline
            .run(vec![0i16; 100], PipelineOptions::default())
            .await
            .unwrap();

        assert!(!output.has_speakers);
        assert_eq!(output.transcript, "hi there ok");
    }

    #[tokio::test]
    async fn align_false_skips_alignment() {
        let transcriber = MockTranscriber::new("mock").with_segments(two_speaker_segments());
        let pipeline = pipeline_with(transcriber, None);

        let output = pipeline
            .run(
                vec![0i16; 100],
                PipelineOptions {
                    diarize: false,
                    align: false,
                    language: None,
                },
            )
            .await
            .unwrap();

        assert!(output.segments.iter().all(|s| s.words.is_empty()));
    }

    #[tokio::test]
    async fn forced_language_is_propagated() {
        let transcriber = MockTranscriber::new("mock").with_segments(two_speaker_segments());
        let pipeline = pipeline_with(transcriber, None);

        let output = pipeline
            .run(
                vec![0i16; 100],
                PipelineOptions {
                    diarize: false,
                    align: false,
                    language: Some("de".to_string()),
                },
            )
            .await
            .unwrap();

        assert_eq!(output.language, "de");
    }
}
