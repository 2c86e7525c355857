//! Word-level alignment.
//!
//! The transcription pass yields segment-level timing; alignment refines it
//! to word boundaries. Failures here never fail a request: the pipeline falls
//! back to the unaligned result.

use crate::error::{Result, ScribedError};
use crate::stt::{TranscriptionResult, Word};
use std::sync::Arc;

/// Trait for refining transcript timing to word-level boundaries.
pub trait Aligner: Send + Sync {
    /// Produce a copy of `result` with word timings attached to each segment.
    ///
    /// # Arguments
    /// * `result` - Segment-level transcription to refine
    /// * `audio` - The same 16kHz mono PCM the transcription ran on
    fn align(&self, result: &TranscriptionResult, audio: &[i16]) -> Result<TranscriptionResult>;
}

impl<T: Aligner + ?Sized> Aligner for Arc<T> {
    fn align(&self, result: &TranscriptionResult, audio: &[i16]) -> Result<TranscriptionResult> {
        (**self).align(result, audio)
    }
}

/// Mock aligner for testing
#[derive(Debug, Default)]
pub struct MockAligner {
    should_fail: bool,
}

impl MockAligner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the mock to fail on align
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }
}

impl Aligner for MockAligner {
    fn align(&self, result: &TranscriptionResult, _audio: &[i16]) -> Result<TranscriptionResult> {
        if self.should_fail {
            return Err(ScribedError::Alignment {
                message: "mock alignment failure".to_string(),
            });
        }

        // Spread each segment's words evenly across its span.
        let mut aligned = result.clone();
        for segment in &mut aligned.segments {
            let tokens: Vec<&str> = segment.text.split_whitespace().collect();
            if tokens.is_empty() {
                continue;
            }
            let step = (segment.end - segment.start) / tokens.len() as f64;
            segment.words = tokens
                .iter()
                .enumerate()
                .map(|(i, t)| Word {
                    start: segment.start + step * i as f64,
                    end: segment.start + step * (i + 1) as f64,
                    text: (*t).to_string(),
                    speaker: None,
                })
                .collect();
        }
        Ok(aligned)
    }
}
