//! Speaker assignment: label transcript segments with diarization turns.
//!
//! Each segment (and each of its words) takes the speaker whose turn
//! maximally overlaps it in time. Segments no turn touches stay unlabeled.

use crate::diarize::SpeakerTurn;
use crate::stt::Segment;

/// Overlap in seconds between a span and a turn; zero when disjoint.
fn overlap(start: f64, end: f64, turn: &SpeakerTurn) -> f64 {
    (end.min(turn.end) - start.max(turn.start)).max(0.0)
}

/// Speaker whose turn maximally overlaps [start, end), if any overlaps at all.
fn dominant_speaker<'a>(start: f64, end: f64, turns: &'a [SpeakerTurn]) -> Option<&'a str> {
    let mut best: Option<&str> = None;
    let mut best_overlap = 0.0;
    for turn in turns {
        let o = overlap(start, end, turn);
        if o > best_overlap {
            best_overlap = o;
            best = Some(&turn.speaker);
        }
    }
    best
}

/// Attach speaker labels to segments and their words.
///
/// Consumes the segment list and returns it relabeled; order is preserved.
pub fn assign_speakers(mut segments: Vec<Segment>, turns: &[SpeakerTurn]) -> Vec<Segment> {
    for segment in &mut segments {
        segment.speaker = dominant_speaker(segment.start, segment.end, turns).map(String::from);
        for word in &mut segment.words {
            // Word spans are short; fall back to the segment's speaker when
            // no turn overlaps the word itself.
            word.speaker = dominant_speaker(word.start, word.end, turns)
                .map(String::from)
                .or_else(|| segment.speaker.clone());
        }
    }
    segments
}
