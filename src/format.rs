//! Transcript formatting: group segments into a readable transcript.
//!
//! With speakers, consecutive same-speaker segments merge into one labeled
//! paragraph; without, the segment texts are joined with spaces.

use crate::defaults::UNKNOWN_SPEAKER;
use crate::stt::Segment;

/// Format segments into a speaker-labeled transcript.
///
/// Consecutive segments sharing a speaker become one `SPEAKER: text...`
/// paragraph; paragraphs are separated by a blank line. Empty-text segments
/// are skipped. Segments without a label are attributed to `UNKNOWN`.
pub fn format_with_speakers(segments: &[Segment]) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut current_speaker: Option<&str> = None;
    let mut current_text: Vec<&str> = Vec::new();

    for segment in segments {
        let speaker = segment.speaker.as_deref().unwrap_or(UNKNOWN_SPEAKER);
        let text = segment.text.trim();

        if Some(speaker) != current_speaker {
            if let Some(prev) = current_speaker
                && !current_text.is_empty()
            {
                lines.push(format!("{}: {}", prev, current_text.join(" ")));
            }
            current_speaker = Some(speaker);
            current_text.clear();
            if !text.is_empty() {
                current_text.push(text);
            }
        } else if !text.is_empty() {
            current_text.push(text);
        }
    }

    // Don't forget the last speaker
    if let Some(prev) = current_speaker
        && !current_text.is_empty()
    {
        lines.push(format!("{}: {}", prev, current_text.join(" ")));
    }

    lines.join("\n\n")
}

/// Format segments into a plain transcript, texts joined with single spaces.
pub fn format_without_speakers(segments: &[Segment]) -> String {
    segments
        .iter()
        .map(|s| s.text.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Pick the formatter matching whether diarization produced speakers.
pub fn format_transcript(segments: &[Segment], has_speakers: bool) -> String {
    if has_speakers {
        format_with_speakers(segments)
    } else {
        format_without_speakers(segments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(speaker: Option<&str>, text: &str) -> Segment {
        let mut s = Segment::new(0.0, 1.0, text);
        s.speaker = speaker.map(String::from);
        s
    }

    #[test]
    fn consecutive_same_speaker_segments_merge() {
        let segments = vec![
            seg(Some("A"), "hi"),
            seg(Some("A"), "there"),
            seg(Some("B"), "ok"),
        ];

        assert_eq!(format_with_speakers(&segments), "A: hi there\n\nB: ok");
    }

    #[test]
    fn empty_text_segments_are_dropped() {
        let segments = vec![
            seg(Some("A"), "hi"),
            seg(Some("A"), "   "),
            seg(Some("A"), "there"),
        ];

        assert_eq!(format_with_speakers(&segments), "A: hi there");
    }

    #[test]
    fn speaker_with_only_empty_text_produces_no_paragraph() {
        let segments = vec![
            seg(Some("A"), "hi"),
            seg(Some("B"), ""),
            seg(Some("C"), "bye"),
        ];

        assert_eq!(format_with_speakers(&segments), "A: hi\n\nC: bye");
    }

    #[test]
    fn unlabeled_segments_render_as_unknown() {
        let segments = vec![seg(None, "who said this"), seg(Some("A"), "me")];

        assert_eq!(
            format_with_speakers(&segments),
            "UNKNOWN: who said this\n\nA: me"
        );
    }

    #[test]
    fn speaker_returning_later_starts_new_paragraph() {
        let segments = vec![
            seg(Some("A"), "first"),
            seg(Some("B"), "reply"),
            seg(Some("A"), "again"),
        ];

        assert_eq!(
            format_with_speakers(&segments),
            "A: first\n\nB: reply\n\nA: again"
        );
    }

    #[test]
    fn empty_input_formats_to_empty_string() {
        assert_eq!(format_with_speakers(&[]), "");
        assert_eq!(format_without_speakers(&[]), "");
    }

    #[test]
    fn without_speakers_joins_with_spaces() {
        let segments = vec![seg(None, "a"), seg(None, "b")];

        assert_eq!(format_without_speakers(&segments), "a b");
    }

    #[test]
    fn without_speakers_trims_and_skips_empty() {
        let segments = vec![seg(None, "  a "), seg(None, ""), seg(None, " b")];

        assert_eq!(format_without_speakers(&segments), "a b");
    }

    #[test]
    fn format_transcript_dispatches_on_has_speakers() {
        let segments = vec![seg(Some("A"), "hi"), seg(Some("B"), "ok")];

        assert_eq!(format_transcript(&segments, true), "A: hi\n\nB: ok");
        assert_eq!(format_transcript(&segments, false), "hi ok");
    }

    #[test]
    fn all_empty_segments_produce_empty_transcript() {
        let segments = vec![seg(Some("A"), ""), seg(Some("B"), "  ")];

        assert_eq!(format_with_speakers(&segments), "");
        assert_eq!(format_without_speakers(&segments), "");
    }
}
