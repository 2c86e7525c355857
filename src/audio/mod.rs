//! Media decoding: turn an uploaded file into 16kHz mono PCM.
//!
//! WAV is decoded in process; every other allowed container is handed to
//! ffmpeg, which owns codec handling.

pub mod ffmpeg;
pub mod wav;

use crate::error::Result;
use std::path::Path;

/// Decode a media file into 16kHz mono i16 samples.
///
/// WAV files are parsed directly with hound; anything else goes through the
/// ffmpeg subprocess decoder.
pub async fn load_audio(path: &Path) -> Result<Vec<i16>> {
    if is_wav(path) {
        let data = tokio::fs::read(path).await?;
        wav::decode_wav(std::io::Cursor::new(data))
    } else {
        ffmpeg::decode_with_ffmpeg(path).await
    }
}

/// Sniff for a RIFF/WAVE header; falls back to the file extension.
fn is_wav(path: &Path) -> bool {
    if let Ok(header) = std::fs::read(path).map(|d| d.into_iter().take(12).collect::<Vec<_>>())
        && header.len() == 12
    {
        return &header[0..4] == b"RIFF" && &header[8..12] == b"WAVE";
    }
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("wav"))
}
