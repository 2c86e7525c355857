//! ffmpeg subprocess decoder for non-WAV containers.
//!
//! Codec handling belongs to ffmpeg; this module only asks it for 16kHz mono
//! PCM on stdout and parses the resulting WAV stream.

use crate::audio::wav::decode_wav;
use crate::defaults::SAMPLE_RATE;
use crate::error::{Result, ScribedError};
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

/// Decode any container ffmpeg understands into 16kHz mono i16 samples.
pub async fn decode_with_ffmpeg(path: &Path) -> Result<Vec<i16>> {
    let output = Command::new("ffmpeg")
        .arg("-nostdin")
        .arg("-i")
        .arg(path)
        .args(["-f", "wav"])
        .args(["-ar", &SAMPLE_RATE.to_string()])
        .args(["-ac", "1"])
        .args(["-map_metadata", "-1"])
        .arg("pipe:1")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ScribedError::AudioDecode {
                    message: "ffmpeg not found on PATH; install ffmpeg to transcribe non-WAV uploads"
                        .to_string(),
                }
            } else {
                ScribedError::AudioDecode {
                    message: format!("Failed to run ffmpeg: {}", e),
                }
            }
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ScribedError::AudioDecode {
            message: format!(
                "ffmpeg exited with {}: {}",
                output.status,
                last_line(&stderr)
            ),
        });
    }

    decode_wav(std::io::Cursor::new(output.stdout))
}

/// ffmpeg stderr is long; the actual error is almost always the last line.
fn last_line(text: &str) -> &str {
    text.lines()
        .rev()
        .find(|l| !l.trim().is_empty())
        .unwrap_or("")
}
