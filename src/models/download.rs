//! Model download and local cache management.
//!
//! Models are fetched from HuggingFace, verified against their catalog
//! checksum, and stored under the user's cache directory.

use crate::error::{Result, ScribedError};
use crate::models::catalog::{self, ModelInfo, get_model};
use futures_util::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use sha1::{Digest, Sha1};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Directory where models are cached: `~/.cache/scribed/models/`.
pub fn models_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from(".cache"))
        .join("scribed")
        .join("models")
}

/// Full path of a model file in the cache.
///
/// Always returns a path; the file may or may not exist on disk.
pub fn model_path(name: &str) -> PathBuf {
    let resolved = catalog::resolve_name(name);
    models_dir().join(format!("ggml-{resolved}.bin"))
}

/// Whether a model file is present in the cache.
pub fn is_model_installed(name: &str) -> bool {
    model_path(name).exists()
}

/// Download a model into the cache.
///
/// No-op if the file already exists. The downloaded bytes are hashed while
/// streaming; a checksum mismatch removes the file and fails.
pub async fn download_model(name: &str, progress: bool) -> Result<PathBuf> {
    let info = get_model(name).ok_or_else(|| ScribedError::UnknownModel {
        name: name.to_string(),
    })?;
    let path = model_path(name);

    if path.exists() {
        if progress {
            eprintln!("Model '{}' is already installed at {}", name, path.display());
        }
        return Ok(path);
    }

    download_to_path(info, &path, progress).await?;
    Ok(path)
}

async fn download_to_path(info: &ModelInfo, output_path: &Path, progress: bool) -> Result<()> {
    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)?;
    }

    if progress {
        eprintln!("Downloading {} ({} MB)...", info.name, info.size_mb);
    }

    let client = reqwest::Client::new();
    let response = client.get(info.url).send().await.map_err(|e| {
        ScribedError::ModelDownload {
            message: format!("failed to start download: {e}"),
        }
    })?;

    if !response.status().is_success() {
        return Err(ScribedError::ModelDownload {
            message: format!("download failed with status: {}", response.status()),
        });
    }

    let total_size = response.content_length().unwrap_or(0);

    let pb = if progress {
        let pb = ProgressBar::new(total_size);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        Some(pb)
    } else {
        None
    };

    let mut hasher = Sha1::new();
    let mut stream = response.bytes_stream();
    let mut file = fs::File::create(output_path)?;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| ScribedError::ModelDownload {
            message: format!("failed to read download chunk: {e}"),
        })?;
        file.write_all(&chunk)?;
        hasher.update(&chunk);
        if let Some(ref pb) = pb {
            pb.inc(chunk.len() as u64);
        }
    }

    if let Some(pb) = pb {
        pb.finish_with_message("Downloaded");
    }

    if !info.sha1.is_empty() {
        let calculated = format!("{:x}", hasher.finalize());
        if calculated != info.sha1 {
            if let Err(e) = fs::remove_file(output_path) {
                eprintln!("scribed: failed to remove corrupted download: {e}");
            }
            return Err(ScribedError::ModelDownload {
                message: format!(
                    "SHA-1 checksum mismatch. Expected: {}, got: {}",
                    info.sha1, calculated
                ),
            });
        }
        if progress {
            eprintln!("Checksum verified");
        }
    }

    if progress {
        eprintln!("Model installed to: {}", output_path.display());
    }

    Ok(())
}

/// One line of `models list` output.
pub fn format_model_info(model: &ModelInfo) -> String {
    let status = if is_model_installed(model.name) {
        "[installed]"
    } else {
        "[not installed]"
    };
    format!("{:12} {:5} MB   {}", model.name, model.size_mb, status)
}
