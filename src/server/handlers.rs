//! Route handlers for the HTTP surface.

use crate::audio;
use crate::defaults;
use crate::error::Result;
use crate::pipeline::{PipelineOptions, TranscriptOutput, TranscriptionPipeline};
use crate::server::state::AppState;
use axum::Json;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::json;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{error, info};

/// Error surface of the API: 400 for rejected requests, 500 for pipeline
/// failures, both with a `detail` message in the body.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::BadRequest(detail) => (StatusCode::BAD_REQUEST, detail),
            ApiError::Internal(detail) => (StatusCode::INTERNAL_SERVER_ERROR, detail),
        };
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

/// GET /health response body.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub device: String,
    pub compute_type: String,
    pub model: String,
    pub diarization_available: bool,
    pub uptime_secs: u64,
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        device: defaults::device().to_string(),
        compute_type: defaults::compute_type().to_string(),
        model: state.config.stt.model.clone(),
        diarization_available: state.config.diarization_available(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

/// GET / — static service descriptor.
pub async fn root() -> Json<serde_json::Value> {
    Json(json!({
        "service": "scribed",
        "version": crate::version_string(),
        "endpoints": {
            "POST /transcribe": "Transcribe audio with speaker diarization",
            "GET /health": "Health check",
        },
    }))
}

/// The parsed `/transcribe` form: the upload plus its options.
struct TranscribeRequest {
    filename: String,
    data: Vec<u8>,
    options: PipelineOptions,
}

/// POST /transcribe
///
/// Multipart form: `file` (required, MIME allow-list), `diarize` (default
/// true), `language` (optional), `align` (default true). The upload is
/// spooled to a named temp file that is deleted on drop, success or failure.
pub async fn transcribe(
    State(state): State<AppState>,
    multipart: Multipart,
) -> std::result::Result<Json<TranscriptOutput>, ApiError> {
    let request = parse_form(multipart).await?;

    let spooled = spool_upload(&state, &request.filename, &request.data)
        .map_err(|e| ApiError::Internal(format!("Failed to spool upload: {}", e)))?;

    info!(
        file = %request.filename,
        bytes = request.data.len(),
        diarize = request.options.diarize,
        align = request.options.align,
        "transcription request"
    );

    let result = process_upload(&state, spooled.path(), request.options).await;
    // Temp file removed here regardless of outcome
    drop(spooled);

    result.map(Json).map_err(|e| {
        error!("transcription failed: {}", e);
        ApiError::Internal(format!("Transcription failed: {}", e))
    })
}

/// Validate and collect the multipart form.
///
/// The content-type check happens the moment the file field is seen, before
/// its bytes are read and long before any model is touched.
async fn parse_form(mut multipart: Multipart) -> std::result::Result<TranscribeRequest, ApiError> {
    let mut upload: Option<(String, Vec<u8>)> = None;
    let mut options = PipelineOptions::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart form: {}", e)))?
    {
        match field.name() {
            Some("file") => {
                let content_type = field.content_type().unwrap_or("").to_string();
                if !defaults::is_allowed_content_type(&content_type) {
                    return Err(ApiError::BadRequest(format!(
                        "Unsupported file type: {}. Allowed: MP3, MP4, WAV, M4A, WebM, OGG",
                        content_type
                    )));
                }
                let filename = field
                    .file_name()
                    .filter(|n| !n.is_empty())
                    .unwrap_or("upload.wav")
                    .to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read upload: {}", e)))?;
                upload = Some((filename, data.to_vec()));
            }
            Some("diarize") => {
                options.diarize = parse_bool_field("diarize", field).await?;
            }
            Some("align") => {
                options.align = parse_bool_field("align", field).await?;
            }
            Some("language") => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Invalid language field: {}", e)))?;
                let value = value.trim().to_string();
                if !value.is_empty() && value != defaults::AUTO_LANGUAGE {
                    options.language = Some(value);
                }
            }
            _ => {}
        }
    }

    let (filename, data) = upload
        .ok_or_else(|| ApiError::BadRequest("Missing required field: file".to_string()))?;

    Ok(TranscribeRequest {
        filename,
        data,
        options,
    })
}

async fn parse_bool_field(
    name: &str,
    field: axum::extract::multipart::Field<'_>,
) -> std::result::Result<bool, ApiError> {
    let value = field
        .text()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid {} field: {}", name, e)))?;
    parse_bool(&value)
        .ok_or_else(|| ApiError::BadRequest(format!("Invalid boolean for {}: {}", name, value)))
}

/// Form-style boolean parsing: true/false, 1/0, yes/no, on/off.
fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Write the upload to a named temp file in the configured spool directory.
///
/// The file keeps the upload's extension so the ffmpeg decoder sees the
/// right container hint; deletion is guaranteed by the returned guard's drop.
fn spool_upload(state: &AppState, filename: &str, data: &[u8]) -> Result<NamedTempFile> {
    let suffix = format!(".{}", extension_for(filename));
    let mut builder = tempfile::Builder::new();
    builder.prefix("scribed-upload-").suffix(&suffix);

    let file = match &state.config.server.spool_dir {
        Some(dir) => builder.tempfile_in(dir)?,
        None => builder.tempfile()?,
    };
    std::fs::write(file.path(), data)?;
    Ok(file)
}

/// File extension for the spooled copy, from the upload's own name.
fn extension_for(filename: &str) -> &str {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty() && e.len() <= 5 && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or("wav")
}

/// Decode the spooled file and run the pipeline on it.
async fn process_upload(
    state: &AppState,
    path: &Path,
    options: PipelineOptions,
) -> Result<TranscriptOutput> {
    let samples = audio::load_audio(path).await?;
    let engines = state.models.get().await?;
    let pipeline = TranscriptionPipeline::new(
        engines.transcriber,
        engines.aligner,
        state.diarizer.clone(),
    );
    pipeline.run(samples, options).await
}
