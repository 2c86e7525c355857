//! Shared server state and the owned model handle.
//!
//! The transcription model is expensive to load, so it is created at most
//! once per process and shared across requests. `ModelHandle` makes that
//! contract explicit: a `OnceCell` initialized under mutual exclusion by an
//! injected loader, instead of an unguarded lazy global.

use crate::align::Aligner;
use crate::config::Config;
use crate::defaults;
use crate::diarize::{Diarizer, RemoteDiarizer};
use crate::error::{Result, ScribedError};
use crate::models;
use crate::stt::{Transcriber, WhisperConfig, WhisperTranscriber};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::OnceCell;
use tracing::info;

/// The loaded inference engines: transcriber and aligner.
///
/// In production both are the same shared Whisper backend; tests inject
/// independent mocks.
#[derive(Clone)]
pub struct EngineSet {
    pub transcriber: Arc<dyn Transcriber>,
    pub aligner: Arc<dyn Aligner>,
}

type Loader = dyn Fn() -> Result<EngineSet> + Send + Sync;

/// Lazily initialized, process-lifetime model handle.
///
/// The loader runs at most once, on the blocking pool, under the cell's
/// mutual exclusion; concurrent first requests wait for the same load
/// instead of racing to load the model twice. There is no invalidation:
/// changing the configured model requires a restart.
pub struct ModelHandle {
    cell: OnceCell<EngineSet>,
    loader: Arc<Loader>,
}

impl ModelHandle {
    /// Create a handle with an injected loader (used by tests).
    pub fn new(loader: impl Fn() -> Result<EngineSet> + Send + Sync + 'static) -> Self {
        Self {
            cell: OnceCell::new(),
            loader: Arc::new(loader),
        }
    }

    /// Create the production handle: loads the configured Whisper model from
    /// the local model cache on first use.
    pub fn from_config(config: &Config) -> Self {
        let model = config.stt.model.clone();
        let threads = config.stt.threads;
        Self::new(move || {
            let model_path = models::download::model_path(&model);
            info!(model = %model, path = %model_path.display(), "loading whisper model");
            let backend = Arc::new(WhisperTranscriber::new(WhisperConfig {
                model_path,
                threads,
            })?);
            info!(model = %model, "whisper model loaded");
            Ok(EngineSet {
                transcriber: backend.clone(),
                aligner: backend,
            })
        })
    }

    /// Get the engines, loading them on first call.
    pub async fn get(&self) -> Result<EngineSet> {
        self.cell
            .get_or_try_init(|| {
                let loader = self.loader.clone();
                async move {
                    tokio::task::spawn_blocking(move || loader())
                        .await
                        .map_err(|e| ScribedError::Other(format!("model load task failed: {}", e)))?
                }
            })
            .await
            .cloned()
    }

    /// Whether the model has already been loaded.
    pub fn is_loaded(&self) -> bool {
        self.cell.initialized()
    }
}

/// Shared state accessible from Axum handlers.
#[derive(Clone)]
pub struct AppState {
    /// Service configuration.
    pub config: Arc<Config>,
    /// Owned transcription/alignment model handle.
    pub models: Arc<ModelHandle>,
    /// Diarization backend, present exactly when the credential is configured.
    pub diarizer: Option<Arc<dyn Diarizer>>,
    /// When the server started.
    pub start_time: Instant,
}

impl AppState {
    /// Build production state from configuration.
    ///
    /// A diarizer exists exactly when the credential does, matching what
    /// `/health` advertises; without a configured endpoint the default
    /// sidecar address is used.
    pub fn from_config(config: Config) -> Self {
        let models = Arc::new(ModelHandle::from_config(&config));
        let diarizer = config.diarization.token.as_ref().map(|token| {
            let endpoint = config
                .diarization
                .endpoint
                .clone()
                .unwrap_or_else(|| defaults::DEFAULT_DIARIZATION_ENDPOINT.to_string());
            Arc::new(RemoteDiarizer::new(endpoint, token.clone())) as Arc<dyn Diarizer>
        });
        Self {
            config: Arc::new(config),
            models,
            diarizer,
            start_time: Instant::now(),
        }
    }
}
