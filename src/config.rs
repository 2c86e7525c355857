use crate::defaults;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub stt: SttConfig,
    pub diarization: DiarizationConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_upload_mb: usize,
    /// Directory uploads are spooled into. Defaults to the system temp dir.
    pub spool_dir: Option<PathBuf>,
}

/// Speech-to-text configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SttConfig {
    pub model: String,
    pub language: String,
    /// Inference threads (None = auto-detect)
    pub threads: Option<usize>,
}

/// Speaker diarization configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DiarizationConfig {
    /// Base URL of the diarization backend. When unset, the default sidecar
    /// address is used as long as the credential is present.
    pub endpoint: Option<String>,
    /// Bearer credential for the backend. Not read from the config file;
    /// populated from the HF_TOKEN environment variable.
    #[serde(skip)]
    pub token: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: defaults::DEFAULT_HOST.to_string(),
            port: defaults::DEFAULT_PORT,
            max_upload_mb: defaults::MAX_UPLOAD_MB,
            spool_dir: None,
        }
    }
}

impl Default for SttConfig {
    fn default() -> Self {
        Self {
            model: defaults::DEFAULT_MODEL.to_string(),
            language: defaults::AUTO_LANGUAGE.to_string(),
            threads: None,
        }
    }
}

impl Default for DiarizationConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            token: None,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file contains invalid TOML.
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if file doesn't exist
    ///
    /// Only returns defaults if the file is missing.
    /// Returns errors for invalid TOML.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        match Self::load(path) {
            Ok(config) => Ok(config),
            Err(e) => {
                if e.downcast_ref::<std::io::Error>()
                    .map(|io_err| io_err.kind() == std::io::ErrorKind::NotFound)
                    .unwrap_or(false)
                {
                    Ok(Self::default())
                } else {
                    Err(e)
                }
            }
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - SCRIBED_MODEL → stt.model
    /// - SCRIBED_LANGUAGE → stt.language
    /// - SCRIBED_HOST → server.host
    /// - SCRIBED_PORT → server.port
    /// - SCRIBED_DIARIZATION_URL → diarization.endpoint
    /// - HF_TOKEN → diarization.token (credential, never read from file)
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(model) = std::env::var("SCRIBED_MODEL")
            && !model.is_empty()
        {
            self.stt.model = model;
        }

        if let Ok(language) = std::env::var("SCRIBED_LANGUAGE")
            && !language.is_empty()
        {
            self.stt.language = language;
        }

        if let Ok(host) = std::env::var("SCRIBED_HOST")
            && !host.is_empty()
        {
            self.server.host = host;
        }

        if let Ok(port) = std::env::var("SCRIBED_PORT")
            && let Ok(port) = port.parse()
        {
            self.server.port = port;
        }

        if let Ok(url) = std::env::var("SCRIBED_DIARIZATION_URL")
            && !url.is_empty()
        {
            self.diarization.endpoint = Some(url);
        }

        if let Ok(token) = std::env::var("HF_TOKEN")
            && !token.is_empty()
        {
            self.diarization.token = Some(token);
        }

        self
    }

    /// Whether speaker diarization can run: strictly presence of the credential.
    pub fn diarization_available(&self) -> bool {
        self.diarization.token.is_some()
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/scribed/config.toml on Linux
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join("scribed")
            .join("config.toml")
    }
}
