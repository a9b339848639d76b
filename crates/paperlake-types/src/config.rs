//! Configuration loading for PaperLake.
//!
//! Layered config: defaults -> config file -> env vars.
//! Config file lives at ~/.config/paperlake/config.toml; environment
//! variables use the PAPERLAKE prefix (PAPERLAKE_HTTP_PORT, etc.).

use std::path::PathBuf;

use config::{Config, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration loading or validation failure.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Load(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Ingestion loop settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestionSettings {
    /// Query used when none is supplied (e.g. by the startup ingest run).
    #[serde(default = "default_query")]
    pub default_query: String,

    /// Default cap on articles collected per run.
    #[serde(default = "default_max_results")]
    pub default_max_results: usize,

    /// Lower bound of the randomized anti-ban pause between pages.
    #[serde(default = "default_backoff_min")]
    pub backoff_min_secs: f64,

    /// Upper bound of the randomized anti-ban pause between pages.
    #[serde(default = "default_backoff_max")]
    pub backoff_max_secs: f64,
}

fn default_query() -> String {
    "cs.CL".to_string()
}

fn default_max_results() -> usize {
    50
}

fn default_backoff_min() -> f64 {
    80.0
}

fn default_backoff_max() -> f64 {
    90.0
}

impl Default for IngestionSettings {
    fn default() -> Self {
        Self {
            default_query: default_query(),
            default_max_results: default_max_results(),
            backoff_min_secs: default_backoff_min(),
            backoff_max_secs: default_backoff_max(),
        }
    }
}

/// Processing pass settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingSettings {
    /// Maximum items processed in one pass.
    #[serde(default = "default_pass_size")]
    pub pass_size: usize,

    /// Pause between passes in the autonomous loop.
    #[serde(default = "default_pause_secs")]
    pub pause_secs: u64,

    /// When true the service drains the unprocessed set in the background
    /// from startup until shutdown.
    #[serde(default)]
    pub run_on_startup: bool,
}

fn default_pass_size() -> usize {
    10
}

fn default_pause_secs() -> u64 {
    1
}

impl Default for ProcessingSettings {
    fn default() -> Self {
        Self {
            pass_size: default_pass_size(),
            pause_secs: default_pause_secs(),
            run_on_startup: false,
        }
    }
}

/// Embedding model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSettings {
    /// HuggingFace repository id of the sentence-embedding model.
    #[serde(default = "default_model_repo")]
    pub repo_id: String,

    /// Override for the model file cache directory.
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,
}

fn default_model_repo() -> String {
    "sentence-transformers/all-MiniLM-L6-v2".to_string()
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            repo_id: default_model_repo(),
            cache_dir: None,
        }
    }
}

/// Top-level settings for the daemon and service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Port the HTTP service binds to.
    #[serde(default = "default_http_port")]
    pub http_port: u16,

    /// Path of the object store database.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Default tracing filter when RUST_LOG is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub ingestion: IngestionSettings,

    #[serde(default)]
    pub processing: ProcessingSettings,

    #[serde(default)]
    pub model: ModelSettings,
}

fn default_http_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_db_path() -> PathBuf {
    ProjectDirs::from("", "", "paperlake")
        .map(|p| p.data_dir().join("store"))
        .unwrap_or_else(|| PathBuf::from("./paperlake-store"))
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            http_port: default_http_port(),
            db_path: default_db_path(),
            log_level: default_log_level(),
            ingestion: IngestionSettings::default(),
            processing: ProcessingSettings::default(),
            model: ModelSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings in precedence order (later overrides earlier):
    /// 1. Built-in defaults
    /// 2. Config file (~/.config/paperlake/config.toml)
    /// 3. CLI-specified config file
    /// 4. Environment variables (PAPERLAKE_*)
    pub fn load(cli_config_path: Option<&str>) -> Result<Self, ConfigError> {
        let config_dir = ProjectDirs::from("", "", "paperlake")
            .map(|p| p.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));
        let default_config_path = config_dir.join("config");

        let mut builder = Config::builder()
            .add_source(File::with_name(&default_config_path.to_string_lossy()).required(false));

        if let Some(path) = cli_config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix("PAPERLAKE")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .map_err(|e| ConfigError::Load(e.to_string()))?;

        let settings: Settings = config
            .try_deserialize()
            .map_err(|e| ConfigError::Load(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validate cross-field constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ingestion.backoff_min_secs < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "backoff_min_secs must be >= 0, got {}",
                self.ingestion.backoff_min_secs
            )));
        }
        if self.ingestion.backoff_max_secs < self.ingestion.backoff_min_secs {
            return Err(ConfigError::Invalid(format!(
                "backoff_max_secs ({}) must be >= backoff_min_secs ({})",
                self.ingestion.backoff_max_secs, self.ingestion.backoff_min_secs
            )));
        }
        if self.processing.pass_size == 0 {
            return Err(ConfigError::Invalid(
                "processing.pass_size must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}
