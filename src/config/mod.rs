//! Configuration module for homeprice.

use crate::error::{PriceError, Result};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default blob holding the fitted linear model.
pub const DEFAULT_MODEL_BLOB: &str = "models/linear_model.json";

/// Default blob holding the ordered feature-column names.
pub const DEFAULT_COLUMNS_BLOB: &str = "models/X_columns.json";

/// Main configuration for a homeprice server.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Blob storage configuration.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Model behaviour configuration.
    #[serde(default)]
    pub model: ModelConfig,
    /// Observability configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl AppConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            PriceError::Config(format!("Failed to read config file: {}", e))
        })?;

        let config: Self = serde_json::from_str(&content).map_err(|e| {
            PriceError::Config(format!("Failed to parse config: {}", e))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration.
    ///
    /// Connection settings are not required here. Missing ones are reported
    /// on the first model load.
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(PriceError::InvalidConfig {
                field: "server.port".to_string(),
                reason: "Port must be non-zero".to_string(),
            });
        }

        if self.storage.model_blob.trim().is_empty() {
            return Err(PriceError::InvalidConfig {
                field: "storage.model_blob".to_string(),
                reason: "Blob name cannot be empty".to_string(),
            });
        }

        if self.storage.columns_blob.trim().is_empty() {
            return Err(PriceError::InvalidConfig {
                field: "storage.columns_blob".to_string(),
                reason: "Blob name cannot be empty".to_string(),
            });
        }

        if self.storage.connect_timeout.is_zero() || self.storage.request_timeout.is_zero() {
            return Err(PriceError::InvalidConfig {
                field: "storage.timeouts".to_string(),
                reason: "Timeouts must be non-zero".to_string(),
            });
        }

        Ok(())
    }

    /// Create a configuration for local development against a directory of
    /// artifacts.
    pub fn development(artifacts_dir: impl Into<PathBuf>) -> Self {
        Self {
            server: ServerConfig {
                host: IpAddr::from([127, 0, 0, 1]),
                port: 5000,
            },
            storage: StorageConfig {
                container_name: Some("local".to_string()),
                artifacts_dir: Some(artifacts_dir.into()),
                ..StorageConfig::default()
            },
            model: ModelConfig::default(),
            observability: ObservabilityConfig {
                log_level: "debug".to_string(),
                ..ObservabilityConfig::default()
            },
        }
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind.
    pub host: IpAddr,
    /// Port to bind.
    pub port: u16,
}

impl ServerConfig {
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::from([0, 0, 0, 0]),
            port: 5000,
        }
    }
}

/// Blob storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Storage account connection string.
    #[serde(default)]
    pub connection_string: Option<String>,
    /// Container holding the model artifacts.
    #[serde(default)]
    pub container_name: Option<String>,
    /// Blob name of the serialized model.
    #[serde(default = "default_model_blob")]
    pub model_blob: String,
    /// Blob name of the feature-column list.
    #[serde(default = "default_columns_blob")]
    pub columns_blob: String,
    /// Serve artifacts from a local directory instead of remote storage.
    #[serde(default)]
    pub artifacts_dir: Option<PathBuf>,
    /// Connection timeout.
    #[serde(with = "humantime_serde", default = "default_connect_timeout")]
    pub connect_timeout: Duration,
    /// Request timeout.
    #[serde(with = "humantime_serde", default = "default_request_timeout")]
    pub request_timeout: Duration,
}

fn default_model_blob() -> String {
    DEFAULT_MODEL_BLOB.to_string()
}

fn default_columns_blob() -> String {
    DEFAULT_COLUMNS_BLOB.to_string()
}

fn default_connect_timeout() -> Duration {
    Duration::from_secs(5)
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            connection_string: None,
            container_name: None,
            model_blob: default_model_blob(),
            columns_blob: default_columns_blob(),
            artifacts_dir: None,
            connect_timeout: default_connect_timeout(),
            request_timeout: default_request_timeout(),
        }
    }
}

/// What to do when a submitted location has no feature column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum UnknownLocationPolicy {
    /// Predict with every location flag cleared and log a warning.
    #[default]
    Proceed,
    /// Answer with a validation error.
    Reject,
}

/// Model behaviour configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Load artifacts at startup instead of on the first request.
    #[serde(default = "default_preload")]
    pub preload: bool,
    /// Handling of locations missing from the feature columns.
    #[serde(default)]
    pub unknown_location: UnknownLocationPolicy,
}

fn default_preload() -> bool {
    true
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            preload: true,
            unknown_location: UnknownLocationPolicy::Proceed,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level.
    pub log_level: String,
    /// Enable JSON logging.
    pub json_logs: bool,
    /// Expose Prometheus metrics at `/metrics`.
    pub metrics_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: true,
        }
    }
}

/// Serde helper for Duration using humantime format.
pub mod humantime_serde {
    use serde::{self, Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("{}ms", duration.as_millis()))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_duration(&s).map_err(serde::de::Error::custom)
    }

    pub(crate) fn parse_duration(s: &str) -> Result<Duration, String> {
        let s = s.trim();
        if let Some(ms) = s.strip_suffix("ms") {
            ms.parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|e| e.to_string())
        } else if let Some(s_val) = s.strip_suffix('s') {
            s_val
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|e| e.to_string())
        } else if let Some(m) = s.strip_suffix('m') {
            let minutes = m.parse::<u64>().map_err(|e| e.to_string())?;
            minutes
                .checked_mul(60)
                .map(Duration::from_secs)
                .ok_or_else(|| format!("duration out of range: {}", s))
        } else {
            s.parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|e| e.to_string())
        }
    }
}
