//! Command-line interface for homeprice.

use crate::config::{AppConfig, UnknownLocationPolicy};
use crate::error::{PriceError, Result};
use clap::Parser;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use tracing::debug;

/// House price estimate server.
#[derive(Debug, Parser)]
#[command(name = "homeprice")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path (JSON)
    #[arg(short, long, env = "HOMEPRICE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "HOMEPRICE_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Emit logs as JSON
    #[arg(long)]
    pub json_logs: bool,

    /// Interface to bind
    #[arg(long, env = "HOST")]
    pub host: Option<IpAddr>,

    /// Port to bind
    #[arg(short, long, env = "PORT")]
    pub port: Option<u16>,

    /// Storage account connection string
    #[arg(long, env = "CONNECTION_STRING", hide_env_values = true)]
    pub connection_string: Option<String>,

    /// Container holding the model artifacts
    #[arg(long, env = "CONTAINER_NAME")]
    pub container_name: Option<String>,

    /// Read artifacts from this directory instead of blob storage
    #[arg(long, env = "HOMEPRICE_ARTIFACTS_DIR")]
    pub artifacts_dir: Option<PathBuf>,

    /// Blob name of the model
    #[arg(long)]
    pub model_blob: Option<String>,

    /// Blob name of the feature columns
    #[arg(long)]
    pub columns_blob: Option<String>,

    /// Load the model on first request instead of at startup
    #[arg(long)]
    pub no_preload: bool,

    /// What to do with locations the model does not know
    #[arg(long, value_enum)]
    pub unknown_location: Option<UnknownLocationPolicy>,

    /// Disable the /metrics endpoint
    #[arg(long)]
    pub no_metrics: bool,
}

/// Load variables from a `.env` file in the working directory or a parent.
///
/// Variables already set in the environment keep their values. A missing
/// file is not an error.
pub fn load_env_file() -> Option<PathBuf> {
    dotenvy::dotenv().ok()
}

/// Load variables from a specific env file.
pub fn load_env_file_from(path: &Path) -> Result<()> {
    dotenvy::from_path(path).map_err(|e| {
        PriceError::Config(format!("Failed to load {}: {}", path.display(), e))
    })?;
    debug!(path = %path.display(), "Loaded env file");
    Ok(())
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Build the configuration: file (or defaults), then flags and environment.
    pub fn into_config(self) -> Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => AppConfig::from_file(path)?,
            None => AppConfig::default(),
        };

        if let Some(level) = self.log_level {
            config.observability.log_level = level;
        }
        if self.json_logs {
            config.observability.json_logs = true;
        }
        if self.no_metrics {
            config.observability.metrics_enabled = false;
        }
        if let Some(host) = self.host {
            config.server.host = host;
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(cs) = self.connection_string {
            config.storage.connection_string = Some(cs);
        }
        if let Some(container) = self.container_name {
            config.storage.container_name = Some(container);
        }
        if let Some(dir) = self.artifacts_dir {
            config.storage.artifacts_dir = Some(dir);
        }
        if let Some(blob) = self.model_blob {
            config.storage.model_blob = blob;
        }
        if let Some(blob) = self.columns_blob {
            config.storage.columns_blob = blob;
        }
        if self.no_preload {
            config.model.preload = false;
        }
        if let Some(policy) = self.unknown_location {
            config.model.unknown_location = policy;
        }

        config.validate()?;
        Ok(config)
    }
}
