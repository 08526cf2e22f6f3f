//! Health reporting for the estimate service.
//!
//! The health probe attempts a model load, so a healthy answer means the
//! artifacts are reachable and decodable, not merely that the process is up.

use crate::model::ModelLoader;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::warn;

/// Overall health status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Model loaded and ready to predict.
    Healthy,
    /// Model could not be loaded.
    Unhealthy,
}

impl HealthStatus {
    /// Convert to HTTP status code.
    pub fn to_status_code(&self) -> u16 {
        match self {
            HealthStatus::Healthy => 200,
            HealthStatus::Unhealthy => 500,
        }
    }
}

/// Body of the `/health` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall status.
    pub status: HealthStatus,
    /// Whether the model bundle is cached.
    pub model_loaded: bool,
    /// Number of feature columns in the cached bundle.
    pub columns_count: usize,
    /// Load error, when unhealthy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// When the bundle was loaded (RFC 3339).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loaded_at: Option<String>,
    /// Service version.
    pub version: String,
    /// Uptime in seconds.
    pub uptime_seconds: u64,
}

/// Produces health responses for a model loader.
pub struct HealthChecker {
    version: String,
    start_time: Instant,
}

impl HealthChecker {
    /// Create a new health checker.
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            start_time: Instant::now(),
        }
    }

    /// Load the model if needed and report the result.
    pub async fn check(&self, loader: &ModelLoader) -> HealthResponse {
        let uptime_seconds = self.start_time.elapsed().as_secs();

        match loader.load().await {
            Ok(bundle) => HealthResponse {
                status: HealthStatus::Healthy,
                model_loaded: true,
                columns_count: bundle.columns.len(),
                error: None,
                loaded_at: Some(bundle.loaded_at.to_rfc3339()),
                version: self.version.clone(),
                uptime_seconds,
            },
            Err(e) => {
                warn!(error = %e, "Health check failed");
                HealthResponse {
                    status: HealthStatus::Unhealthy,
                    model_loaded: false,
                    columns_count: 0,
                    error: Some(e.to_string()),
                    loaded_at: None,
                    version: self.version.clone(),
                    uptime_seconds,
                }
            }
        }
    }
}
