//! Observability module for homeprice.
//!
//! Provides logging and metrics.

use crate::config::ObservabilityConfig;
use crate::error::{PriceError, Result};
use metrics::counter;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize logging.
pub fn init(config: &ObservabilityConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if config.json_logs {
        subscriber
            .with(fmt::layer().json())
            .try_init()
            .map_err(|e| PriceError::Internal(format!("Failed to init logging: {}", e)))?;
    } else {
        subscriber
            .with(fmt::layer())
            .try_init()
            .map_err(|e| PriceError::Internal(format!("Failed to init logging: {}", e)))?;
    }

    info!("Observability initialized");
    Ok(())
}

/// Install the Prometheus recorder and return a handle for rendering.
///
/// Only one recorder can be installed per process; a second call logs a
/// warning and returns `None`.
pub fn install_metrics(config: &ObservabilityConfig) -> Option<PrometheusHandle> {
    if !config.metrics_enabled {
        return None;
    }

    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            register_metrics();
            Some(handle)
        }
        Err(e) => {
            warn!(error = %e, "Failed to install metrics recorder");
            None
        }
    }
}

/// Register standard metrics.
fn register_metrics() {
    counter!("homeprice_predictions_total").absolute(0);
    counter!("homeprice_model_loads_total").absolute(0);
    counter!("homeprice_blob_bytes_downloaded").absolute(0);
}

/// Record a request that ended in an error.
pub fn record_prediction_error(err: &PriceError) {
    counter!("homeprice_prediction_errors_total", "kind" => err.kind()).increment(1);
}

/// Record an HTTP request.
pub fn record_request(route: String, status: u16) {
    counter!(
        "homeprice_http_requests_total",
        "route" => route,
        "status" => status.to_string()
    )
    .increment(1);
}
