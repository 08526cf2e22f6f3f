//! HTTP front-end: the form, the prediction endpoint and health.

pub mod handlers;
pub mod templates;

use crate::config::AppConfig;
use crate::health::HealthChecker;
use crate::model::ModelLoader;
use crate::observability::record_request;
use crate::predict::Predictor;
use axum::{
    extract::{MatchedPath, Request},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// Shared state for request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Lazily populated model cache.
    pub loader: Arc<ModelLoader>,
    /// Feature encoding and prediction.
    pub predictor: Predictor,
    /// Health reporting.
    pub health: Arc<HealthChecker>,
    /// Prometheus renderer, when metrics are enabled.
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Create state around a loader.
    pub fn new(loader: Arc<ModelLoader>, predictor: Predictor) -> Self {
        Self {
            loader,
            predictor,
            health: Arc::new(HealthChecker::new(env!("CARGO_PKG_VERSION"))),
            metrics: None,
        }
    }

    /// Create state from configuration.
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            Arc::new(ModelLoader::from_config(&config.storage)),
            Predictor::new(config.model.unknown_location),
        )
    }

    /// Attach a metrics renderer.
    pub fn with_metrics(mut self, handle: Option<PrometheusHandle>) -> Self {
        self.metrics = handle;
        self
    }
}

/// Log and count every request.
async fn request_metrics_middleware(req: Request, next: Next) -> Response {
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());
    let method = req.method().clone();
    let start = Instant::now();

    let response = next.run(req).await;

    let status = response.status().as_u16();
    debug!(
        method = %method,
        route = %route,
        status,
        latency_ms = start.elapsed().as_millis() as u64,
        "Request handled"
    );
    record_request(route, status);
    response
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/submit", post(handlers::submit))
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        .fallback(handlers::not_found)
        .layer(middleware::from_fn(request_metrics_middleware))
        .with_state(state)
}
