//! homeprice - House price estimates from a linear model kept in blob storage.
//!
//! A small web front-end: a form collects location, floor area, bathrooms
//! and bedrooms, and the service answers with the estimate of a pre-trained
//! linear regression model.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  HTTP: GET /  |  POST /submit  |  GET /health  | /metrics │
//! ├──────────────────────────────────────────────────────────┤
//! │  Predictor: validation → feature vector → model.predict  │
//! ├──────────────────────────────────────────────────────────┤
//! │  ModelLoader: one guarded download, cached for process   │
//! ├──────────────────────────────────────────────────────────┤
//! │  BlobSource: storage account (SharedKey / SAS) | local   │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```no_run
//! use homeprice::config::AppConfig;
//!
//! #[tokio::main]
//! async fn main() -> homeprice::Result<()> {
//!     // Serve artifacts from ./artifacts/local/models/...
//!     let config = AppConfig::development("./artifacts");
//!     homeprice::run(config).await
//! }
//! ```

pub mod config;
pub mod error;

pub mod cli;
pub mod health;
pub mod model;
pub mod observability;
pub mod predict;
pub mod shutdown;
pub mod storage;
pub mod web;

// Re-exports
pub use error::{PriceError, Result};

use config::AppConfig;
use shutdown::{ShutdownCoordinator, SignalHandler};
use tokio::net::TcpListener;
use tracing::{info, warn};
use web::AppState;

/// Run the server with the given configuration until a shutdown signal.
pub async fn run(config: AppConfig) -> Result<()> {
    observability::init(&config.observability)?;

    let metrics = observability::install_metrics(&config.observability);
    let state = AppState::from_config(&config).with_metrics(metrics);

    if config.model.preload {
        match state.loader.load().await {
            Ok(bundle) => info!(columns = bundle.columns.len(), "Model pre-loaded successfully"),
            Err(e) => warn!(error = %e, "Could not pre-load model"),
        }
    }

    let coordinator = ShutdownCoordinator::new();
    let signal_coordinator = coordinator.clone();
    tokio::spawn(async move {
        SignalHandler::new(signal_coordinator).run().await;
    });

    let listener = TcpListener::bind(config.server.bind_addr()).await?;
    serve(listener, state, coordinator).await
}

/// Serve the application on a bound listener until shutdown is triggered.
pub async fn serve(
    listener: TcpListener,
    state: AppState,
    coordinator: ShutdownCoordinator,
) -> Result<()> {
    let addr = listener.local_addr()?;
    info!(addr = %addr, "Starting server");

    axum::serve(listener, web::router(state))
        .with_graceful_shutdown(async move { coordinator.wait_for_shutdown().await })
        .await
        .map_err(|e| PriceError::Network(e.to_string()))?;

    info!("Server shutdown complete");
    Ok(())
}
