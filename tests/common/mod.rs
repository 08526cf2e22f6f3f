//! Common test utilities for integration tests.

pub mod fake_blob;
pub mod fixtures;

use homeprice::web::{self, AppState};
use std::net::SocketAddr;
use tokio::net::TcpListener;

// Re-export common types
pub use fake_blob::*;
pub use fixtures::*;

/// Serve the application on an ephemeral port and return its base URL.
pub async fn spawn_app(state: AppState) -> String {
    let addr = spawn_router(web::router(state)).await;
    format!("http://{}", addr)
}

/// Serve any router on an ephemeral port.
pub async fn spawn_router(router: axum::Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

/// HTTP client for talking to test servers.
pub fn client() -> reqwest::Client {
    reqwest::Client::new()
}
