// In-process stand-in for a storage account's blob service

use super::spawn_router;
use axum::{
    extract::{Request, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Router,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use homeprice::storage::signature::{CanonicalRequest, SharedKeySigner};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Account name the fake service answers for.
pub const ACCOUNT: &str = "homesacct";

/// Raw account key the fake service verifies signatures with.
pub const ACCOUNT_KEY: &[u8] = b"integration-test-account-key";

/// Blob service that checks SharedKey signatures and serves fixed blobs.
#[derive(Default)]
pub struct FakeBlobService {
    /// Blobs keyed by `{container}/{blob}`.
    blobs: HashMap<String, Vec<u8>>,
    /// Number of requests to fail with 503 before serving.
    failures: AtomicUsize,
    /// Total requests received.
    pub requests: AtomicUsize,
}

impl FakeBlobService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_blob(mut self, container: &str, blob: &str, data: &str) -> Self {
        self.blobs
            .insert(format!("{}/{}", container, blob), data.as_bytes().to_vec());
        self
    }

    /// Answer the next `count` requests with a server error.
    pub fn failing_first(self, count: usize) -> Self {
        self.failures.store(count, Ordering::SeqCst);
        self
    }

    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    /// Start serving and return the running service with its connection string.
    pub async fn start(self) -> (Arc<Self>, String) {
        let service = Arc::new(self);
        let router = Router::new()
            .fallback(serve_blob)
            .with_state(Arc::clone(&service));
        let addr = spawn_router(router).await;
        let connection_string = format!(
            "BlobEndpoint=http://{}/{};AccountName={};AccountKey={}",
            addr,
            ACCOUNT,
            ACCOUNT,
            STANDARD.encode(ACCOUNT_KEY)
        );
        (service, connection_string)
    }

    fn expected_authorization(req: &Request) -> Option<String> {
        let header = |name: &str| {
            req.headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        let canonical = CanonicalRequest::new(req.method().as_str(), req.uri().path())
            .header("x-ms-date", header("x-ms-date")?)
            .header("x-ms-version", header("x-ms-version")?);
        Some(SharedKeySigner::new(ACCOUNT, ACCOUNT_KEY.to_vec()).authorization(&canonical))
    }
}

async fn serve_blob(State(service): State<Arc<FakeBlobService>>, req: Request) -> Response {
    service.requests.fetch_add(1, Ordering::SeqCst);

    let presented = req
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    if presented.is_none() || presented != FakeBlobService::expected_authorization(&req) {
        return (
            StatusCode::FORBIDDEN,
            [("x-ms-error-code", "AuthenticationFailed")],
        )
            .into_response();
    }

    if service
        .failures
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok()
    {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            [("x-ms-error-code", "ServerBusy")],
        )
            .into_response();
    }

    let prefix = format!("/{}/", ACCOUNT);
    let key = req.uri().path().strip_prefix(&prefix).unwrap_or_default();
    match service.blobs.get(key) {
        Some(data) => (StatusCode::OK, data.clone()).into_response(),
        None => (StatusCode::NOT_FOUND, [("x-ms-error-code", "BlobNotFound")]).into_response(),
    }
}
