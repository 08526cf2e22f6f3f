//! Blob service client.
//!
//! Downloads blobs over the storage REST API. A download first reads the
//! whole body in one call; when that fails for a transient reason, a single
//! fallback request reads the body incrementally. Nothing else is retried.

use super::connection::{Credential, StorageAccount};
use super::signature::{format_ms_date, CanonicalRequest, SharedKeySigner, STORAGE_API_VERSION};
use super::BlobSource;
use crate::error::{PriceError, Result};
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Default connection timeout for blob requests.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default request timeout for blob requests.
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for a storage account's blob service.
#[derive(Clone)]
pub struct AzureBlobClient {
    account: StorageAccount,
    signer: Option<SharedKeySigner>,
    client: Client,
}

impl AzureBlobClient {
    /// Create a client with default timeouts.
    pub fn new(account: StorageAccount) -> Result<Self> {
        Self::with_timeouts(account, DEFAULT_CONNECT_TIMEOUT, DEFAULT_REQUEST_TIMEOUT)
    }

    /// Create a client with custom timeouts.
    pub fn with_timeouts(
        account: StorageAccount,
        connect_timeout: Duration,
        request_timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(request_timeout)
            .build()
            .map_err(|e| PriceError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        let signer = match &account.credential {
            Credential::SharedKey { account_name, key } => {
                Some(SharedKeySigner::new(account_name.clone(), key.clone()))
            }
            Credential::Sas(_) => None,
        };

        Ok(Self {
            account,
            signer,
            client,
        })
    }

    /// Base URL of the blob service.
    pub fn endpoint(&self) -> &str {
        &self.account.blob_endpoint
    }

    /// Build an authorized GET request for a blob.
    fn request(&self, container: &str, blob: &str) -> Result<RequestBuilder> {
        let mut url = Url::parse(&self.account.blob_url(container, blob))
            .map_err(|e| PriceError::Config(format!("Invalid blob URL: {}", e)))?;

        if let Credential::Sas(token) = &self.account.credential {
            url.set_query(Some(token));
        }

        let date = format_ms_date(chrono::Utc::now());
        let mut builder = self
            .client
            .get(url.clone())
            .header("x-ms-date", &date)
            .header("x-ms-version", STORAGE_API_VERSION);

        if let Some(signer) = &self.signer {
            let canonical = CanonicalRequest::new("GET", url.path())
                .header("x-ms-date", date.as_str())
                .header("x-ms-version", STORAGE_API_VERSION);
            builder = builder.header("Authorization", signer.authorization(&canonical));
        }

        Ok(builder)
    }

    /// Send a request and map non-success statuses to errors.
    async fn send(&self, container: &str, blob: &str) -> Result<Response> {
        let response = self.request(container, blob)?.send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let detail = response
            .headers()
            .get("x-ms-error-code")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        Err(match status {
            StatusCode::NOT_FOUND => PriceError::BlobNotFound {
                container: container.to_string(),
                blob: blob.to_string(),
            },
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => PriceError::PermissionDenied(
                format!("{} for {}/{} {}", status, container, blob, detail)
                    .trim_end()
                    .to_string(),
            ),
            _ => PriceError::Network(
                format!("Blob service returned {} for {}/{} {}", status, container, blob, detail)
                    .trim_end()
                    .to_string(),
            ),
        })
    }

    /// Primary strategy: read the body in one call.
    async fn download_whole(&self, container: &str, blob: &str) -> Result<Vec<u8>> {
        let response = self.send(container, blob).await?;
        let bytes = response.bytes().await?;
        Ok(bytes.to_vec())
    }

    /// Fallback strategy: read the body chunk by chunk.
    async fn download_chunked(&self, container: &str, blob: &str) -> Result<Vec<u8>> {
        let mut response = self.send(container, blob).await?;
        let mut data = Vec::with_capacity(initial_capacity(response.content_length()));

        while let Some(chunk) = response.chunk().await? {
            data.extend_from_slice(&chunk);
        }

        Ok(data)
    }
}

/// Upper bound on buffer pre-allocation from an advertised length.
const MAX_PREALLOCATION: u64 = 8 << 20;

/// Buffer size to reserve before reading a body of the advertised length.
fn initial_capacity(content_length: Option<u64>) -> usize {
    content_length.map_or(0, |len| len.min(MAX_PREALLOCATION) as usize)
}

/// Whether the fallback strategy is worth attempting after this error.
fn fallback_applies(err: &PriceError) -> bool {
    !matches!(
        err,
        PriceError::BlobNotFound { .. } | PriceError::PermissionDenied(_) | PriceError::Config(_)
    )
}

#[async_trait::async_trait]
impl BlobSource for AzureBlobClient {
    async fn fetch(&self, container: &str, blob: &str) -> Result<Vec<u8>> {
        debug!(container = %container, blob = %blob, "Downloading blob");

        match self.download_whole(container, blob).await {
            Ok(data) => {
                info!(blob = %blob, bytes = data.len(), "Downloaded blob");
                return Ok(data);
            }
            Err(e) if fallback_applies(&e) => {
                warn!(blob = %blob, error = %e, "Whole-body download failed, trying chunked fallback");
            }
            Err(e) => {
                error!(blob = %blob, error = %e, "Failed to download blob");
                return Err(e);
            }
        }

        match self.download_chunked(container, blob).await {
            Ok(data) => {
                info!(blob = %blob, bytes = data.len(), "Downloaded blob with fallback");
                Ok(data)
            }
            Err(e) => {
                error!(blob = %blob, error = %e, "Chunked fallback also failed");
                Err(e)
            }
        }
    }

    fn describe(&self) -> String {
        format!("azure:{}", self.account.blob_endpoint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::connection::ConnectionString;

    fn client(raw: &str) -> AzureBlobClient {
        let account = ConnectionString::parse(raw).unwrap().into_account().unwrap();
        AzureBlobClient::new(account).unwrap()
    }

    #[test]
    fn test_shared_key_request_is_signed() {
        let client = client("AccountName=homes;AccountKey=c2VjcmV0");
        let request = client
            .request("models", "models/X_columns.json")
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(
            request.url().as_str(),
            "https://homes.blob.core.windows.net/models/models/X_columns.json"
        );
        let auth = request.headers().get("Authorization").unwrap().to_str().unwrap();
        assert!(auth.starts_with("SharedKey homes:"));
        assert_eq!(
            request.headers().get("x-ms-version").unwrap(),
            STORAGE_API_VERSION
        );
        assert!(request.headers().get("x-ms-date").is_some());
    }

    #[test]
    fn test_sas_request_carries_token() {
        let client = client(
            "BlobEndpoint=https://homes.blob.core.windows.net;SharedAccessSignature=sv=2022-11-02&sig=abc",
        );
        let request = client
            .request("models", "models/linear_model.json")
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(request.url().query(), Some("sv=2022-11-02&sig=abc"));
        assert!(request.headers().get("Authorization").is_none());
    }

    #[test]
    fn test_fallback_applies() {
        assert!(fallback_applies(&PriceError::Network("reset".into())));
        assert!(fallback_applies(&PriceError::Timeout("slow".into())));
        assert!(!fallback_applies(&PriceError::BlobNotFound {
            container: "c".into(),
            blob: "b".into()
        }));
        assert!(!fallback_applies(&PriceError::PermissionDenied("403".into())));
    }

    #[test]
    fn test_initial_capacity_is_capped() {
        assert_eq!(initial_capacity(None), 0);
        assert_eq!(initial_capacity(Some(1024)), 1024);
        assert_eq!(initial_capacity(Some(u64::MAX)), MAX_PREALLOCATION as usize);
    }

    #[test]
    fn test_describe() {
        let client = client("AccountName=homes;AccountKey=c2VjcmV0");
        assert_eq!(client.describe(), "azure:https://homes.blob.core.windows.net");
        assert_eq!(client.endpoint(), "https://homes.blob.core.windows.net");
    }
}
