//! Blob storage access for model artifacts.
//!
//! Artifacts are read through the [`BlobSource`] trait so the model loader
//! does not care whether they come from a remote storage account or a local
//! directory.

pub mod azure;
pub mod connection;
pub mod local;
pub mod signature;

pub use azure::AzureBlobClient;
pub use connection::{ConnectionString, StorageAccount};
pub use local::LocalDirSource;

use crate::config::StorageConfig;
use crate::error::{PriceError, Result};
use std::sync::Arc;

/// A source of named blobs grouped in containers.
#[async_trait::async_trait]
pub trait BlobSource: Send + Sync {
    /// Download the full contents of a blob.
    async fn fetch(&self, container: &str, blob: &str) -> Result<Vec<u8>>;

    /// Short name of the backend, for logs and health output.
    fn describe(&self) -> String;
}

/// Build the blob source selected by the configuration.
///
/// A local artifacts directory takes precedence over a connection string.
/// Without either, the configuration is incomplete.
pub fn from_config(config: &StorageConfig) -> Result<Arc<dyn BlobSource>> {
    if let Some(dir) = &config.artifacts_dir {
        return Ok(Arc::new(LocalDirSource::new(dir)));
    }

    let raw = config
        .connection_string
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| {
            PriceError::Config("CONNECTION_STRING not found in environment variables".into())
        })?;

    let account = ConnectionString::parse(raw)?.into_account()?;
    let client = AzureBlobClient::with_timeouts(
        account,
        config.connect_timeout,
        config.request_timeout,
    )?;
    Ok(Arc::new(client))
}
