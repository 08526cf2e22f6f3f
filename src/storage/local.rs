//! Directory-backed blob source for offline development.

use super::BlobSource;
use crate::error::{PriceError, Result};
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Serves `{root}/{container}/{blob}` from the local file system.
#[derive(Debug, Clone)]
pub struct LocalDirSource {
    root: PathBuf,
}

impl LocalDirSource {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Resolve a blob to a path under the root.
    fn resolve(&self, container: &str, blob: &str) -> Result<PathBuf> {
        let relative = Path::new(container).join(blob);
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(PriceError::Config(format!(
                "Blob path escapes the artifacts directory: {}/{}",
                container, blob
            )));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait::async_trait]
impl BlobSource for LocalDirSource {
    async fn fetch(&self, container: &str, blob: &str) -> Result<Vec<u8>> {
        let path = self.resolve(container, blob)?;
        debug!(path = %path.display(), "Reading local blob");

        match tokio::fs::read(&path).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(PriceError::BlobNotFound {
                container: container.to_string(),
                blob: blob.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    fn describe(&self) -> String {
        format!("local:{}", self.root.display())
    }
}
