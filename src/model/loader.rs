// Model artifact loading and caching

use super::columns::FeatureColumns;
use super::linear::{LinearModel, Regressor};
use crate::config::StorageConfig;
use crate::error::{PriceError, Result};
use crate::storage::BlobSource;
use chrono::{DateTime, Utc};
use metrics::{counter, gauge};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info};

/// Model and feature columns loaded together
pub struct ModelBundle {
    /// The fitted model
    pub model: Box<dyn Regressor>,
    /// Column layout the model was trained with
    pub columns: FeatureColumns,
    /// When the artifacts were loaded
    pub loaded_at: DateTime<Utc>,
}

impl ModelBundle {
    /// Pairs a model with its columns, checking the widths agree
    pub fn new(model: Box<dyn Regressor>, columns: FeatureColumns) -> Result<Self> {
        if model.n_features() != columns.len() {
            return Err(PriceError::ModelMismatch(format!(
                "model has {} coefficients but there are {} feature columns",
                model.n_features(),
                columns.len()
            )));
        }

        Ok(Self {
            model,
            columns,
            loaded_at: Utc::now(),
        })
    }
}

impl std::fmt::Debug for ModelBundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelBundle")
            .field("n_features", &self.model.n_features())
            .field("columns", &self.columns.len())
            .field("loaded_at", &self.loaded_at)
            .finish()
    }
}

/// Where the artifacts live
#[derive(Debug, Clone)]
pub struct ArtifactLocation {
    pub container: Option<String>,
    pub model_blob: String,
    pub columns_blob: String,
}

impl From<&StorageConfig> for ArtifactLocation {
    fn from(config: &StorageConfig) -> Self {
        Self {
            container: config.container_name.clone(),
            model_blob: config.model_blob.clone(),
            columns_blob: config.columns_blob.clone(),
        }
    }
}

/// Loads the model bundle once and hands out shared references
///
/// The cache is filled under a mutex, so concurrent first callers trigger a
/// single download. A failed load leaves the cache empty for the next caller.
pub struct ModelLoader {
    source: Result<Arc<dyn BlobSource>>,
    location: ArtifactLocation,
    cache: Mutex<Option<Arc<ModelBundle>>>,
}

impl ModelLoader {
    /// Creates a loader over a blob source
    pub fn new(source: Arc<dyn BlobSource>, location: ArtifactLocation) -> Self {
        Self::from_source(Ok(source), location)
    }

    /// Creates a loader whose source may have failed to build
    ///
    /// A source error is reported on every load attempt instead of at
    /// construction, so the server can start without storage settings.
    pub fn from_source(source: Result<Arc<dyn BlobSource>>, location: ArtifactLocation) -> Self {
        Self {
            source,
            location,
            cache: Mutex::new(None),
        }
    }

    /// Creates a loader from storage configuration
    pub fn from_config(config: &StorageConfig) -> Self {
        Self::from_source(crate::storage::from_config(config), ArtifactLocation::from(config))
    }

    /// Creates a loader that is already populated
    pub fn preloaded(bundle: ModelBundle) -> Self {
        Self {
            source: Err(PriceError::Config("no blob source for a preloaded model".into())),
            location: ArtifactLocation {
                container: None,
                model_blob: String::new(),
                columns_blob: String::new(),
            },
            cache: Mutex::new(Some(Arc::new(bundle))),
        }
    }

    /// Whether the bundle is cached
    pub async fn is_loaded(&self) -> bool {
        self.cache.lock().await.is_some()
    }

    /// Returns the cached bundle, loading it first if needed
    pub async fn load(&self) -> Result<Arc<ModelBundle>> {
        let mut cache = self.cache.lock().await;

        if let Some(bundle) = cache.as_ref() {
            debug!("Model and columns already cached");
            return Ok(Arc::clone(bundle));
        }

        info!("Loading model and feature columns");
        match self.fetch_bundle().await {
            Ok(bundle) => {
                let bundle = Arc::new(bundle);
                *cache = Some(Arc::clone(&bundle));
                counter!("homeprice_model_loads_total").increment(1);
                gauge!("homeprice_feature_columns").set(bundle.columns.len() as f64);
                Ok(bundle)
            }
            Err(e) => {
                error!(error = %e, "Failed to load model and columns");
                Err(e)
            }
        }
    }

    async fn fetch_bundle(&self) -> Result<ModelBundle> {
        let container = self
            .location
            .container
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| {
                PriceError::Config("CONTAINER_NAME not found in environment variables".into())
            })?;

        let source = match &self.source {
            Ok(source) => source,
            Err(e) => return Err(PriceError::Config(config_message(e))),
        };

        info!(container = %container, source = %source.describe(), "Fetching model artifacts");

        let model_bytes = source.fetch(container, &self.location.model_blob).await?;
        counter!("homeprice_blob_bytes_downloaded").increment(model_bytes.len() as u64);
        let model = LinearModel::from_json(&model_bytes)?;
        info!(coefficients = model.n_features(), "Model loaded");

        let column_bytes = source.fetch(container, &self.location.columns_blob).await?;
        counter!("homeprice_blob_bytes_downloaded").increment(column_bytes.len() as u64);
        let columns = FeatureColumns::from_json(&column_bytes)?;
        info!(columns = columns.len(), "Feature columns loaded");

        ModelBundle::new(Box::new(model), columns)
    }
}

/// Message of a source construction error, without double prefixes
fn config_message(e: &PriceError) -> String {
    match e {
        PriceError::Config(msg) => msg.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// In-memory source that counts downloads
    #[derive(Default)]
    struct CountingSource {
        blobs: HashMap<String, Vec<u8>>,
        fetches: AtomicUsize,
        delay: Duration,
    }

    impl CountingSource {
        fn with_artifacts(model: &str, columns: &str) -> Self {
            let mut blobs = HashMap::new();
            blobs.insert("models/linear_model.json".to_string(), model.as_bytes().to_vec());
            blobs.insert("models/X_columns.json".to_string(), columns.as_bytes().to_vec());
            Self {
                blobs,
                ..Self::default()
            }
        }
    }

    #[async_trait::async_trait]
    impl BlobSource for CountingSource {
        async fn fetch(&self, container: &str, blob: &str) -> Result<Vec<u8>> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.blobs.get(blob).cloned().ok_or_else(|| PriceError::BlobNotFound {
                container: container.to_string(),
                blob: blob.to_string(),
            })
        }

        fn describe(&self) -> String {
            "memory".to_string()
        }
    }

    fn location() -> ArtifactLocation {
        ArtifactLocation::from(&StorageConfig {
            container_name: Some("homes".into()),
            ..StorageConfig::default()
        })
    }

    const MODEL: &str = r#"{"coef": [1.0, 2.0, 3.0, 4.0], "intercept": 0.5}"#;
    const COLUMNS: &str = r#"["sqft", "bath", "bhk", "Hebbal"]"#;

    #[tokio::test]
    async fn test_load_caches_bundle() {
        let source = Arc::new(CountingSource::with_artifacts(MODEL, COLUMNS));
        let loader = ModelLoader::new(source.clone(), location());

        assert!(!loader.is_loaded().await);
        let first = loader.load().await.unwrap();
        let second = loader.load().await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert!(loader.is_loaded().await);
        assert_eq!(first.columns.len(), 4);
        assert_eq!(source.fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_concurrent_first_loads_download_once() {
        let source = Arc::new(CountingSource {
            delay: Duration::from_millis(20),
            ..CountingSource::with_artifacts(MODEL, COLUMNS)
        });
        let loader = Arc::new(ModelLoader::new(source.clone(), location()));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let loader = Arc::clone(&loader);
                tokio::spawn(async move { loader.load().await })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        // One fetch for the model, one for the columns.
        assert_eq!(source.fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_missing_connection_string_fails_before_network() {
        let loader = ModelLoader::from_config(&StorageConfig {
            container_name: Some("homes".into()),
            ..StorageConfig::default()
        });

        let err = loader.load().await.unwrap_err();
        assert!(matches!(err, PriceError::Config(ref m) if m.contains("CONNECTION_STRING")));
        assert!(!loader.is_loaded().await);
    }

    #[tokio::test]
    async fn test_missing_container_fails_before_fetch() {
        let source = Arc::new(CountingSource::with_artifacts(MODEL, COLUMNS));
        let loader = ModelLoader::new(source.clone(), ArtifactLocation::from(&StorageConfig::default()));

        let err = loader.load().await.unwrap_err();
        assert!(matches!(err, PriceError::Config(ref m) if m.contains("CONTAINER_NAME")));
        assert_eq!(source.fetches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failed_load_is_retried_on_next_call() {
        let source = Arc::new(CountingSource::with_artifacts(MODEL, "not json"));
        let loader = ModelLoader::new(source.clone(), location());

        assert!(matches!(loader.load().await, Err(PriceError::Deserialization(_))));
        assert!(loader.load().await.is_err());
        assert_eq!(source.fetches.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_width_mismatch_is_rejected() {
        let source = Arc::new(CountingSource::with_artifacts(
            r#"{"coef": [1.0, 2.0, 3.0], "intercept": 0.0}"#,
            COLUMNS,
        ));
        let loader = ModelLoader::new(source, location());
        assert!(matches!(loader.load().await, Err(PriceError::ModelMismatch(_))));
    }

    #[tokio::test]
    async fn test_missing_blob_surfaces() {
        let source = Arc::new(CountingSource::default());
        let loader = ModelLoader::new(source, location());
        assert!(matches!(loader.load().await, Err(PriceError::BlobNotFound { .. })));
    }

    #[tokio::test]
    async fn test_preloaded() {
        let columns = FeatureColumns::from_json(COLUMNS.as_bytes()).unwrap();
        let model = LinearModel::new(vec![1.0; 4], 0.0);
        let loader = ModelLoader::preloaded(ModelBundle::new(Box::new(model), columns).unwrap());
        assert!(loader.is_loaded().await);
        assert_eq!(loader.load().await.unwrap().columns.len(), 4);
    }
}
