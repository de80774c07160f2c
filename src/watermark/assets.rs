//! Watermark asset registry.
//!
//! Watermark images are stored in the artifact store under `assets/<name>`
//! and kept decoded in a small in-memory cache. When the configured asset has
//! never been provisioned and a seed file is configured, the seed is stored on
//! first use.
//!
//! Cache entries are keyed by `(name, generation)`. Replacing an asset bumps
//! its generation, so a decode that started before the replacement can only
//! populate an entry no later load will read.

use bytes::Bytes;
use image::DynamicImage;
use moka::future::Cache;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::ImagingConfig;
use crate::error::ServiceError;
use crate::imaging::{decode_image_within, DimensionLimits};
use crate::lineage::RecordKey;
use crate::storage::{ArtifactStore, StorageError};

type CacheKey = (String, u64);

/// Loads and caches decoded watermark assets by name.
#[derive(Clone)]
pub struct WatermarkAssets {
    artifacts: Arc<dyn ArtifactStore>,
    cache: Cache<CacheKey, Arc<DynamicImage>>,
    generations: Arc<Mutex<HashMap<String, u64>>>,
    default_name: String,
    seed_path: Option<PathBuf>,
    limits: DimensionLimits,
}

impl std::fmt::Debug for WatermarkAssets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatermarkAssets")
            .field("default_name", &self.default_name)
            .field("seed_path", &self.seed_path)
            .field("cached", &self.cache.entry_count())
            .finish()
    }
}

impl WatermarkAssets {
    pub fn new(artifacts: Arc<dyn ArtifactStore>, config: &ImagingConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.watermark_cache_entries)
            .build();

        Self {
            artifacts,
            cache,
            generations: Arc::new(Mutex::new(HashMap::new())),
            default_name: config.watermark_asset_name.clone(),
            seed_path: config.watermark_seed_path.as_ref().map(PathBuf::from),
            limits: config.limits,
        }
    }

    /// Load the configured watermark asset.
    pub async fn load_default(&self) -> Result<Arc<DynamicImage>, ServiceError> {
        let name = self.default_name.clone();
        self.load(&name).await
    }

    /// Load an asset by name, decoding it on first use.
    ///
    /// Concurrent misses for the same asset share one fetch and decode.
    pub async fn load(&self, name: &str) -> Result<Arc<DynamicImage>, ServiceError> {
        let key = (name.to_string(), self.generation(name));
        self.cache
            .try_get_with(key, self.fetch(name))
            .await
            .map_err(|e| e.as_ref().clone())
    }

    /// Retire the cached copy so the next load reads the store again.
    pub async fn invalidate(&self, name: &str) {
        let retired = {
            let mut generations = self.generations.lock();
            let generation = generations.entry(name.to_string()).or_insert(0);
            let retired = *generation;
            *generation += 1;
            retired
        };
        self.cache.invalidate(&(name.to_string(), retired)).await;
    }

    fn generation(&self, name: &str) -> u64 {
        self.generations.lock().get(name).copied().unwrap_or(0)
    }

    /// Read and decode an asset from the store, seeding it when allowed.
    async fn fetch(&self, name: &str) -> Result<Arc<DynamicImage>, ServiceError> {
        let key = RecordKey::asset(name).artifact_key();
        let data = match self.artifacts.get(&key).await {
            Ok(object) => object.data,
            Err(StorageError::NotFound { .. }) => self.seed(name, &key).await?,
            Err(e) => return Err(e.into()),
        };

        let limits = self.limits;
        let image =
            tokio::task::spawn_blocking(move || decode_image_within(&data, &limits)).await??;
        let image = Arc::new(image.image);

        tracing::debug!(
            asset = name,
            width = image.width(),
            height = image.height(),
            "watermark asset decoded"
        );
        Ok(image)
    }

    /// Store the seed file as the asset, if this asset can be seeded.
    async fn seed(&self, name: &str, key: &str) -> Result<Bytes, ServiceError> {
        let seed_path = match &self.seed_path {
            Some(path) if name == self.default_name => path,
            _ => {
                return Err(ServiceError::not_found(format!(
                    "watermark asset '{}' has not been provisioned",
                    name
                )))
            }
        };

        let raw = tokio::fs::read(seed_path).await.map_err(|e| {
            ServiceError::not_found(format!(
                "watermark asset '{}' has not been provisioned and seed file {} is unreadable: {}",
                name,
                seed_path.display(),
                e
            ))
        })?;
        let data = Bytes::from(raw);

        let payload = data.clone();
        let limits = self.limits;
        let decoded =
            tokio::task::spawn_blocking(move || decode_image_within(&payload, &limits)).await??;
        let content_type = decoded.content_type();

        self.artifacts.put(key, data.clone(), content_type).await?;
        tracing::info!(
            asset = name,
            seed = %seed_path.display(),
            "watermark asset seeded from local file"
        );

        Ok(data)
    }
}
