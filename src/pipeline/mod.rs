//! Image variant pipeline.
//!
//! Orchestrates each operation end to end: fetch source bytes, decode,
//! transform, encode, write the artifact, then write its lineage record. The
//! artifact is always written before the record that points at it.

use bytes::Bytes;
use chrono::{DateTime, FixedOffset, Utc};
use std::sync::Arc;

pub mod transform;

use crate::config::ImagingConfig;
use crate::error::ServiceError;
use crate::imaging::{
    decode_base64_payload, DimensionLimits, EncodedImage, EncoderQuality, ImageError, SizeLabel,
    TargetWidths,
};
use crate::lineage::{LineageRecord, RecordKey};
use crate::metadata::MetadataStore;
use crate::storage::{ArtifactStore, StoredObject};
use crate::watermark::{WatermarkAssets, WatermarkSettings};

pub const UPLOAD_DESCRIPTION: &str = "Image uploaded successfully!";
pub const WATERMARK_DESCRIPTION: &str = "Watermarked image";
pub const ASSET_DESCRIPTION: &str = "Watermark asset";

/// Imaging parameters resolved from configuration
#[derive(Debug, Clone, Copy)]
pub struct PipelineSettings {
    pub quality: EncoderQuality,
    pub widths: TargetWidths,
    pub watermark: WatermarkSettings,
    pub limits: DimensionLimits,
    pub id_offset: FixedOffset,
}

impl PipelineSettings {
    pub fn from_config(config: &ImagingConfig) -> Result<Self, String> {
        let id_offset = FixedOffset::east_opt(config.id_utc_offset_hours * 3600).ok_or_else(|| {
            format!(
                "Invalid UTC offset for image ids: {} hours",
                config.id_utc_offset_hours
            )
        })?;

        Ok(Self {
            quality: config.encoder_quality(),
            widths: config.target_widths,
            watermark: config.watermark_settings(),
            limits: config.limits,
            id_offset,
        })
    }
}

/// Format an image id (`image_YYYYMMDD_HHMMSS`) in the given offset.
pub fn image_id_at(now: DateTime<Utc>, offset: FixedOffset) -> String {
    format!(
        "image_{}",
        now.with_timezone(&offset).format("%Y%m%d_%H%M%S")
    )
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOutcome {
    pub image_id: String,
    pub path: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantOutcome {
    pub image_id: String,
    pub size: SizeLabel,
    pub path: String,
    pub status: String,
}

/// Result of the watermark operation with resize fallback
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatermarkOutcome {
    pub variant: VariantOutcome,
    /// True when the resized variant had to be produced first
    pub resized_first: bool,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetOutcome {
    pub name: String,
    pub path: String,
    pub status: String,
}

/// Runs image operations against the artifact and metadata stores.
#[derive(Clone)]
pub struct ImagePipeline {
    artifacts: Arc<dyn ArtifactStore>,
    metadata: Arc<dyn MetadataStore>,
    assets: WatermarkAssets,
    settings: PipelineSettings,
}

impl std::fmt::Debug for ImagePipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImagePipeline")
            .field("artifacts", &self.artifacts.backend_name())
            .field("metadata", &self.metadata.backend_name())
            .field("assets", &self.assets)
            .field("settings", &self.settings)
            .finish()
    }
}

/// Run a CPU-bound stage on the blocking thread pool.
async fn run_blocking<T, F>(stage: F) -> Result<T, ServiceError>
where
    F: FnOnce() -> Result<T, ImageError> + Send + 'static,
    T: Send + 'static,
{
    Ok(tokio::task::spawn_blocking(stage).await??)
}

fn require_image_id(image_id: &str) -> Result<(), ServiceError> {
    if image_id.trim().is_empty() {
        return Err(ServiceError::validation("imageID is required"));
    }
    Ok(())
}

impl ImagePipeline {
    pub fn new(
        artifacts: Arc<dyn ArtifactStore>,
        metadata: Arc<dyn MetadataStore>,
        config: &ImagingConfig,
    ) -> Result<Self, String> {
        let settings = PipelineSettings::from_config(config)?;
        let assets = WatermarkAssets::new(artifacts.clone(), config);
        Ok(Self {
            artifacts,
            metadata,
            assets,
            settings,
        })
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    pub fn assets(&self) -> &WatermarkAssets {
        &self.assets
    }

    /// Id for an upload happening now
    pub fn new_image_id(&self) -> String {
        image_id_at(Utc::now(), self.settings.id_offset)
    }

    /// Write the artifact, then the record pointing at it.
    async fn store(
        &self,
        key: &RecordKey,
        encoded: EncodedImage,
        description: String,
    ) -> Result<String, ServiceError> {
        let path = self
            .artifacts
            .put(
                &key.artifact_key(),
                Bytes::from(encoded.data),
                encoded.content_type,
            )
            .await?;

        let record = LineageRecord::new(key, description, path.clone());
        self.metadata.set(&key.document_path(), &record).await?;
        Ok(path)
    }

    /// Read the artifact a record points at.
    async fn fetch_recorded(&self, key: &RecordKey) -> Result<StoredObject, ServiceError> {
        let record = self.metadata.get(&key.document_path()).await?;
        Ok(self.artifacts.get(&record.path).await?)
    }

    /// Read the artifact `key` is derived from.
    ///
    /// A missing parent record fails with `NotFound`, so nothing is derived
    /// from an image that was never stored.
    async fn fetch_source(&self, key: &RecordKey) -> Result<StoredObject, ServiceError> {
        let parent = key.parent().ok_or_else(|| {
            ServiceError::validation(format!("{} is not derived from another record", key))
        })?;
        self.fetch_recorded(&parent).await
    }

    /// Store a base64 upload as a new original image.
    pub async fn upload(&self, base64_image: &str) -> Result<UploadOutcome, ServiceError> {
        let image_id = self.new_image_id();
        self.upload_as(&image_id, base64_image).await
    }

    /// Store a base64 upload under an explicit id.
    pub async fn upload_as(
        &self,
        image_id: &str,
        base64_image: &str,
    ) -> Result<UploadOutcome, ServiceError> {
        require_image_id(image_id)?;
        let raw = decode_base64_payload(base64_image)?;
        let quality = self.settings.quality;
        let limits = self.settings.limits;
        let encoded =
            run_blocking(move || transform::transcode_to_jpeg(&raw, quality, &limits)).await?;

        let key = RecordKey::original(image_id);
        let path = self
            .store(&key, encoded, UPLOAD_DESCRIPTION.to_string())
            .await?;

        tracing::info!(image_id, path = %path, "image uploaded");
        Ok(UploadOutcome {
            image_id: image_id.to_string(),
            path,
            status: format!("{} uploaded successfully", image_id),
        })
    }

    /// Produce the resized variant of an uploaded image.
    ///
    /// Re-running overwrites the previous variant.
    pub async fn resize(
        &self,
        image_id: &str,
        size: SizeLabel,
    ) -> Result<VariantOutcome, ServiceError> {
        require_image_id(image_id)?;
        let key = RecordKey::resized(image_id, size);
        let source = self.fetch_source(&key).await?;

        let width = size.width(&self.settings.widths);
        let quality = self.settings.quality;
        let limits = self.settings.limits;
        let data = source.data;
        let encoded = run_blocking(move || {
            transform::resize_variant(&data, width, quality, &limits)
        })
        .await?;

        let path = self
            .store(&key, encoded, format!("Image resized to {}", size))
            .await?;

        tracing::info!(image_id, size = %size, width, path = %path, "image resized");
        Ok(VariantOutcome {
            image_id: image_id.to_string(),
            size,
            path,
            status: format!("{} resized to {} successfully", image_id, size),
        })
    }

    /// Watermark an existing resized variant.
    pub async fn watermark(
        &self,
        image_id: &str,
        size: SizeLabel,
    ) -> Result<VariantOutcome, ServiceError> {
        require_image_id(image_id)?;
        let key = RecordKey::watermarked(image_id, size);
        let source = self.fetch_source(&key).await?;
        let mark = self.assets.load_default().await?;

        let settings = self.settings.watermark;
        let quality = self.settings.quality;
        let limits = self.settings.limits;
        let data = source.data;
        let encoded = run_blocking(move || {
            transform::watermark_variant(&data, mark, settings, quality, &limits)
        })
        .await?;

        let path = self
            .store(&key, encoded, WATERMARK_DESCRIPTION.to_string())
            .await?;

        tracing::info!(image_id, size = %size, path = %path, "image watermarked");
        Ok(VariantOutcome {
            image_id: image_id.to_string(),
            size,
            path,
            status: format!("{}_watermarked_{}.jpg saved successfully", size, image_id),
        })
    }

    /// Watermark, producing the resized variant first when it is missing.
    ///
    /// The fallback runs resize then watermark exactly once; a failure in
    /// either names the step that failed.
    pub async fn ensure_watermarked(
        &self,
        image_id: &str,
        size: SizeLabel,
    ) -> Result<WatermarkOutcome, ServiceError> {
        require_image_id(image_id)?;
        let resized_key = RecordKey::resized(image_id, size);

        if self.metadata.exists(&resized_key.document_path()).await? {
            match self.watermark(image_id, size).await {
                Ok(variant) => {
                    let status = variant.status.clone();
                    return Ok(WatermarkOutcome {
                        variant,
                        resized_first: false,
                        status,
                    });
                }
                Err(e) if e.is_not_found() => {
                    tracing::warn!(
                        image_id,
                        size = %size,
                        error = %e,
                        "watermark failed on missing input, resizing first"
                    );
                }
                Err(e) => return Err(e.with_step("watermark")),
            }
        } else {
            tracing::warn!(
                image_id,
                size = %size,
                "resized variant missing, resizing before watermark"
            );
        }

        self.resize(image_id, size)
            .await
            .map_err(|e| e.with_step("resize"))?;
        let variant = self
            .watermark(image_id, size)
            .await
            .map_err(|e| e.with_step("watermark"))?;

        Ok(WatermarkOutcome {
            variant,
            resized_first: true,
            status: format!(
                "{} resized to {} and watermarked successfully after watermarking failed",
                image_id, size
            ),
        })
    }

    /// Bytes and content type of a resized variant
    pub async fn fetch_variant(
        &self,
        image_id: &str,
        size: SizeLabel,
    ) -> Result<StoredObject, ServiceError> {
        require_image_id(image_id)?;
        self.fetch_recorded(&RecordKey::resized(image_id, size))
            .await
    }

    /// Bytes and content type of a watermarked variant
    pub async fn fetch_watermarked(
        &self,
        image_id: &str,
        size: SizeLabel,
    ) -> Result<StoredObject, ServiceError> {
        require_image_id(image_id)?;
        self.fetch_recorded(&RecordKey::watermarked(image_id, size))
            .await
    }

    /// Provision (or replace) a named watermark asset.
    pub async fn upload_watermark(
        &self,
        name: &str,
        base64_image: &str,
    ) -> Result<AssetOutcome, ServiceError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ServiceError::validation("Image name is required"));
        }
        if name.contains('/') || name.contains("..") {
            return Err(ServiceError::validation(format!(
                "Invalid image name '{}'",
                name
            )));
        }

        let raw = decode_base64_payload(base64_image)?;
        let limits = self.settings.limits;
        let encoded = run_blocking(move || transform::transcode_to_png(&raw, &limits)).await?;

        let key = RecordKey::asset(name);
        let path = self
            .store(&key, encoded, ASSET_DESCRIPTION.to_string())
            .await?;
        self.assets.invalidate(name).await;

        tracing::info!(asset = name, path = %path, "watermark asset uploaded");
        Ok(AssetOutcome {
            name: name.to_string(),
            path,
            status: format!("Watermark image {} uploaded successfully", name),
        })
    }
}
