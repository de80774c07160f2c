// Shared fixtures for the unit test modules

use base64::{engine::general_purpose::STANDARD, Engine};
use bytes::Bytes;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;
use std::sync::Arc;

use imgvariant::config::ImagingConfig;
use imgvariant::metadata::MemoryMetadataStore;
use imgvariant::pipeline::ImagePipeline;
use imgvariant::storage::{ArtifactStore, MemoryArtifactStore};

pub const WATERMARK_ASSET_KEY: &str = "assets/Icares_Logo.png";

/// Encode a solid-color image as PNG
pub fn png_bytes(width: u32, height: u32, pixel: Rgba<u8>) -> Vec<u8> {
    let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, pixel));
    let mut buffer = Cursor::new(Vec::new());
    img.write_to(&mut buffer, ImageFormat::Png).unwrap();
    buffer.into_inner()
}

/// A black image as a base64 upload payload
pub fn black_upload(width: u32, height: u32) -> String {
    STANDARD.encode(png_bytes(width, height, Rgba([0, 0, 0, 255])))
}

pub struct Harness {
    pub pipeline: Arc<ImagePipeline>,
    pub artifacts: Arc<MemoryArtifactStore>,
    pub metadata: Arc<MemoryMetadataStore>,
}

/// Pipeline on in-memory stores without any watermark asset
pub fn bare_harness() -> Harness {
    let artifacts = Arc::new(MemoryArtifactStore::new());
    let metadata = Arc::new(MemoryMetadataStore::new());
    let pipeline = ImagePipeline::new(
        artifacts.clone(),
        metadata.clone(),
        &ImagingConfig::default(),
    )
    .unwrap();

    Harness {
        pipeline: Arc::new(pipeline),
        artifacts,
        metadata,
    }
}

/// Pipeline on in-memory stores with a white 200x100 watermark provisioned
pub async fn harness() -> Harness {
    let harness = bare_harness();
    harness
        .artifacts
        .put(
            WATERMARK_ASSET_KEY,
            Bytes::from(png_bytes(200, 100, Rgba([255, 255, 255, 255]))),
            "image/png",
        )
        .await
        .unwrap();
    harness
}
