//! Synchronous, CPU-bound pipeline stages.
//!
//! Every function takes encoded bytes and returns encoded bytes so it can run
//! on the blocking pool without borrowing from the request task. Sources are
//! checked against the dimension limits before their pixels are decoded.

use image::DynamicImage;
use std::sync::Arc;

use crate::imaging::{
    decode_image_within, encode_image, resize_to_width, DimensionLimits, EncodedImage,
    EncoderQuality, ImageError, OutputFormat,
};
use crate::watermark::{add_watermark, WatermarkSettings};

/// Re-encode an uploaded image as JPEG.
pub fn transcode_to_jpeg(
    data: &[u8],
    quality: EncoderQuality,
    limits: &DimensionLimits,
) -> Result<EncodedImage, ImageError> {
    let decoded = decode_image_within(data, limits)?;
    encode_image(&decoded.image, OutputFormat::Jpeg, quality)
}

/// Re-encode a watermark asset as PNG, keeping its alpha channel.
pub fn transcode_to_png(data: &[u8], limits: &DimensionLimits) -> Result<EncodedImage, ImageError> {
    let decoded = decode_image_within(data, limits)?;
    encode_image(&decoded.image, OutputFormat::Png, EncoderQuality::default())
}

/// Produce a JPEG of `target_width` pixels wide, aspect ratio preserved.
pub fn resize_variant(
    data: &[u8],
    target_width: u32,
    quality: EncoderQuality,
    limits: &DimensionLimits,
) -> Result<EncodedImage, ImageError> {
    let decoded = decode_image_within(data, limits)?;
    let resized = resize_to_width(&decoded.image, target_width, limits)?;
    encode_image(&resized, OutputFormat::Jpeg, quality)
}

/// Tile the watermark over the decoded base and encode the result as JPEG.
pub fn watermark_variant(
    data: &[u8],
    watermark: Arc<DynamicImage>,
    settings: WatermarkSettings,
    quality: EncoderQuality,
    limits: &DimensionLimits,
) -> Result<EncodedImage, ImageError> {
    let decoded = decode_image_within(data, limits)?;
    let composed = add_watermark(&decoded.image, &watermark, &settings, limits)?;
    encode_image(&DynamicImage::ImageRgba8(composed), OutputFormat::Jpeg, quality)
}
