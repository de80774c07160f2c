//! Image processing implementation
//!
//! Handles the pixel-level steps of the pipeline: base64 payload decoding,
//! image decoding, width-targeted resizing and encoding.

use base64::{engine::general_purpose::STANDARD, Engine};
use fast_image_resize::{FilterType, Image, PixelType, ResizeAlg, Resizer};
use image::io::Reader as ImageReader;
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;
use std::num::NonZeroU32;

use super::encoder::{EncodedImage, EncoderFactory, EncoderQuality, OutputFormat};
use super::error::ImageError;
use super::limits::DimensionLimits;

const DATA_URL_PREFIX: &str = "data:image/";

/// A decoded image together with the container format it was read from
pub struct DecodedImage {
    pub image: DynamicImage,
    pub format: ImageFormat,
}

impl DecodedImage {
    pub fn dimensions(&self) -> (u32, u32) {
        (self.image.width(), self.image.height())
    }

    /// MIME type of the source container
    pub fn content_type(&self) -> &'static str {
        match self.format {
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Png => "image/png",
            ImageFormat::WebP => "image/webp",
            ImageFormat::Gif => "image/gif",
            _ => "application/octet-stream",
        }
    }
}

/// Decode a base64 image payload, accepting an optional
/// `data:image/<type>;base64,` prefix.
pub fn decode_base64_payload(payload: &str) -> Result<Vec<u8>, ImageError> {
    let mut encoded = payload.trim();

    if encoded.starts_with(DATA_URL_PREFIX) {
        if let Some(comma) = encoded.find(',') {
            encoded = &encoded[comma + 1..];
        }
    }

    // Line-wrapped payloads (MIME style, 76 columns) carry CR/LF breaks
    let compact: String = encoded
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();

    if compact.is_empty() {
        return Err(ImageError::invalid_base64("payload is empty"));
    }

    STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| ImageError::invalid_base64(e.to_string()))
}

/// Decode image bytes, sniffing the container format from magic bytes
pub fn decode_image(data: &[u8]) -> Result<DecodedImage, ImageError> {
    let reader = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| ImageError::decode_failed(e.to_string()))?;

    let format = reader
        .format()
        .ok_or_else(|| ImageError::decode_failed("unrecognized image format"))?;

    let image = reader
        .decode()
        .map_err(|e| ImageError::decode_failed(e.to_string()))?;

    Ok(DecodedImage { image, format })
}

/// Decode image bytes after checking the header dimensions against `limits`.
///
/// The check runs before the pixel buffer is allocated, so a small file that
/// declares huge dimensions is rejected cheaply.
pub fn decode_image_within(
    data: &[u8],
    limits: &DimensionLimits,
) -> Result<DecodedImage, ImageError> {
    let (width, height) = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| ImageError::decode_failed(e.to_string()))?
        .into_dimensions()
        .map_err(|e| ImageError::decode_failed(e.to_string()))?;
    limits.check(width, height)?;

    decode_image(data)
}

/// Height that keeps the aspect ratio when scaling `src_width` to `target_width`
pub fn scaled_height(src_width: u32, src_height: u32, target_width: u32) -> u32 {
    if src_width == 0 {
        return 1;
    }
    let height = (src_height as f64 * target_width as f64 / src_width as f64).round() as u32;
    height.max(1)
}

/// Resize to a fixed width, deriving the height from the aspect ratio.
///
/// The target is checked against `limits` before it is allocated; a narrow,
/// tall source can otherwise scale to an enormous height.
pub fn resize_to_width(
    img: &DynamicImage,
    target_width: u32,
    limits: &DimensionLimits,
) -> Result<DynamicImage, ImageError> {
    let target_height = scaled_height(img.width(), img.height(), target_width);
    limits.check(target_width, target_height)?;
    resize_image(img, target_width, target_height)
}

/// Resize image using fast-image-resize with Lanczos3 filter
fn resize_image(
    img: &DynamicImage,
    target_w: u32,
    target_h: u32,
) -> Result<DynamicImage, ImageError> {
    let src_width =
        NonZeroU32::new(img.width()).ok_or_else(|| ImageError::resize_failed("Source width is 0"))?;
    let src_height = NonZeroU32::new(img.height())
        .ok_or_else(|| ImageError::resize_failed("Source height is 0"))?;
    let dst_width =
        NonZeroU32::new(target_w).ok_or_else(|| ImageError::resize_failed("Target width is 0"))?;
    let dst_height =
        NonZeroU32::new(target_h).ok_or_else(|| ImageError::resize_failed("Target height is 0"))?;

    let src_image = Image::from_vec_u8(
        src_width,
        src_height,
        img.to_rgba8().into_raw(),
        PixelType::U8x4,
    )
    .map_err(|e| ImageError::resize_failed(format!("Failed to create source image: {:?}", e)))?;

    let mut dst_image = Image::new(dst_width, dst_height, PixelType::U8x4);

    let mut resizer = Resizer::new(ResizeAlg::Convolution(FilterType::Lanczos3));

    resizer
        .resize(&src_image.view(), &mut dst_image.view_mut())
        .map_err(|e| ImageError::resize_failed(format!("Resize operation failed: {:?}", e)))?;

    let rgba_image = image::RgbaImage::from_raw(target_w, target_h, dst_image.into_vec())
        .ok_or_else(|| ImageError::resize_failed("Failed to create output image buffer"))?;

    Ok(DynamicImage::ImageRgba8(rgba_image))
}

/// Encode an image to the given output format
pub fn encode_image(
    img: &DynamicImage,
    format: OutputFormat,
    quality: EncoderQuality,
) -> Result<EncodedImage, ImageError> {
    let rgba = img.to_rgba8();
    EncoderFactory::create(format).encode(rgba.as_raw(), rgba.width(), rgba.height(), quality)
}
