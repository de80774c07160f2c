//! Imaging module
//!
//! Decoding, aspect-preserving resizing and encoding of images:
//! - Base64 payload decoding with optional `data:image/...,` prefix
//! - Format sniffing on decode (JPEG, PNG, WebP, GIF)
//! - Lanczos3 resize to a fixed target width
//! - Dimension limits checked before any large buffer is allocated
//! - JPEG output for variants, PNG output for watermark assets

pub mod encoder;
pub mod error;
pub mod limits;
pub mod processor;
pub mod size;

pub use encoder::{EncodedImage, EncoderFactory, EncoderQuality, ImageEncoder, OutputFormat};
pub use error::ImageError;
pub use limits::DimensionLimits;
pub use processor::{
    decode_base64_payload, decode_image, decode_image_within, encode_image, resize_to_width,
    scaled_height, DecodedImage,
};
pub use size::{SizeLabel, TargetWidths};
