//! Imaging error types
//!
//! Covers the failures of the decode → transform → encode chain. The
//! service layer lifts these into `ServiceError` for HTTP status mapping.

use std::fmt;

/// Errors that can occur while decoding, resizing or encoding an image
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageError {
    // === Decoding Errors ===
    /// Base64 payload could not be decoded
    InvalidBase64 { message: String },
    /// Image bytes could not be decoded (malformed or unsupported format)
    DecodeFailed { message: String },

    // === Limit Errors ===
    /// Source or target dimensions exceed the configured limits
    DimensionsExceeded {
        width: u32,
        height: u32,
        max_width: u32,
        max_height: u32,
        max_pixels: u64,
    },

    // === Processing Errors ===
    /// Resize operation failed
    ResizeFailed { message: String },
    /// Encoding to output format failed
    EncodeFailed { format: String, message: String },
}

impl fmt::Display for ImageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageError::InvalidBase64 { message } => {
                write!(f, "Unable to decode Base64 string: {}", message)
            }
            ImageError::DecodeFailed { message } => {
                write!(f, "Invalid image format: {}", message)
            }
            ImageError::DimensionsExceeded {
                width,
                height,
                max_width,
                max_height,
                max_pixels,
            } => {
                write!(
                    f,
                    "Image dimensions {}x{} exceed limits (max {}x{}, {} pixels)",
                    width, height, max_width, max_height, max_pixels
                )
            }
            ImageError::ResizeFailed { message } => {
                write!(f, "Resize failed: {}", message)
            }
            ImageError::EncodeFailed { format, message } => {
                write!(f, "Failed to encode to {}: {}", format, message)
            }
        }
    }
}

impl std::error::Error for ImageError {}

impl ImageError {
    pub fn invalid_base64(message: impl Into<String>) -> Self {
        ImageError::InvalidBase64 {
            message: message.into(),
        }
    }

    pub fn decode_failed(message: impl Into<String>) -> Self {
        ImageError::DecodeFailed {
            message: message.into(),
        }
    }

    pub fn resize_failed(message: impl Into<String>) -> Self {
        ImageError::ResizeFailed {
            message: message.into(),
        }
    }

    pub fn encode_failed(format: impl Into<String>, message: impl Into<String>) -> Self {
        ImageError::EncodeFailed {
            format: format.into(),
            message: message.into(),
        }
    }

    /// True when the image is too large to accept
    pub fn is_too_large(&self) -> bool {
        matches!(self, ImageError::DimensionsExceeded { .. })
    }

    /// True for errors caused by the input bytes rather than by processing
    pub fn is_decode(&self) -> bool {
        matches!(
            self,
            ImageError::InvalidBase64 { .. } | ImageError::DecodeFailed { .. }
        )
    }
}
