//! Image bomb protection
//!
//! Decoded sources and resize targets are checked against configured
//! dimension limits before any pixel buffer is allocated for them.

use serde::{Deserialize, Serialize};

use super::error::ImageError;
use crate::constants::{DEFAULT_MAX_IMAGE_HEIGHT, DEFAULT_MAX_IMAGE_PIXELS, DEFAULT_MAX_IMAGE_WIDTH};

fn default_max_width() -> u32 {
    DEFAULT_MAX_IMAGE_WIDTH
}

fn default_max_height() -> u32 {
    DEFAULT_MAX_IMAGE_HEIGHT
}

fn default_max_pixels() -> u64 {
    DEFAULT_MAX_IMAGE_PIXELS
}

/// Upper bounds for any image the service decodes or produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionLimits {
    #[serde(default = "default_max_width")]
    pub max_width: u32,
    #[serde(default = "default_max_height")]
    pub max_height: u32,
    /// Maximum total pixels (width * height)
    #[serde(default = "default_max_pixels")]
    pub max_pixels: u64,
}

impl Default for DimensionLimits {
    fn default() -> Self {
        Self {
            max_width: default_max_width(),
            max_height: default_max_height(),
            max_pixels: default_max_pixels(),
        }
    }
}

impl DimensionLimits {
    /// Validate image dimensions against the limits.
    pub fn check(&self, width: u32, height: u32) -> Result<(), ImageError> {
        let pixels = width as u64 * height as u64;
        if width > self.max_width || height > self.max_height || pixels > self.max_pixels {
            return Err(ImageError::DimensionsExceeded {
                width,
                height,
                max_width: self.max_width,
                max_height: self.max_height,
                max_pixels: self.max_pixels,
            });
        }
        Ok(())
    }
}
