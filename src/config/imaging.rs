//! Imaging configuration: encode quality, variant widths and watermark tunables.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_ID_UTC_OFFSET_HOURS, DEFAULT_JPEG_QUALITY, DEFAULT_WATERMARK_ALPHA,
    DEFAULT_WATERMARK_ASSET_NAME, DEFAULT_WATERMARK_CACHE_ENTRIES,
    DEFAULT_WATERMARK_WIDTH_FRACTION,
};
use crate::imaging::{DimensionLimits, EncoderQuality, TargetWidths};
use crate::watermark::WatermarkSettings;

fn default_jpeg_quality() -> u8 {
    DEFAULT_JPEG_QUALITY
}

fn default_watermark_alpha() -> f64 {
    DEFAULT_WATERMARK_ALPHA
}

fn default_watermark_width_fraction() -> f64 {
    DEFAULT_WATERMARK_WIDTH_FRACTION
}

fn default_watermark_asset_name() -> String {
    DEFAULT_WATERMARK_ASSET_NAME.to_string()
}

fn default_id_utc_offset_hours() -> i32 {
    DEFAULT_ID_UTC_OFFSET_HOURS
}

fn default_watermark_cache_entries() -> u64 {
    DEFAULT_WATERMARK_CACHE_ENTRIES
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImagingConfig {
    /// JPEG quality for originals and derived variants (1-100, default: 75)
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
    #[serde(default)]
    pub target_widths: TargetWidths,
    /// Alpha assigned to visible watermark pixels (default: 0.7)
    #[serde(default = "default_watermark_alpha")]
    pub watermark_alpha: f64,
    /// Watermark tile width relative to the base image (default: 0.2)
    #[serde(default = "default_watermark_width_fraction")]
    pub watermark_width_fraction: f64,
    #[serde(default = "default_watermark_asset_name")]
    pub watermark_asset_name: String,
    /// Local file used to provision the watermark asset when the store has none
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub watermark_seed_path: Option<String>,
    /// Offset from UTC used for `image_<timestamp>` ids (default: +8)
    #[serde(default = "default_id_utc_offset_hours")]
    pub id_utc_offset_hours: i32,
    #[serde(default = "default_watermark_cache_entries")]
    pub watermark_cache_entries: u64,
    /// Largest image accepted on decode or produced by a resize
    #[serde(default)]
    pub limits: DimensionLimits,
}

impl Default for ImagingConfig {
    fn default() -> Self {
        Self {
            jpeg_quality: default_jpeg_quality(),
            target_widths: TargetWidths::default(),
            watermark_alpha: default_watermark_alpha(),
            watermark_width_fraction: default_watermark_width_fraction(),
            watermark_asset_name: default_watermark_asset_name(),
            watermark_seed_path: None,
            id_utc_offset_hours: default_id_utc_offset_hours(),
            watermark_cache_entries: default_watermark_cache_entries(),
            limits: DimensionLimits::default(),
        }
    }
}

impl ImagingConfig {
    pub fn encoder_quality(&self) -> EncoderQuality {
        EncoderQuality::with_quality(self.jpeg_quality)
    }

    pub fn watermark_settings(&self) -> WatermarkSettings {
        WatermarkSettings {
            alpha: self.watermark_alpha,
            width_fraction: self.watermark_width_fraction,
        }
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(format!(
                "imaging.jpeg_quality must be between 1 and 100, got {}",
                self.jpeg_quality
            ));
        }

        let widths = &self.target_widths;
        if widths.small == 0 || widths.medium == 0 || widths.large == 0 {
            return Err("imaging.target_widths must all be greater than 0".to_string());
        }
        if !(widths.small < widths.medium && widths.medium < widths.large) {
            return Err(format!(
                "imaging.target_widths must satisfy small < medium < large, got {}/{}/{}",
                widths.small, widths.medium, widths.large
            ));
        }

        if !(self.watermark_alpha > 0.0 && self.watermark_alpha <= 1.0) {
            return Err(format!(
                "imaging.watermark_alpha must be in (0, 1], got {}",
                self.watermark_alpha
            ));
        }
        if !(self.watermark_width_fraction > 0.0 && self.watermark_width_fraction <= 1.0) {
            return Err(format!(
                "imaging.watermark_width_fraction must be in (0, 1], got {}",
                self.watermark_width_fraction
            ));
        }

        if self.watermark_asset_name.trim().is_empty() {
            return Err("imaging.watermark_asset_name cannot be empty".to_string());
        }

        let limits = &self.limits;
        if limits.max_width == 0 || limits.max_height == 0 || limits.max_pixels == 0 {
            return Err("imaging.limits must all be greater than 0".to_string());
        }
        if limits.max_width < widths.large {
            return Err(format!(
                "imaging.limits.max_width ({}) is smaller than the large target width ({})",
                limits.max_width, widths.large
            ));
        }

        if !(-12..=14).contains(&self.id_utc_offset_hours) {
            return Err(format!(
                "imaging.id_utc_offset_hours must be between -12 and 14, got {}",
                self.id_utc_offset_hours
            ));
        }

        Ok(())
    }
}
