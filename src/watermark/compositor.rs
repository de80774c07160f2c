//! Watermark compositor for blending watermarks onto images.
//!
//! # Pipeline
//!
//! 1. Pick the tile count from the base image width
//! 2. Scale the watermark to a fraction of the base width
//! 3. Re-alpha every visible watermark pixel to a fixed opacity
//! 4. Copy the base image into a fresh RGBA buffer
//! 5. Composite one tile per grid position with the "over" operator
//!
//! Tiles that fall partly outside the image are clipped.

use super::position::{
    calculate_grid_positions, watermark_count, ImageDimensions, PlacementPosition,
    WatermarkDimensions,
};
use crate::imaging::{resize_to_width, DimensionLimits, ImageError};
use image::{DynamicImage, Rgba, RgbaImage};
use std::sync::Arc;

/// Tunables for watermark composition
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WatermarkSettings {
    /// Alpha assigned to every non-transparent watermark pixel (0.0 to 1.0)
    pub alpha: f64,
    /// Watermark width as a fraction of the base image width
    pub width_fraction: f64,
}

impl Default for WatermarkSettings {
    fn default() -> Self {
        Self {
            alpha: 0.7,
            width_fraction: 0.2,
        }
    }
}

/// A watermark layer to be composited onto an image.
#[derive(Clone)]
pub struct WatermarkLayer {
    /// The watermark image (RGBA), shared between tiles.
    pub image: Arc<RgbaImage>,
    /// Position where the watermark should be placed.
    pub position: PlacementPosition,
}

impl std::fmt::Debug for WatermarkLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatermarkLayer")
            .field("dimensions", &(self.image.width(), self.image.height()))
            .field("position", &self.position)
            .finish()
    }
}

/// Compositor for applying watermarks to images.
#[derive(Debug, Default)]
pub struct Compositor {
    layers: Vec<WatermarkLayer>,
}

impl Compositor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_layer(&mut self, layer: WatermarkLayer) {
        self.layers.push(layer);
    }

    /// Apply all watermark layers to the target image, in insertion order.
    pub fn apply(&self, target: &mut RgbaImage) {
        for layer in &self.layers {
            blend_layer(target, layer);
        }
    }
}

/// Convert a 0.0..=1.0 alpha to an 8-bit channel value.
pub fn alpha_to_u8(alpha: f64) -> u8 {
    (alpha.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Produce a copy of `image` where every visible pixel carries `alpha`.
///
/// Pixels with zero source alpha stay fully transparent black.
pub fn apply_transparency(image: &RgbaImage, alpha: f64) -> RgbaImage {
    let target_alpha = alpha_to_u8(alpha);
    let mut output = RgbaImage::new(image.width(), image.height());

    for (x, y, pixel) in image.enumerate_pixels() {
        if pixel[3] > 0 {
            output.put_pixel(x, y, Rgba([pixel[0], pixel[1], pixel[2], target_alpha]));
        }
    }

    output
}

/// Tile `watermark` over `base` on the two-column grid.
///
/// The result always has the base image's dimensions.
pub fn add_watermark(
    base: &DynamicImage,
    watermark: &DynamicImage,
    settings: &WatermarkSettings,
    limits: &DimensionLimits,
) -> Result<RgbaImage, ImageError> {
    let image_dims = ImageDimensions {
        width: base.width(),
        height: base.height(),
    };

    let count = watermark_count(image_dims.width);

    let tile_width = ((image_dims.width as f64 * settings.width_fraction).floor() as u32).max(1);
    let scaled = resize_to_width(watermark, tile_width, limits)?;
    let tile = apply_transparency(&scaled.to_rgba8(), settings.alpha);

    let tile_dims = WatermarkDimensions {
        width: tile.width(),
        height: tile.height(),
    };

    let mut output = base.to_rgba8();
    let tile = Arc::new(tile);

    let mut compositor = Compositor::new();
    for position in calculate_grid_positions(&image_dims, &tile_dims, count) {
        compositor.add_layer(WatermarkLayer {
            image: Arc::clone(&tile),
            position,
        });
    }
    compositor.apply(&mut output);

    Ok(output)
}

/// Blend a single watermark layer onto the target image.
fn blend_layer(target: &mut RgbaImage, layer: &WatermarkLayer) {
    let target_width = target.width() as i32;
    let target_height = target.height() as i32;

    let wm_width = layer.image.width() as i32;
    let wm_height = layer.image.height() as i32;

    // Visible region, clamped to target bounds
    let x_start = layer.position.x.max(0);
    let y_start = layer.position.y.max(0);
    let x_end = (layer.position.x + wm_width).min(target_width);
    let y_end = (layer.position.y + wm_height).min(target_height);

    for ty in y_start..y_end {
        for tx in x_start..x_end {
            let wx = (tx - layer.position.x) as u32;
            let wy = (ty - layer.position.y) as u32;

            let wm_pixel = layer.image.get_pixel(wx, wy);
            let target_pixel = target.get_pixel(tx as u32, ty as u32);

            let blended = blend_pixels(*target_pixel, *wm_pixel);
            target.put_pixel(tx as u32, ty as u32, blended);
        }
    }
}

/// Blend two pixels with the "over" operator:
/// result = foreground + background * (1 - foreground.alpha)
fn blend_pixels(background: Rgba<u8>, foreground: Rgba<u8>) -> Rgba<u8> {
    let fg_alpha = foreground[3] as f32 / 255.0;
    if fg_alpha <= 0.0 {
        return background;
    }
    let bg_alpha = background[3] as f32 / 255.0;

    let out_alpha = fg_alpha + bg_alpha * (1.0 - fg_alpha);

    if out_alpha < 0.001 {
        return Rgba([0, 0, 0, 0]);
    }

    let blend_channel = |fg: u8, bg: u8| -> u8 {
        let fg_f = fg as f32 / 255.0;
        let bg_f = bg as f32 / 255.0;
        let result = (fg_f * fg_alpha + bg_f * bg_alpha * (1.0 - fg_alpha)) / out_alpha;
        (result * 255.0).round().clamp(0.0, 255.0) as u8
    };

    Rgba([
        blend_channel(foreground[0], background[0]),
        blend_channel(foreground[1], background[1]),
        blend_channel(foreground[2], background[2]),
        (out_alpha * 255.0).round() as u8,
    ])
}
