//! Position calculation for watermark placement.
//!
//! Watermarks are laid out on a fixed two-column grid. The number of tiles
//! depends on the base image width, and padding between tiles is spread
//! evenly across each axis.
//!
//! # Example
//!
//! ```
//! use imgvariant::watermark::position::{
//!     calculate_grid_positions, watermark_count, ImageDimensions, WatermarkDimensions,
//! };
//!
//! let image = ImageDimensions { width: 800, height: 600 };
//! let tile = WatermarkDimensions { width: 160, height: 80 };
//! let count = watermark_count(image.width);
//!
//! let positions = calculate_grid_positions(&image, &tile, count);
//! assert_eq!(positions.len(), 2);
//! ```

/// Number of columns in the watermark grid
pub const GRID_COLUMNS: i32 = 2;

/// Dimensions of the target image.
#[derive(Debug, Clone, Copy)]
pub struct ImageDimensions {
    pub width: u32,
    pub height: u32,
}

/// Dimensions of the watermark to be placed.
#[derive(Debug, Clone, Copy)]
pub struct WatermarkDimensions {
    pub width: u32,
    pub height: u32,
}

/// A single position where a watermark should be placed.
///
/// Offsets are signed: narrow images with wide tiles produce negative padding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacementPosition {
    pub x: i32,
    pub y: i32,
}

impl PlacementPosition {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Number of watermark tiles for a base image of the given width.
///
/// - below 500px: 1 tile
/// - 500px up to 999px: 2 tiles
/// - 1000px and wider: 5 tiles
pub fn watermark_count(image_width: u32) -> usize {
    if image_width < 500 {
        1
    } else if image_width < 1000 {
        2
    } else {
        5
    }
}

/// Number of grid rows needed for `count` tiles.
pub fn grid_rows(count: usize) -> i32 {
    (count as i32 + 1) / GRID_COLUMNS
}

/// Calculate top-left offsets for `count` tiles on the two-column grid.
///
/// Positions are emitted row-major and generation stops once `count`
/// positions exist, so an odd count leaves the last cell empty. Padding is
/// computed with truncating integer division and is not clamped; it goes
/// negative when the tiles are wider or taller than the image allows.
pub fn calculate_grid_positions(
    image: &ImageDimensions,
    watermark: &WatermarkDimensions,
    count: usize,
) -> Vec<PlacementPosition> {
    let mut positions = Vec::with_capacity(count);

    let img_w = image.width as i32;
    let img_h = image.height as i32;
    let wm_w = watermark.width as i32;
    let wm_h = watermark.height as i32;

    let cols = GRID_COLUMNS;
    let rows = grid_rows(count);

    let col_padding = (img_w - cols * wm_w) / (cols + 1);
    let row_padding = (img_h - rows * wm_h) / (rows + 1);

    for row in 0..rows {
        for col in 0..cols {
            if positions.len() >= count {
                return positions;
            }
            positions.push(PlacementPosition::new(
                col_padding + col * (wm_w + col_padding),
                row_padding + row * (wm_h + row_padding),
            ));
        }
    }

    positions
}
