//! Watermark module: tiled image watermarks with alpha blending.
//!
//! A single watermark image is scaled relative to the base image, made
//! translucent and stamped in a two-column grid whose tile count depends on
//! the base width:
//!
//! | Base width     | Tiles |
//! |----------------|-------|
//! | < 500          | 1     |
//! | 500 to 999     | 2     |
//! | 1000 and above | 5     |

pub mod assets;
pub mod compositor;
pub mod position;

pub use assets::WatermarkAssets;
pub use compositor::{
    add_watermark, alpha_to_u8, apply_transparency, Compositor, WatermarkLayer, WatermarkSettings,
};
pub use position::{
    calculate_grid_positions, watermark_count, ImageDimensions, PlacementPosition,
    WatermarkDimensions,
};
