// Watermark geometry and composition tests

use image::{DynamicImage, Rgba, RgbaImage};
use rstest::rstest;

use imgvariant::imaging::DimensionLimits;
use imgvariant::watermark::{
    add_watermark, alpha_to_u8, apply_transparency, calculate_grid_positions, watermark_count,
    ImageDimensions, WatermarkDimensions, WatermarkSettings,
};

// Test: tile count boundaries
#[rstest]
#[case(1, 1)]
#[case(499, 1)]
#[case(500, 2)]
#[case(999, 2)]
#[case(1000, 5)]
#[case(4000, 5)]
fn test_watermark_count_boundaries(#[case] width: u32, #[case] expected: usize) {
    assert_eq!(watermark_count(width), expected);
}

// Test: grid yields exactly `count` in-bounds positions
#[rstest]
#[case(400, 300)]
#[case(600, 400)]
#[case(1500, 750)]
#[case(2048, 1536)]
fn test_grid_positions_in_bounds(#[case] width: u32, #[case] height: u32) {
    let image = ImageDimensions { width, height };
    let count = watermark_count(width);
    let tile = WatermarkDimensions {
        width: width / 5,
        height: height / 10,
    };

    let positions = calculate_grid_positions(&image, &tile, count);
    assert_eq!(positions.len(), count);
    for p in positions {
        assert!(p.x >= 0 && p.y >= 0);
        assert!(p.x as u32 + tile.width <= width);
        assert!(p.y as u32 + tile.height <= height);
    }
}

// Test: five tiles fill a 3x2 grid row-major
#[test]
fn test_five_tiles_row_major() {
    let positions = calculate_grid_positions(
        &ImageDimensions {
            width: 1500,
            height: 750,
        },
        &WatermarkDimensions {
            width: 300,
            height: 150,
        },
        5,
    );

    let coords: Vec<(i32, i32)> = positions.iter().map(|p| (p.x, p.y)).collect();
    assert_eq!(
        coords,
        vec![(300, 75), (900, 75), (300, 300), (900, 300), (300, 525)]
    );
}

// Test: transparency keeps clear pixels clear and re-alphas the rest
#[test]
fn test_apply_transparency() {
    let mut img = RgbaImage::from_pixel(2, 1, Rgba([50, 60, 70, 255]));
    img.put_pixel(1, 0, Rgba([0, 0, 0, 0]));

    let out = apply_transparency(&img, 0.7);
    assert_eq!(*out.get_pixel(0, 0), Rgba([50, 60, 70, alpha_to_u8(0.7)]));
    assert_eq!(*out.get_pixel(1, 0), Rgba([0, 0, 0, 0]));
    assert_eq!(alpha_to_u8(0.7), (0.7f64 * 255.0).round() as u8);
}

// Test: composition never changes the base dimensions
#[rstest]
#[case(3, 3)]
#[case(120, 80)]
#[case(640, 480)]
#[case(1200, 300)]
fn test_add_watermark_keeps_dimensions(#[case] width: u32, #[case] height: u32) {
    let base = DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 255])));
    let mark = DynamicImage::ImageRgba8(RgbaImage::from_pixel(80, 80, Rgba([255, 255, 255, 255])));

    let out = add_watermark(
        &base,
        &mark,
        &WatermarkSettings::default(),
        &DimensionLimits::default(),
    )
    .unwrap();
    assert_eq!(out.dimensions(), (width, height));
}
