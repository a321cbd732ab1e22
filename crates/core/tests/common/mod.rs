use image::{DynamicImage, Rgb, RgbImage};

/// Build an RGB test image where every pixel encodes its own position.
///
/// Red is `x`, green is `y` and blue mixes both, so any rotation, flip or
/// crop shows up as a different buffer.
pub fn gradient_image(width: u32, height: u32) -> DynamicImage {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x * 7 + y * 13) % 256) as u8])
    });
    DynamicImage::ImageRgb8(img)
}
