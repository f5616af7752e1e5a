//! In-memory image fixtures for unit tests.

use image::{DynamicImage, GrayAlphaImage, GrayImage, ImageFormat, RgbImage, RgbaImage};
use std::io::Cursor;

/// RGB gradient.
pub fn rgb_image(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x * 7) as u8, (y * 5) as u8, ((x + y) * 3) as u8])
    }))
}

/// RGBA gradient whose alpha varies across the image.
pub fn rgba_image(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgba8(RgbaImage::from_fn(width, height, |x, y| {
        image::Rgba([(x * 7) as u8, (y * 5) as u8, 128, ((x * 255) / width.max(1)) as u8])
    }))
}

/// Grayscale gradient.
pub fn luma_image(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageLuma8(GrayImage::from_fn(width, height, |x, y| {
        image::Luma([((x + y) * 4) as u8])
    }))
}

/// Grayscale with varying alpha.
pub fn luma_alpha_image(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageLumaA8(GrayAlphaImage::from_fn(width, height, |x, _| {
        image::LumaA([(x * 9) as u8, ((x * 255) / width.max(1)) as u8])
    }))
}

/// Encode an image into container bytes.
pub fn encode(image: &DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    image.write_to(&mut buffer, format).unwrap();
    buffer.into_inner()
}

/// A small RGB PNG.
pub fn png_bytes() -> Vec<u8> {
    encode(&rgb_image(16, 12), ImageFormat::Png)
}

/// The RIFF chunk fourcc following the `WEBP` tag ("VP8 ", "VP8L", or "VP8X").
pub fn webp_chunk(bytes: &[u8]) -> &[u8] {
    &bytes[12..16]
}
