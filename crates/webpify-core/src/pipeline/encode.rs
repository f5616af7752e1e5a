//! WebP encoding with quality clamping and alpha-aware lossless selection.

use image::DynamicImage;

use crate::config::{ConversionConfig, DEFAULT_LOSSLESS_THRESHOLD};
use crate::error::ConvertError;
use crate::types::{ColorMode, EncodeParameters, PixelBuffer};

/// Serializes normalized pixel buffers into WebP.
#[derive(Debug, Clone)]
pub struct WebpEncoder {
    lossless_threshold: u8,
}

impl WebpEncoder {
    /// Create an encoder from the conversion settings.
    pub fn new(config: &ConversionConfig) -> Self {
        Self::with_lossless_threshold(config.lossless_threshold)
    }

    /// Create an encoder with an explicit lossless threshold.
    pub fn with_lossless_threshold(lossless_threshold: u8) -> Self {
        Self { lossless_threshold }
    }

    /// Parameters this encoder would use for `buffer` at `requested_quality`.
    pub fn parameters(&self, buffer: &PixelBuffer, requested_quality: i32) -> EncodeParameters {
        EncodeParameters::derive(requested_quality, buffer.mode, self.lossless_threshold)
    }

    /// Encode a buffer to WebP bytes.
    ///
    /// `requested_quality` is clamped into `[1, 100]`. Buffers with alpha at or
    /// above the lossless threshold are encoded losslessly.
    pub fn encode(
        &self,
        buffer: &PixelBuffer,
        requested_quality: i32,
        filename: &str,
    ) -> Result<Vec<u8>, ConvertError> {
        let params = self.parameters(buffer, requested_quality);
        tracing::trace!(
            "  Encoding {} ({}x{}, {:?}) quality={} lossless={}",
            filename,
            buffer.width,
            buffer.height,
            buffer.mode,
            params.quality,
            params.lossless
        );
        encode_with(buffer, params).map_err(|message| ConvertError::Encode {
            filename: filename.to_string(),
            message,
        })
    }
}

impl Default for WebpEncoder {
    fn default() -> Self {
        Self::with_lossless_threshold(DEFAULT_LOSSLESS_THRESHOLD)
    }
}

fn encode_with(buffer: &PixelBuffer, params: EncodeParameters) -> Result<Vec<u8>, String> {
    let (width, height) = (buffer.width, buffer.height);

    // libwebp has no grayscale input, so luminance+alpha goes in as RGBA.
    let expanded;
    let image: &DynamicImage = match buffer.mode {
        ColorMode::La => {
            expanded = DynamicImage::ImageRgba8(buffer.image.to_rgba8());
            &expanded
        }
        ColorMode::Rgb | ColorMode::Rgba => &buffer.image,
    };

    let encoder = match (buffer.mode, image) {
        (ColorMode::Rgb, DynamicImage::ImageRgb8(rgb)) => {
            webp::Encoder::from_rgb(rgb.as_raw(), width, height)
        }
        (ColorMode::Rgba | ColorMode::La, DynamicImage::ImageRgba8(rgba)) => {
            webp::Encoder::from_rgba(rgba.as_raw(), width, height)
        }
        (mode, other) => {
            return Err(format!(
                "pixel layout {:?} does not match color mode {:?}",
                other.color(),
                mode
            ))
        }
    };

    let memory = encoder
        .encode_simple(params.lossless, f32::from(params.quality))
        .map_err(|e| format!("WebP encoder rejected image: {:?}", e))?;
    Ok(memory.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::decode::normalize;
    use crate::test_helpers::{luma_alpha_image, rgb_image, rgba_image, webp_chunk};
    use crate::types::SourceMode;
    use image::ImageFormat;

    fn rgb_buffer() -> PixelBuffer {
        normalize(rgb_image(32, 24), SourceMode::Rgb)
    }

    fn rgba_buffer() -> PixelBuffer {
        normalize(rgba_image(32, 24), SourceMode::Rgba)
    }

    #[test]
    fn test_output_is_webp() {
        let bytes = WebpEncoder::default()
            .encode(&rgb_buffer(), 85, "a.png")
            .unwrap();
        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(&bytes[8..12], b"WEBP");
        assert_eq!(image::guess_format(&bytes).unwrap(), ImageFormat::WebP);
    }

    #[test]
    fn test_rgb_is_always_lossy() {
        let bytes = WebpEncoder::default()
            .encode(&rgb_buffer(), 100, "a.png")
            .unwrap();
        assert_eq!(webp_chunk(&bytes), b"VP8 ");
    }

    #[test]
    fn test_alpha_above_threshold_is_lossless() {
        let bytes = WebpEncoder::default()
            .encode(&rgba_buffer(), 95, "a.png")
            .unwrap();
        assert_eq!(webp_chunk(&bytes), b"VP8L");

        let decoded = image::load_from_memory(&bytes).unwrap();
        assert!(decoded.color().has_alpha());
    }

    #[test]
    fn test_alpha_below_threshold_is_lossy_with_alpha() {
        let bytes = WebpEncoder::default()
            .encode(&rgba_buffer(), 60, "a.png")
            .unwrap();
        // Lossy with alpha uses the extended container
        assert_eq!(webp_chunk(&bytes), b"VP8X");
    }

    #[test]
    fn test_luma_alpha_encodes_as_rgba() {
        let buffer = normalize(luma_alpha_image(16, 16), SourceMode::LumaAlpha);
        let bytes = WebpEncoder::default().encode(&buffer, 90, "la.png").unwrap();
        assert_eq!(webp_chunk(&bytes), b"VP8L");
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert!(decoded.color().has_alpha());
    }

    #[test]
    fn test_quality_clamping_is_byte_identical() {
        let encoder = WebpEncoder::default();
        let buffer = rgb_buffer();
        assert_eq!(
            encoder.encode(&buffer, 150, "a.png").unwrap(),
            encoder.encode(&buffer, 100, "a.png").unwrap()
        );
        assert_eq!(
            encoder.encode(&buffer, -5, "a.png").unwrap(),
            encoder.encode(&buffer, 1, "a.png").unwrap()
        );
    }

    #[test]
    fn test_custom_threshold() {
        let encoder = WebpEncoder::with_lossless_threshold(50);
        let buffer = rgba_buffer();
        assert!(encoder.parameters(&buffer, 50).lossless);
        assert!(!encoder.parameters(&buffer, 49).lossless);
    }

    #[test]
    fn test_mismatched_layout_is_encode_error() {
        let buffer = PixelBuffer {
            width: 4,
            height: 4,
            mode: ColorMode::Rgb,
            image: rgba_image(4, 4),
        };
        let err = WebpEncoder::default()
            .encode(&buffer, 80, "odd.png")
            .unwrap_err();
        match err {
            ConvertError::Encode { filename, .. } => assert_eq!(filename, "odd.png"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_oversized_image_is_encode_error() {
        // WebP caps each dimension at 16383 pixels
        let buffer = normalize(rgb_image(16384, 1), SourceMode::Rgb);
        let err = WebpEncoder::default()
            .encode(&buffer, 80, "wide.png")
            .unwrap_err();
        assert!(matches!(err, ConvertError::Encode { .. }));
    }
}
