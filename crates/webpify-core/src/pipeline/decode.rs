//! Image decoding with content sniffing and color-mode normalization.

use image::{ColorType, DynamicImage, GenericImageView, ImageFormat};
use std::io::Cursor;

use crate::config::LimitsConfig;
use crate::error::ConvertError;
use crate::types::{ColorMode, PixelBuffer, SourceMode};

/// Image decoder with configurable limits.
#[derive(Debug, Clone)]
pub struct ImageDecoder {
    limits: LimitsConfig,
}

/// Result of decoding an image, before normalization.
pub struct DecodedImage {
    /// The decoded image data
    pub image: DynamicImage,
    /// Detected container format
    pub format: ImageFormat,
    /// Color mode the source was stored in
    pub source_mode: SourceMode,
}

impl ImageDecoder {
    /// Create a new decoder with the given limits.
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    /// Decode bytes and normalize the result into a [`PixelBuffer`].
    ///
    /// `filename` is used for error context and as a format hint when the
    /// content itself cannot be sniffed.
    pub fn decode(&self, bytes: &[u8], filename: &str) -> Result<PixelBuffer, ConvertError> {
        let decoded = self.decode_raw(bytes, filename)?;
        tracing::trace!(
            "  Decoded {} as {} ({:?})",
            filename,
            format_to_string(decoded.format),
            decoded.source_mode
        );
        Ok(normalize(decoded.image, decoded.source_mode))
    }

    /// Decode bytes without normalizing.
    pub fn decode_raw(&self, bytes: &[u8], filename: &str) -> Result<DecodedImage, ConvertError> {
        let mut reader = image::ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| ConvertError::Decode {
                filename: filename.to_string(),
                message: format!("Cannot detect image format: {}", e),
            })?;

        let format = match reader.format() {
            Some(f) => f,
            None => {
                let f = ImageFormat::from_path(filename).map_err(|_| ConvertError::Decode {
                    filename: filename.to_string(),
                    message: "Unrecognized image format".to_string(),
                })?;
                reader.set_format(f);
                f
            }
        };

        reader.limits(self.image_limits());

        let image = reader.decode().map_err(|e| ConvertError::Decode {
            filename: filename.to_string(),
            message: e.to_string(),
        })?;

        let source_mode = sniff_source_mode(bytes, format)
            .unwrap_or_else(|| SourceMode::from_color_type(image.color()));

        Ok(DecodedImage {
            image,
            format,
            source_mode,
        })
    }

    fn image_limits(&self) -> image::Limits {
        let mut limits = image::Limits::default();
        limits.max_image_width = Some(self.limits.max_image_dimension);
        limits.max_image_height = Some(self.limits.max_image_dimension);
        limits.max_alloc = Some(self.limits.max_decode_alloc_mb.saturating_mul(1024 * 1024));
        limits
    }
}

impl Default for ImageDecoder {
    fn default() -> Self {
        Self::new(LimitsConfig::default())
    }
}

impl SourceMode {
    /// Classify a decoded color type by its channel layout.
    pub fn from_color_type(color: ColorType) -> Self {
        match (color.has_color(), color.has_alpha()) {
            (true, true) => SourceMode::Rgba,
            (true, false) => SourceMode::Rgb,
            (false, true) => SourceMode::LumaAlpha,
            (false, false) => SourceMode::Luma,
        }
    }
}

/// Map a decoded image onto one of the supported 8-bit color modes.
///
/// Alpha-carrying modes keep their alpha, palette images expand to RGBA,
/// everything else becomes plain RGB.
pub fn normalize(image: DynamicImage, source: SourceMode) -> PixelBuffer {
    let (width, height) = image.dimensions();
    let (mode, image) = match source {
        SourceMode::Rgba | SourceMode::Palette => {
            (ColorMode::Rgba, DynamicImage::ImageRgba8(image.into_rgba8()))
        }
        SourceMode::LumaAlpha => (
            ColorMode::La,
            DynamicImage::ImageLumaA8(image.into_luma_alpha8()),
        ),
        SourceMode::Rgb | SourceMode::Luma => {
            (ColorMode::Rgb, DynamicImage::ImageRgb8(image.into_rgb8()))
        }
    };
    PixelBuffer {
        width,
        height,
        mode,
        image,
    }
}

/// Source color mode read from the container header, when it differs from
/// what the decoder reports.
///
/// Decoders expand palettes on the fly, so indexed storage is only visible in
/// the header. Returns `None` to defer to the decoded color type.
fn sniff_source_mode(bytes: &[u8], format: ImageFormat) -> Option<SourceMode> {
    match format {
        ImageFormat::Gif => Some(SourceMode::Palette),
        // IHDR color type sits right after the 8-byte signature, chunk header,
        // width, height and bit depth.
        ImageFormat::Png => (bytes.get(25) == Some(&3)).then_some(SourceMode::Palette),
        ImageFormat::Bmp => sniff_bmp(bytes),
        ImageFormat::Tiff => tiff_is_palette(bytes).then_some(SourceMode::Palette),
        _ => None,
    }
}

/// Indexed BMPs are palette images unless the color table is a plain
/// grayscale ramp, in which case they are treated as grayscale.
fn sniff_bmp(bytes: &[u8]) -> Option<SourceMode> {
    let header_size = read_u32(bytes, 14, false)?;
    // OS/2 core headers use 16-bit dimensions, shifting the bit count, and
    // store 3-byte color table entries.
    let (bit_count_offset, entry_size) = if header_size == 12 { (24, 3) } else { (28, 4) };
    let bits = read_u16(bytes, bit_count_offset, false)?;
    if bits == 0 || bits > 8 {
        return None;
    }

    let declared = if header_size >= 40 {
        read_u32(bytes, 46, false).unwrap_or(0)
    } else {
        0
    };
    let colors = match declared {
        0 => 1usize << bits,
        n if n > 256 => return Some(SourceMode::Palette),
        n => n as usize,
    };
    let table_start = 14 + header_size as usize;

    let ramp: Vec<u8> = if colors == 2 {
        vec![0, 255]
    } else {
        (0..colors).map(|i| i as u8).collect()
    };
    let grayscale = ramp.iter().enumerate().all(|(index, &level)| {
        let offset = table_start + index * entry_size;
        bytes.get(offset..offset + 3) == Some(&[level, level, level][..])
    });

    Some(if grayscale {
        SourceMode::Luma
    } else {
        SourceMode::Palette
    })
}

/// Whether the first TIFF directory declares photometric interpretation 3 (RGB palette).
fn tiff_is_palette(bytes: &[u8]) -> bool {
    const PHOTOMETRIC_TAG: u16 = 262;
    const PHOTOMETRIC_PALETTE: u16 = 3;

    let big_endian = match bytes.get(0..2) {
        Some([b'I', b'I']) => false,
        Some([b'M', b'M']) => true,
        _ => return false,
    };
    let Some(ifd) = read_u32(bytes, 4, big_endian) else {
        return false;
    };
    let ifd = ifd as usize;
    let Some(entries) = read_u16(bytes, ifd, big_endian) else {
        return false;
    };

    (0..entries as usize)
        .map(|i| ifd + 2 + i * 12)
        .find(|&entry| read_u16(bytes, entry, big_endian) == Some(PHOTOMETRIC_TAG))
        .and_then(|entry| read_u16(bytes, entry + 8, big_endian))
        == Some(PHOTOMETRIC_PALETTE)
}

fn read_u16(bytes: &[u8], offset: usize, big_endian: bool) -> Option<u16> {
    let b: [u8; 2] = bytes.get(offset..offset.checked_add(2)?)?.try_into().ok()?;
    Some(if big_endian {
        u16::from_be_bytes(b)
    } else {
        u16::from_le_bytes(b)
    })
}

fn read_u32(bytes: &[u8], offset: usize, big_endian: bool) -> Option<u32> {
    let b: [u8; 4] = bytes.get(offset..offset.checked_add(4)?)?.try_into().ok()?;
    Some(if big_endian {
        u32::from_be_bytes(b)
    } else {
        u32::from_le_bytes(b)
    })
}

/// Convert an ImageFormat to a string representation.
pub fn format_to_string(format: ImageFormat) -> &'static str {
    match format {
        ImageFormat::Jpeg => "jpeg",
        ImageFormat::Png => "png",
        ImageFormat::WebP => "webp",
        ImageFormat::Gif => "gif",
        ImageFormat::Tiff => "tiff",
        ImageFormat::Bmp => "bmp",
        _ => "unknown",
    }
}
