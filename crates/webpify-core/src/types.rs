//! Core data types for the WebPify conversion pipeline.
//!
//! These types represent the inputs and outputs of a conversion: the uploaded
//! bytes, the decoded pixel buffer, and the encoded artifacts.

use image::DynamicImage;

/// MIME type of a converted artifact.
pub const WEBP_CONTENT_TYPE: &str = "image/webp";

/// MIME type of a multi-file archive.
pub const ZIP_CONTENT_TYPE: &str = "application/zip";

/// Extension (without the dot) given to converted artifacts.
pub const WEBP_EXTENSION: &str = "webp";

/// A single uploaded image.
#[derive(Debug, Clone)]
pub struct ImageInput {
    /// Raw uploaded bytes
    pub bytes: Vec<u8>,

    /// Filename as supplied by the client
    pub filename: String,
}

impl ImageInput {
    pub fn new(bytes: impl Into<Vec<u8>>, filename: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            filename: filename.into(),
        }
    }
}

/// Color mode of a decoded image before normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceMode {
    /// Three color channels, no alpha (includes CMYK, which decodes to RGB)
    Rgb,
    /// Three color channels with alpha
    Rgba,
    /// Single luminance channel
    Luma,
    /// Luminance with alpha
    LumaAlpha,
    /// Indexed color; the palette may define transparency
    Palette,
}

/// Color mode of a normalized pixel buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMode {
    Rgb,
    Rgba,
    /// Luminance with alpha
    La,
}

impl ColorMode {
    /// Whether the mode carries an alpha channel.
    pub fn has_alpha(self) -> bool {
        match self {
            ColorMode::Rgb => false,
            ColorMode::Rgba | ColorMode::La => true,
        }
    }
}

/// A decoded, normalized image ready for encoding.
///
/// `image` always holds 8-bit samples laid out to match `mode`.
#[derive(Debug, Clone)]
pub struct PixelBuffer {
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Normalized color mode
    pub mode: ColorMode,
    /// Pixel data
    pub image: DynamicImage,
}

impl PixelBuffer {
    pub fn has_alpha(&self) -> bool {
        self.mode.has_alpha()
    }
}

/// Parameters handed to the WebP encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeParameters {
    /// Quality in `[1, 100]`
    pub quality: u8,
    /// Encode losslessly instead of at `quality`
    pub lossless: bool,
}

impl EncodeParameters {
    /// Derive parameters from a caller-supplied quality.
    ///
    /// Out-of-range qualities are clamped rather than rejected. Lossless mode is
    /// chosen only for buffers with alpha at or above `lossless_threshold`.
    pub fn derive(requested_quality: i32, mode: ColorMode, lossless_threshold: u8) -> Self {
        let quality = requested_quality.clamp(1, 100) as u8;
        Self {
            quality,
            lossless: mode.has_alpha() && quality >= lossless_threshold,
        }
    }
}

/// The encoded form of one input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertedArtifact {
    /// WebP bytes
    pub bytes: Vec<u8>,
    /// Derived output filename (`<stem>.webp`)
    pub filename: String,
}

/// Result of converting a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionOutcome {
    /// Exactly one input was converted
    Single(ConvertedArtifact),
    /// Several inputs were converted and bundled
    Archive { bytes: Vec<u8>, filename: String },
}

impl ConversionOutcome {
    /// Filename to present to the caller.
    pub fn filename(&self) -> &str {
        match self {
            ConversionOutcome::Single(artifact) => &artifact.filename,
            ConversionOutcome::Archive { filename, .. } => filename,
        }
    }

    /// Response payload.
    pub fn bytes(&self) -> &[u8] {
        match self {
            ConversionOutcome::Single(artifact) => &artifact.bytes,
            ConversionOutcome::Archive { bytes, .. } => bytes,
        }
    }

    /// MIME type of the payload.
    pub fn content_type(&self) -> &'static str {
        match self {
            ConversionOutcome::Single(_) => WEBP_CONTENT_TYPE,
            ConversionOutcome::Archive { .. } => ZIP_CONTENT_TYPE,
        }
    }

    /// Split into `(filename, bytes)`.
    pub fn into_parts(self) -> (String, Vec<u8>) {
        match self {
            ConversionOutcome::Single(artifact) => (artifact.filename, artifact.bytes),
            ConversionOutcome::Archive { bytes, filename } => (filename, bytes),
        }
    }
}
