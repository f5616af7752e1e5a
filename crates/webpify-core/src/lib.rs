//! WebPify Core - embeddable image-to-WebP conversion library.
//!
//! Takes uploaded image bytes and returns WebP bytes, or a ZIP archive when
//! several images are converted together. No HTTP, no storage: the caller
//! owns transport and the library owns the conversion.
//!
//! # Architecture
//!
//! ```text
//! Bytes → Validate name → Decode → Normalize → Encode (WebP) → Single | ZIP
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use webpify_core::{Config, Converter, ImageInput};
//!
//! #[tokio::main]
//! async fn main() -> webpify_core::Result<()> {
//!     let config = Config::load()?;
//!     let converter = Converter::new(&config.conversion, &config.limits);
//!
//!     let bytes = std::fs::read("./image.png")?;
//!     let outcome = converter
//!         .convert_all(vec![ImageInput::new(bytes, "image.png")], 85)
//!         .await?;
//!     std::fs::write(outcome.filename(), outcome.bytes())?;
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod config;
pub mod error;
pub mod pipeline;
pub mod types;

#[cfg(test)]
mod test_helpers;

// Re-exports for convenient access
pub use config::Config;
pub use error::{ConfigError, ConvertError, ConvertResult, ErrorClass, Result, WebpifyError};
pub use pipeline::{Converter, DiscoveredFile, FileDiscovery, FormatValidator};
pub use types::{
    ColorMode, ConversionOutcome, ConvertedArtifact, EncodeParameters, ImageInput, PixelBuffer,
    SourceMode,
};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Service name reported by the HTTP layer.
pub const SERVICE_NAME: &str = "WebPify API";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_converter_from_config() {
        let config = Config::default();
        let converter = Converter::new(&config.conversion, &config.limits);
        assert!(converter.is_valid_format("photo.png"));
        assert!(!converter.is_valid_format("photo.svg"));
    }
}
