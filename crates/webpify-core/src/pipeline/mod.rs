//! Image conversion pipeline components.
//!
//! This module contains all the stages of the conversion pipeline:
//! - **validate**: Filename allow-list checks before any work starts
//! - **decode**: Decode uploaded bytes and normalize color modes
//! - **encode**: Encode normalized buffers to WebP
//! - **naming**: Output filename derivation and collision handling
//! - **archive**: Bundle several artifacts into one ZIP
//! - **converter**: Orchestrates the full pipeline
//! - **discovery**: Find convertible files on disk (CLI use)

pub mod archive;
pub mod converter;
pub mod decode;
pub mod discovery;
pub mod encode;
pub mod naming;
pub mod validate;

// Re-exports for convenient access
pub use archive::ArchiveBuilder;
pub use converter::Converter;
pub use decode::{DecodedImage, ImageDecoder};
pub use discovery::{DiscoveredFile, FileDiscovery};
pub use encode::WebpEncoder;
pub use naming::{disambiguate, disambiguate_against, output_name};
pub use validate::FormatValidator;
