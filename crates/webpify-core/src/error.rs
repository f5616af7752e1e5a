//! Error types for the WebPify conversion pipeline.
//!
//! Errors are organized by stage and carry the offending filename so the
//! HTTP layer can report exactly which upload broke the batch.

use thiserror::Error;

/// Top-level error type for WebPify operations.
#[derive(Error, Debug)]
pub enum WebpifyError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Conversion pipeline errors
    #[error("Conversion error: {0}")]
    Convert(#[from] ConvertError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Conversion errors, organized by pipeline stage.
#[derive(Error, Debug)]
pub enum ConvertError {
    /// The batch contained no files
    #[error("No files provided")]
    NoFiles,

    /// Filename extension is not in the allow-list
    #[error("Unsupported file format: {filename}. Allowed formats: PNG, JPG, JPEG, BMP, TIFF, GIF, WEBP")]
    UnsupportedFormat { filename: String },

    /// Bytes could not be parsed as an image
    #[error("Error converting image {filename}: {message}")]
    Decode { filename: String, message: String },

    /// Encoder backend rejected a decoded buffer
    #[error("Error encoding image {filename}: {message}")]
    Encode { filename: String, message: String },

    /// Archive packaging failed
    #[error("Error building archive: {0}")]
    Archive(String),

    /// Anything else that went wrong while processing
    #[error("Server error during conversion: {0}")]
    Internal(String),
}

/// Caller-facing category of a [`ConvertError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Malformed or unsupported client input
    BadRequest,
    /// Fault on the service side
    Internal,
}

impl ConvertError {
    /// Classify the error for transport-level status mapping.
    pub fn class(&self) -> ErrorClass {
        match self {
            ConvertError::NoFiles
            | ConvertError::UnsupportedFormat { .. }
            | ConvertError::Decode { .. } => ErrorClass::BadRequest,
            ConvertError::Encode { .. } | ConvertError::Archive(_) | ConvertError::Internal(_) => {
                ErrorClass::Internal
            }
        }
    }

    /// The filename this error is attributed to, if any.
    pub fn filename(&self) -> Option<&str> {
        match self {
            ConvertError::UnsupportedFormat { filename }
            | ConvertError::Decode { filename, .. }
            | ConvertError::Encode { filename, .. } => Some(filename),
            ConvertError::NoFiles | ConvertError::Archive(_) | ConvertError::Internal(_) => None,
        }
    }
}

impl From<zip::result::ZipError> for ConvertError {
    fn from(e: zip::result::ZipError) -> Self {
        ConvertError::Archive(e.to_string())
    }
}

/// Convenience type alias for WebPify results.
pub type Result<T> = std::result::Result<T, WebpifyError>;

/// Convenience type alias for conversion-specific results.
pub type ConvertResult<T> = std::result::Result<T, ConvertError>;
