//! Sub-configuration structs with service defaults.

use serde::{Deserialize, Serialize};

/// Quality threshold at or above which images with alpha are encoded losslessly.
pub const DEFAULT_LOSSLESS_THRESHOLD: u8 = 90;

/// Quality used when the caller does not supply one.
pub const DEFAULT_QUALITY: u8 = 85;

/// Filename of the multi-file response.
pub const DEFAULT_ARCHIVE_NAME: &str = "WebPify_converted_images.zip";

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Origins allowed by the CORS policy
    pub cors_origins: Vec<String>,

    /// Maximum request body size in megabytes
    pub max_upload_mb: u64,

    /// Per-request conversion timeout in milliseconds (0 disables)
    pub request_timeout_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors_origins: vec!["http://localhost:3000".to_string()],
            max_upload_mb: 100,
            request_timeout_ms: 0,
        }
    }
}

/// Conversion settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionConfig {
    /// Quality applied when a request omits it (1-100)
    pub default_quality: u8,

    /// Images with alpha at or above this quality are encoded losslessly
    pub lossless_threshold: u8,

    /// Accepted input extensions (case-insensitive, without the dot)
    pub allowed_extensions: Vec<String>,

    /// Filename used for multi-file archive responses
    pub archive_name: String,

    /// Maximum number of files converted concurrently within one batch
    pub parallel_workers: usize,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            default_quality: DEFAULT_QUALITY,
            lossless_threshold: DEFAULT_LOSSLESS_THRESHOLD,
            allowed_extensions: vec![
                "png".to_string(),
                "jpg".to_string(),
                "jpeg".to_string(),
                "bmp".to_string(),
                "tiff".to_string(),
                "tif".to_string(),
                "gif".to_string(),
                "webp".to_string(),
            ],
            archive_name: DEFAULT_ARCHIVE_NAME.to_string(),
            parallel_workers: 4,
        }
    }
}

/// Resource limits to protect against problematic inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum image dimension (width or height) the decoder will accept
    pub max_image_dimension: u32,

    /// Maximum decoder allocation in megabytes
    pub max_decode_alloc_mb: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_image_dimension: 16383,
            max_decode_alloc_mb: 512,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
