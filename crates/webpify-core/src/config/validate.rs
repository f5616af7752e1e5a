//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.server.max_upload_mb == 0 {
            return Err(ConfigError::ValidationError(
                "server.max_upload_mb must be > 0".into(),
            ));
        }
        if !(1..=100).contains(&self.conversion.default_quality) {
            return Err(ConfigError::ValidationError(
                "conversion.default_quality must be between 1 and 100".into(),
            ));
        }
        if !(1..=100).contains(&self.conversion.lossless_threshold) {
            return Err(ConfigError::ValidationError(
                "conversion.lossless_threshold must be between 1 and 100".into(),
            ));
        }
        if self.conversion.allowed_extensions.is_empty() {
            return Err(ConfigError::ValidationError(
                "conversion.allowed_extensions must not be empty".into(),
            ));
        }
        if self.conversion.archive_name.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "conversion.archive_name must not be empty".into(),
            ));
        }
        if self.conversion.parallel_workers == 0 {
            return Err(ConfigError::ValidationError(
                "conversion.parallel_workers must be > 0".into(),
            ));
        }
        if self.limits.max_image_dimension == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_image_dimension must be > 0".into(),
            ));
        }
        if self.limits.max_decode_alloc_mb == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_decode_alloc_mb must be > 0".into(),
            ));
        }
        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(ConfigError::ValidationError(
                "logging.format must be \"pretty\" or \"json\"".into(),
            ));
        }
        Ok(())
    }
}
