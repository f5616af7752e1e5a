//! Filename validation before any decode work.

use crate::config::ConversionConfig;
use crate::error::ConvertError;

/// Checks upload filenames against the extension allow-list.
///
/// This is advisory pre-filtering; the decoder has the final say on content.
#[derive(Debug, Clone)]
pub struct FormatValidator {
    allowed: Vec<String>,
}

impl FormatValidator {
    /// Create a validator from the conversion settings.
    pub fn new(config: &ConversionConfig) -> Self {
        Self::with_extensions(&config.allowed_extensions)
    }

    /// Create a validator from an explicit extension list.
    ///
    /// Entries are normalized to lowercase; a leading dot is tolerated.
    pub fn with_extensions<S: AsRef<str>>(extensions: &[S]) -> Self {
        let allowed = extensions
            .iter()
            .map(|ext| ext.as_ref().trim_start_matches('.').to_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect();
        Self { allowed }
    }

    /// Check whether the filename's last extension is allowed.
    ///
    /// Empty names and names without a dot are rejected.
    pub fn is_valid_format(&self, filename: &str) -> bool {
        let Some((_, ext)) = filename.rsplit_once('.') else {
            return false;
        };
        let ext = ext.to_lowercase();
        self.allowed.iter().any(|allowed| *allowed == ext)
    }

    /// Check a whole batch, failing on the first disallowed filename.
    pub fn validate_batch<S: AsRef<str>>(&self, filenames: &[S]) -> Result<(), ConvertError> {
        match filenames
            .iter()
            .map(AsRef::as_ref)
            .find(|name| !self.is_valid_format(name))
        {
            Some(name) => Err(ConvertError::UnsupportedFormat {
                filename: name.to_string(),
            }),
            None => Ok(()),
        }
    }

    /// The normalized allow-list.
    pub fn allowed_extensions(&self) -> &[String] {
        &self.allowed
    }
}

impl Default for FormatValidator {
    fn default() -> Self {
        Self::new(&ConversionConfig::default())
    }
}
