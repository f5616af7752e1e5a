//! Command-line subcommands.

pub mod config;
pub mod convert;
pub mod serve;

use std::path::{Path, PathBuf};

use webpify_core::Config;

/// Expand a leading `~` in a user-supplied path.
pub fn expand_path(path: &Path) -> PathBuf {
    let path_str = path.to_string_lossy();
    let expanded = shellexpand::tilde(&path_str);
    PathBuf::from(expanded.into_owned())
}

/// Resolve the config file to use: the explicit path if given, otherwise the default.
pub fn config_path(explicit: Option<&Path>) -> PathBuf {
    explicit.map(expand_path).unwrap_or_else(Config::default_path)
}

/// Load configuration from an explicit path, or the default location.
///
/// An explicit path must exist; the default location may be absent.
pub fn load_config(explicit: Option<&Path>) -> anyhow::Result<Config> {
    match explicit {
        Some(path) => Ok(Config::load_from(&expand_path(path))?),
        None => Ok(Config::load()?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_path_leaves_plain_paths() {
        assert_eq!(expand_path(Path::new("/tmp/x.toml")), PathBuf::from("/tmp/x.toml"));
    }

    #[test]
    fn test_explicit_config_path_wins() {
        assert_eq!(
            config_path(Some(Path::new("/etc/webpify.toml"))),
            PathBuf::from("/etc/webpify.toml")
        );
        assert_eq!(config_path(None), Config::default_path());
    }

    #[test]
    fn test_load_explicit_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[conversion]\ndefault_quality = 60\n").unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.conversion.default_quality, 60);
    }

    #[test]
    fn test_missing_explicit_config_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_config(Some(&dir.path().join("nope.toml"))).is_err());
    }
}
