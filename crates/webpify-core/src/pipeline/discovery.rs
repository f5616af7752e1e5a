//! File discovery for finding convertible images in directories.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::validate::FormatValidator;

/// Finds files whose names pass the conversion allow-list.
///
/// Symbolic links are not followed unless enabled with
/// [`FileDiscovery::follow_links`], so a link into the output directory
/// cannot feed converted files back in as sources.
pub struct FileDiscovery {
    validator: FormatValidator,
    follow_links: bool,
}

/// Information about a discovered file.
#[derive(Debug, Clone)]
pub struct DiscoveredFile {
    /// Full path to the file
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
}

impl DiscoveredFile {
    /// The file's name as it would be uploaded.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

impl FileDiscovery {
    pub fn new(validator: FormatValidator) -> Self {
        Self {
            validator,
            follow_links: false,
        }
    }

    /// Descend into symlinked directories and accept symlinked files.
    pub fn follow_links(mut self, follow: bool) -> Self {
        self.follow_links = follow;
        self
    }

    /// Collect convertible files under `path`, in path order.
    ///
    /// A file path yields itself if its extension is allowed. Unreadable
    /// entries are skipped with a debug log.
    pub fn discover(&self, path: &Path) -> Vec<DiscoveredFile> {
        WalkDir::new(path)
            .follow_links(self.follow_links)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    tracing::debug!("Skipping unreadable entry: {}", e);
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file() && self.is_supported(entry.path()))
            .filter_map(|entry| {
                let size = entry.metadata().ok()?.len();
                Some(DiscoveredFile {
                    path: entry.into_path(),
                    size,
                })
            })
            .collect()
    }

    fn is_supported(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|name| self.validator.is_valid_format(name))
    }

    /// Combined size of `files` in bytes.
    pub fn total_size(files: &[DiscoveredFile]) -> u64 {
        files.iter().map(|f| f.size).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_supported() {
        let discovery = FileDiscovery::new(FormatValidator::default());

        assert!(discovery.is_supported(Path::new("test.jpg")));
        assert!(discovery.is_supported(Path::new("test.JPG")));
        assert!(discovery.is_supported(Path::new("test.tif")));
        assert!(discovery.is_supported(Path::new("test.gif")));
        assert!(!discovery.is_supported(Path::new("test.txt")));
        assert!(!discovery.is_supported(Path::new("test.heic")));
    }

    #[test]
    fn test_discover_directory_sorted() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("b.png"), b"b").unwrap();
        std::fs::write(dir.path().join("a.jpg"), b"aa").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"skip").unwrap();
        std::fs::write(dir.path().join("nested/c.gif"), b"ccc").unwrap();

        let discovery = FileDiscovery::new(FormatValidator::default());
        let files = discovery.discover(dir.path());
        let names: Vec<String> = files.iter().map(|f| f.file_name()).collect();

        assert_eq!(names, vec!["a.jpg", "b.png", "c.gif"]);
        assert_eq!(FileDiscovery::total_size(&files), 6);
    }

    #[test]
    fn test_discover_single_file() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("photo.webp");
        let other = dir.path().join("photo.exe");
        std::fs::write(&image, b"x").unwrap();
        std::fs::write(&other, b"x").unwrap();

        let discovery = FileDiscovery::new(FormatValidator::default());
        assert_eq!(discovery.discover(&image).len(), 1);
        assert!(discovery.discover(&other).is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinks_followed_only_when_enabled() {
        let dir = tempfile::tempdir().unwrap();
        let outside = tempfile::tempdir().unwrap();
        std::fs::write(outside.path().join("linked.png"), b"x").unwrap();
        std::os::unix::fs::symlink(outside.path(), dir.path().join("link")).unwrap();
        std::fs::write(dir.path().join("own.png"), b"x").unwrap();

        let discovery = FileDiscovery::new(FormatValidator::default());
        let names: Vec<String> = discovery
            .discover(dir.path())
            .iter()
            .map(|f| f.file_name())
            .collect();
        assert_eq!(names, vec!["own.png"]);

        let discovery = FileDiscovery::new(FormatValidator::default()).follow_links(true);
        let names: Vec<String> = discovery
            .discover(dir.path())
            .iter()
            .map(|f| f.file_name())
            .collect();
        assert_eq!(names, vec!["linked.png", "own.png"]);
    }
}
