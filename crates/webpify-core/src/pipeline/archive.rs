//! ZIP packaging for multi-file results.

use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use crate::error::ConvertError;

/// Packages named blobs into a single deflate-compressed ZIP archive.
#[derive(Debug, Clone, Default)]
pub struct ArchiveBuilder;

impl ArchiveBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Build an archive from `(name, bytes)` entries.
    ///
    /// Entries are flat members written in the given order. Timestamps are
    /// pinned to the ZIP epoch so identical input yields identical members.
    /// An empty slice produces a valid empty archive.
    pub fn build<N, B>(&self, entries: &[(N, B)]) -> Result<Vec<u8>, ConvertError>
    where
        N: AsRef<str>,
        B: AsRef<[u8]>,
    {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(DateTime::default());

        for (name, bytes) in entries {
            zip.start_file(name.as_ref(), options)?;
            zip.write_all(bytes.as_ref())
                .map_err(|e| ConvertError::Archive(e.to_string()))?;
        }

        let cursor = zip.finish()?;
        Ok(cursor.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use zip::ZipArchive;

    fn read_entries(bytes: Vec<u8>) -> Vec<(String, Vec<u8>)> {
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        (0..archive.len())
            .map(|i| {
                let mut file = archive.by_index(i).unwrap();
                let mut content = Vec::new();
                file.read_to_end(&mut content).unwrap();
                (file.name().to_string(), content)
            })
            .collect()
    }

    #[test]
    fn test_entries_preserve_order_and_content() {
        let entries = vec![
            ("b.webp", b"second-but-first".to_vec()),
            ("a.webp", b"alpha".to_vec()),
        ];
        let bytes = ArchiveBuilder::new().build(&entries).unwrap();
        let read = read_entries(bytes);

        assert_eq!(read.len(), 2);
        assert_eq!(read[0], ("b.webp".to_string(), b"second-but-first".to_vec()));
        assert_eq!(read[1], ("a.webp".to_string(), b"alpha".to_vec()));
    }

    #[test]
    fn test_entries_are_deflated() {
        let entries = vec![("big.webp", vec![0u8; 4096])];
        let bytes = ArchiveBuilder::new().build(&entries).unwrap();
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let file = archive.by_index(0).unwrap();
        assert_eq!(file.compression(), CompressionMethod::Deflated);
        assert!(file.compressed_size() < file.size());
    }

    #[test]
    fn test_empty_archive_is_valid() {
        let entries: Vec<(String, Vec<u8>)> = Vec::new();
        let bytes = ArchiveBuilder::new().build(&entries).unwrap();
        let archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 0);
    }

    #[test]
    fn test_building_twice_yields_same_members() {
        let entries = vec![("x.webp", vec![1u8, 2, 3]), ("y.webp", vec![4u8; 100])];
        let builder = ArchiveBuilder::new();
        let first = read_entries(builder.build(&entries).unwrap());
        let second = read_entries(builder.build(&entries).unwrap());
        assert_eq!(first, second);
    }

    #[test]
    fn test_duplicate_names_are_rejected() {
        let entries = vec![("x.webp", vec![1u8]), ("x.webp", vec![2u8])];
        let err = ArchiveBuilder::new().build(&entries).unwrap_err();
        assert!(matches!(err, ConvertError::Archive(_)));
    }
}
