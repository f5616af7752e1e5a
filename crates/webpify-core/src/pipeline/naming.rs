//! Output filename derivation.
//!
//! Converted files keep the uploaded stem and take the `.webp` extension:
//! - `photo.png` → `photo.webp`
//! - `archive.tar.png` → `archive.tar.webp` (only the last extension goes)
//! - `README` → `README.webp`
//! - `uploads/cat.gif` → `cat.webp` (directories are dropped)
//!
//! Within an archive, repeated names get a numeric suffix so no entry is lost:
//! `photo.webp`, `photo-2.webp`, `photo-3.webp`.

use std::collections::HashSet;

use crate::types::WEBP_EXTENSION;

/// Derive the converted filename for an uploaded filename.
pub fn output_name(filename: &str) -> String {
    let base = basename(filename);
    let stem = match base.rsplit_once('.') {
        Some((stem, _)) => stem,
        None => base,
    };
    format!("{}.{}", stem, WEBP_EXTENSION)
}

/// Strip any directory components, accepting both separator styles.
fn basename(filename: &str) -> &str {
    filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename)
}

/// Make every name unique, preserving order.
///
/// Comparison is case-insensitive so archives extract cleanly on
/// case-insensitive filesystems. The first occurrence keeps its name.
pub fn disambiguate(names: Vec<String>) -> Vec<String> {
    disambiguate_against(names, std::iter::empty::<&str>())
}

/// Like [`disambiguate`], but every name in `reserved` is already taken.
///
/// Used when writing into a directory whose existing files must survive.
pub fn disambiguate_against<I, S>(names: Vec<String>, reserved: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut taken: HashSet<String> = reserved
        .into_iter()
        .map(|name| name.as_ref().to_lowercase())
        .collect();
    let mut result = Vec::with_capacity(names.len());

    for name in names {
        if taken.insert(name.to_lowercase()) {
            result.push(name);
            continue;
        }

        let (stem, ext) = match name.rsplit_once('.') {
            Some((stem, ext)) => (stem, Some(ext)),
            None => (name.as_str(), None),
        };
        let mut counter = 2;
        loop {
            let candidate = match ext {
                Some(ext) => format!("{}-{}.{}", stem, counter, ext),
                None => format!("{}-{}", stem, counter),
            };
            if taken.insert(candidate.to_lowercase()) {
                result.push(candidate);
                break;
            }
            counter += 1;
        }
    }

    result
}
