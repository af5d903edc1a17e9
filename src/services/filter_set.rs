use crate::error::{Result, ShortlistError};
use crate::models::FilteredInput;
use crate::utils::{decode_text, normalize_name};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Normalized base names a job matches against.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet {
    names: HashSet<String>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a raw file name; it is normalized before insertion.
    pub fn insert_name(&mut self, name: &str) -> bool {
        self.names.insert(normalize_name(name))
    }

    /// Membership test for an already-normalized base name.
    pub fn contains(&self, base_name: &str) -> bool {
        self.names.contains(base_name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

impl<'a> FromIterator<&'a str> for FilterSet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut set = FilterSet::new();
        for name in iter {
            set.insert_name(name);
        }
        set
    }
}

/// Build the filter set from a shortlist folder or text file.
pub fn build_filter_set(input: &FilteredInput) -> Result<FilterSet> {
    let set = match input {
        FilteredInput::Directory(path) => names_from_directory(path)?,
        FilteredInput::File(path) => names_from_text_file(path)?,
    };

    info!(
        "Shortlist {} yields {} unique base names",
        input.path().display(),
        set.len()
    );
    if set.is_empty() {
        warn!("Shortlist is empty, no files will match");
    }

    Ok(set)
}

fn names_from_directory(directory: &Path) -> Result<FilterSet> {
    let entries =
        fs::read_dir(directory).map_err(|e| ShortlistError::input_read(directory, e))?;

    let mut set = FilterSet::new();
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry in {}: {}", directory.display(), e);
                continue;
            }
        };

        if !entry.path().is_file() {
            continue;
        }

        let file_name = entry.file_name();
        set.insert_name(&file_name.to_string_lossy());
    }

    Ok(set)
}

fn names_from_text_file(file: &Path) -> Result<FilterSet> {
    if !file.is_file() {
        return Err(ShortlistError::input_read(file, "not a directory or regular file"));
    }

    let bytes = fs::read(file).map_err(|e| ShortlistError::input_read(file, e))?;
    let text = decode_text(&bytes);

    let set: FilterSet = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    debug!("Read {} names from {}", set.len(), file.display());
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_directory_names_are_deduplicated_case_insensitively() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("Photo1.jpg"), b"").unwrap();
        fs::write(dir.path().join("photo1.png"), b"").unwrap();

        let set = build_filter_set(&FilteredInput::Directory(dir.path().to_path_buf())).unwrap();
        assert_eq!(set.len(), 1);
        assert!(set.contains("photo1"));
    }

    #[test]
    fn test_directory_ignores_subdirectories() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("IMG_10.jpg"), b"").unwrap();
        fs::create_dir(dir.path().join("IMG_11.jpg")).unwrap();
        fs::write(dir.path().join("IMG_11.jpg").join("IMG_12.jpg"), b"").unwrap();

        let set = build_filter_set(&FilteredInput::Directory(dir.path().to_path_buf())).unwrap();
        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["img_10"]);
    }

    #[test]
    fn test_text_file_lines() {
        let dir = tempdir().unwrap();
        let list = dir.path().join("picks.txt");
        fs::write(&list, "  IMG_001.JPG \r\n\r\nimg_002\n   \nIMG_001.cr2\narchive.v2.jpg\n").unwrap();

        let set = build_filter_set(&FilteredInput::File(list)).unwrap();
        assert_eq!(set.len(), 3);
        assert!(set.contains("img_001"));
        assert!(set.contains("img_002"));
        assert!(set.contains("archive.v2"));
    }

    #[test]
    fn test_text_file_in_latin1() {
        let dir = tempdir().unwrap();
        let list = dir.path().join("picks.txt");
        fs::write(&list, b"Mari\xE9e_01.jpg\n").unwrap();

        let set = build_filter_set(&FilteredInput::File(list)).unwrap();
        assert!(set.contains("mariée_01"));
    }

    #[test]
    fn test_empty_file_yields_empty_set() {
        let dir = tempdir().unwrap();
        let list = dir.path().join("picks.txt");
        fs::write(&list, "\n\n").unwrap();

        let set = build_filter_set(&FilteredInput::File(list)).unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn test_missing_input_is_input_read_error() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("gone.txt");

        let err = build_filter_set(&FilteredInput::File(missing.clone())).unwrap_err();
        assert!(matches!(err, ShortlistError::InputRead { ref path, .. } if *path == missing));

        let err = build_filter_set(&FilteredInput::Directory(missing)).unwrap_err();
        assert!(matches!(err, ShortlistError::InputRead { .. }));
    }
}
