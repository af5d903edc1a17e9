use crate::error::{Result, ShortlistError};
use crate::utils::{is_writable_dir, ExtensionPolicy};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Where the client's shortlist comes from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilteredInput {
    /// A folder of reference images; their names form the shortlist.
    Directory(PathBuf),
    /// A text file with one file name per line.
    File(PathBuf),
}

impl FilteredInput {
    /// Resolve a path to a shortlist input, or `None` if it is neither a
    /// directory nor a regular file.
    pub fn resolve<P: AsRef<Path>>(path: P) -> Option<Self> {
        let path = path.as_ref();
        if path.is_dir() {
            Some(FilteredInput::Directory(path.to_path_buf()))
        } else if path.is_file() {
            Some(FilteredInput::File(path.to_path_buf()))
        } else {
            None
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            FilteredInput::Directory(path) | FilteredInput::File(path) => path,
        }
    }
}

/// Raw job parameters as typed by the user.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobRequest {
    pub selection: String,
    pub source: String,
    pub destination: String,
    pub include_sidecar: bool,
}

impl JobRequest {
    pub fn new(
        selection: impl Into<String>,
        source: impl Into<String>,
        destination: impl Into<String>,
        include_sidecar: bool,
    ) -> Self {
        Self {
            selection: selection.into(),
            source: source.into(),
            destination: destination.into(),
            include_sidecar,
        }
    }

    /// Check every path before anything touches the disk.
    pub fn validate(&self) -> Result<ValidatedJob> {
        let selection = self.selection.trim();
        let source = self.source.trim();
        let destination = self.destination.trim();

        for (label, value) in [
            ("Client selected photos", selection),
            ("Original photos", source),
            ("Destination", destination),
        ] {
            if value.is_empty() {
                return Err(ShortlistError::validation(format!(
                    "All directory fields must be filled ({} is empty)",
                    label
                )));
            }
        }

        let selection = FilteredInput::resolve(selection).ok_or_else(|| {
            ShortlistError::validation(format!("Invalid directory or file: {}", selection))
        })?;

        let source = PathBuf::from(source);
        if !source.is_dir() {
            return Err(ShortlistError::validation(format!(
                "Invalid directory: {}",
                source.display()
            )));
        }

        let destination = PathBuf::from(destination);
        if !destination.is_dir() {
            return Err(ShortlistError::validation(format!(
                "Invalid directory: {}",
                destination.display()
            )));
        }

        if !is_writable_dir(&destination) {
            return Err(ShortlistError::validation(format!(
                "No write permission for: {}",
                destination.display()
            )));
        }

        if same_directory(&source, &destination) {
            return Err(ShortlistError::validation(format!(
                "Destination must differ from the source folder: {}",
                destination.display()
            )));
        }

        Ok(ValidatedJob {
            selection,
            source,
            destination,
            policy: ExtensionPolicy::new(self.include_sidecar),
        })
    }
}

fn same_directory(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

/// A request whose paths have been checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatedJob {
    pub selection: FilteredInput,
    pub source: PathBuf,
    pub destination: PathBuf,
    pub policy: ExtensionPolicy,
}
