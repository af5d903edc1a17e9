use crate::error::{Result, ShortlistError};
use crate::services::filter_set::FilterSet;
use crate::utils::{classify_extension, split_name, ExtensionClass, ExtensionPolicy};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// A source file selected for copying
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateFile {
    /// Name exactly as found on disk; the copy keeps it.
    pub file_name: String,
    pub base_name: String,
    pub extension: Option<String>,
    pub class: ExtensionClass,
}

impl CandidateFile {
    pub fn from_name(file_name: &str) -> Self {
        let (base, extension) = split_name(file_name);
        Self {
            file_name: file_name.to_string(),
            base_name: base.to_lowercase(),
            extension: extension.map(str::to_lowercase),
            class: classify_extension(extension),
        }
    }

    /// Selected iff the base is shortlisted and the policy takes the extension.
    pub fn is_selected(&self, filter: &FilterSet, policy: &ExtensionPolicy) -> bool {
        filter.contains(&self.base_name) && policy.accepts(self.class)
    }
}

/// List the source folder and keep the files the shortlist asks for.
///
/// Order follows directory enumeration. Non-recursive; only regular files
/// (or links to them) are considered.
pub fn scan_candidates<P: AsRef<Path>>(
    source_dir: P,
    filter: &FilterSet,
    policy: &ExtensionPolicy,
) -> Result<Vec<CandidateFile>> {
    let dir_path = source_dir.as_ref();

    let entries = fs::read_dir(dir_path).map_err(|source| ShortlistError::Scan {
        path: dir_path.to_path_buf(),
        source,
    })?;

    let mut candidates = Vec::new();
    let mut seen = 0usize;

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry in {}: {}", dir_path.display(), e);
                continue;
            }
        };

        if !entry.path().is_file() {
            continue;
        }
        seen += 1;

        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            warn!("Skipping file with non UTF-8 name: {:?}", file_name);
            continue;
        };

        let candidate = CandidateFile::from_name(name);
        if candidate.is_selected(filter, policy) {
            debug!("Selected {}", candidate.file_name);
            candidates.push(candidate);
        }
    }

    info!(
        "Scanned {} files in {}, {} match the shortlist",
        seen,
        dir_path.display(),
        candidates.len()
    );

    Ok(candidates)
}
