use filetime::FileTime;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;

/// Extensions of originals a studio delivers (RAW formats plus common images).
pub const MEDIA_EXTENSIONS: &[&str] = &["cr2", "cr3", "arw", "nef", "dng", "jpg", "jpeg", "png"];

/// Extension of the metadata sidecar that travels with an original.
pub const SIDECAR_EXTENSION: &str = "xmp";

/// Split a file name into its base and extension.
///
/// Only the final path component is considered. Leading dots never start an
/// extension, so `.hidden` has none; `a.b.c` splits into `a.b` and `c`, and a
/// trailing dot yields an empty extension.
pub fn split_name(name: &str) -> (&str, Option<&str>) {
    let component_start = name
        .rfind(|c| c == '/' || c == '\\')
        .map(|idx| idx + 1)
        .unwrap_or(0);
    let component = &name[component_start..];
    let leading_dots = component.len() - component.trim_start_matches('.').len();

    match component[leading_dots..].rfind('.') {
        Some(dot) => {
            let split_at = component_start + leading_dots + dot;
            (&name[..split_at], Some(&name[split_at + 1..]))
        }
        None => (name, None),
    }
}

/// Base name used for shortlist matching: extension stripped, lower-cased.
pub fn normalize_name(name: &str) -> String {
    split_name(name).0.to_lowercase()
}

/// How an extension relates to the copy policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExtensionClass {
    Media,
    Sidecar,
    Other,
}

/// Classify an extension (without the dot), ignoring case
pub fn classify_extension(extension: Option<&str>) -> ExtensionClass {
    let Some(ext) = extension else {
        return ExtensionClass::Other;
    };

    if MEDIA_EXTENSIONS.iter().any(|media| media.eq_ignore_ascii_case(ext)) {
        ExtensionClass::Media
    } else if SIDECAR_EXTENSION.eq_ignore_ascii_case(ext) {
        ExtensionClass::Sidecar
    } else {
        ExtensionClass::Other
    }
}

/// Which extension classes a run copies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionPolicy {
    pub include_sidecar: bool,
}

impl ExtensionPolicy {
    pub fn new(include_sidecar: bool) -> Self {
        Self { include_sidecar }
    }

    pub fn accepts(&self, class: ExtensionClass) -> bool {
        match class {
            ExtensionClass::Media => true,
            ExtensionClass::Sidecar => self.include_sidecar,
            ExtensionClass::Other => false,
        }
    }
}

/// Decode shortlist text as UTF-8, falling back to Latin-1.
///
/// Latin-1 maps every byte to the code point of the same value, so the
/// fallback always succeeds.
pub fn decode_text(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);

    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => {
            tracing::debug!("Shortlist is not valid UTF-8, decoding as Latin-1");
            bytes.iter().map(|&b| char::from(b)).collect()
        }
    }
}

/// Copy a file's bytes, then carry over its access and modification times.
///
/// An existing destination is overwritten, even when it is read-only.
pub fn copy_with_metadata<P: AsRef<Path>, Q: AsRef<Path>>(source: P, destination: Q) -> io::Result<u64> {
    let src_path = source.as_ref();
    let dest_path = destination.as_ref();

    if let Ok(existing) = fs::metadata(dest_path) {
        let mut permissions = existing.permissions();
        if existing.is_file() && permissions.readonly() {
            #[allow(clippy::permissions_set_readonly_false)]
            permissions.set_readonly(false);
            fs::set_permissions(dest_path, permissions)?;
        }
    }

    let bytes = fs::copy(src_path, dest_path)?;

    let metadata = fs::metadata(src_path)?;
    let accessed = FileTime::from_last_access_time(&metadata);
    let modified = FileTime::from_last_modification_time(&metadata);
    filetime::set_file_times(dest_path, accessed, modified)?;

    Ok(bytes)
}

/// Whether we can create files in `directory`.
///
/// A short-lived hidden file is created and removed, so ownership, mode bits
/// and ACLs are all judged by the OS exactly as the copy would be.
pub fn is_writable_dir<P: AsRef<Path>>(directory: P) -> bool {
    let dir_path = directory.as_ref();
    if !dir_path.is_dir() {
        return false;
    }

    match tempfile::Builder::new()
        .prefix(".shortlist-copy-")
        .tempfile_in(dir_path)
    {
        Ok(check_file) => {
            if let Err(e) = check_file.close() {
                tracing::warn!("Could not remove write check file in {}: {}", dir_path.display(), e);
            }
            true
        }
        Err(e) => {
            tracing::debug!("{} is not writable: {}", dir_path.display(), e);
            false
        }
    }
}
