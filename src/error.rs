use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a job before or instead of copying.
///
/// Per-file copy failures are not represented here; they are collected as
/// [`crate::models::CopyError`] entries on the job report.
#[derive(Debug, Error)]
pub enum ShortlistError {
    /// A required path is blank, has the wrong type, or is not writable.
    #[error("{0}")]
    Validation(String),

    /// The shortlist (folder or text file) could not be read.
    #[error("Could not read shortlist {}: {}", .path.display(), .cause)]
    InputRead { path: PathBuf, cause: String },

    /// The source folder could not be listed.
    #[error("Could not list source folder {}: {}", .path.display(), .source)]
    Scan {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("A copy job is already processing")]
    AlreadyRunning,

    /// The worker task died without producing a report.
    #[error("Copy worker failed: {0}")]
    Worker(String),
}

impl ShortlistError {
    pub fn validation(message: impl Into<String>) -> Self {
        ShortlistError::Validation(message.into())
    }

    pub fn input_read(path: impl Into<PathBuf>, cause: impl ToString) -> Self {
        ShortlistError::InputRead {
            path: path.into(),
            cause: cause.to_string(),
        }
    }
}

pub type Result<T, E = ShortlistError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_are_human_readable() {
        let err = ShortlistError::input_read("/tmp/list.txt", "permission denied");
        assert_eq!(
            err.to_string(),
            "Could not read shortlist /tmp/list.txt: permission denied"
        );

        let err = ShortlistError::validation("Invalid directory: /nope");
        assert_eq!(err.to_string(), "Invalid directory: /nope");
    }
}
