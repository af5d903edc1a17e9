use serde::{Deserialize, Serialize};
use std::fmt;

/// One update from a running job to whoever is watching it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum ProgressEvent {
    Progress { current: usize, total: usize },
    /// Free-form status line; an empty string clears the display.
    Status(String),
}

impl ProgressEvent {
    pub fn progress(current: usize, total: usize) -> Self {
        ProgressEvent::Progress { current, total }
    }

    pub fn status(message: impl Into<String>) -> Self {
        ProgressEvent::Status(message.into())
    }

    /// Completed fraction in `0.0..=1.0`. A job with nothing to copy counts as done.
    pub fn fraction(&self) -> Option<f64> {
        match *self {
            ProgressEvent::Progress { total: 0, .. } => Some(1.0),
            ProgressEvent::Progress { current, total } => Some(current.min(total) as f64 / total as f64),
            ProgressEvent::Status(_) => None,
        }
    }
}

impl fmt::Display for ProgressEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgressEvent::Progress { current, total } => {
                write!(f, "Copying files: {}/{}", current, total)
            }
            ProgressEvent::Status(message) => f.write_str(message),
        }
    }
}
