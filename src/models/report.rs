use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use uuid::Uuid;

/// Lifecycle of the orchestrator's current (or last) job
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobState {
    #[default]
    Idle,
    Running,
    Completed,
    Cancelled,
    Failed,
}

impl JobState {
    pub fn is_running(&self) -> bool {
        matches!(self, JobState::Running)
    }
}

/// How a finished job should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobOutcome {
    /// The shortlist matched nothing in the source folder.
    NothingToDo,
    Completed,
    /// Every file was attempted but some copies failed.
    PartialFailure,
    /// Every file was attempted and none could be copied.
    AllFailed,
    Cancelled,
}

/// A single file that could not be copied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyError {
    pub file_name: String,
    pub source: PathBuf,
    pub destination: PathBuf,
    pub error: String,
}

impl fmt::Display for CopyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Failed to copy {}: {}", self.file_name, self.error)
    }
}

/// Final accounting for one job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobReport {
    pub job_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Candidates enumerated when the job started.
    pub total: usize,
    pub successful_copies: usize,
    pub errors: Vec<CopyError>,
    pub cancelled: bool,
}

impl JobReport {
    pub fn empty(job_id: Uuid, started_at: DateTime<Utc>) -> Self {
        Self {
            job_id,
            started_at,
            finished_at: Utc::now(),
            total: 0,
            successful_copies: 0,
            errors: Vec::new(),
            cancelled: false,
        }
    }

    pub fn outcome(&self) -> JobOutcome {
        if self.cancelled {
            JobOutcome::Cancelled
        } else if self.total == 0 {
            JobOutcome::NothingToDo
        } else if !self.errors.is_empty() && self.successful_copies == 0 {
            JobOutcome::AllFailed
        } else if !self.errors.is_empty() {
            JobOutcome::PartialFailure
        } else {
            JobOutcome::Completed
        }
    }

    pub fn failed_count(&self) -> usize {
        self.errors.len()
    }

    pub fn total_processed(&self) -> usize {
        self.successful_copies + self.errors.len()
    }

    pub fn success_rate(&self) -> f64 {
        let total = self.total_processed();
        if total == 0 {
            0.0
        } else {
            self.successful_copies as f64 / total as f64
        }
    }

    /// The first `limit` error messages, plus a "... and N more" line when
    /// the list was cut short.
    pub fn error_preview(&self, limit: usize) -> Vec<String> {
        let mut lines: Vec<String> = self.errors.iter().take(limit).map(ToString::to_string).collect();
        if self.errors.len() > limit {
            lines.push(format!("... and {} more errors", self.errors.len() - limit));
        }
        lines
    }

    /// Terminal message for the user, with at most `limit` errors listed.
    pub fn summary(&self, limit: usize) -> String {
        match self.outcome() {
            JobOutcome::NothingToDo => "No matching files found to copy!".to_string(),
            JobOutcome::Cancelled => format!(
                "Operation cancelled. {} files were copied.",
                self.successful_copies
            ),
            JobOutcome::PartialFailure => format!(
                "Copied {}/{} files.\n\nErrors encountered:\n{}",
                self.successful_copies,
                self.total,
                self.error_preview(limit).join("\n")
            ),
            JobOutcome::AllFailed => format!(
                "No files were copied ({} errors).\n\nErrors encountered:\n{}",
                self.errors.len(),
                self.error_preview(limit).join("\n")
            ),
            JobOutcome::Completed => {
                format!("Copied {} files successfully!", self.successful_copies)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(total: usize, successful: usize, failures: usize) -> JobReport {
        let mut report = JobReport::empty(Uuid::new_v4(), Utc::now());
        report.total = total;
        report.successful_copies = successful;
        report.errors = (0..failures)
            .map(|i| CopyError {
                file_name: format!("IMG_{}.cr2", i),
                source: PathBuf::from(format!("/raw/IMG_{}.cr2", i)),
                destination: PathBuf::from(format!("/job/IMG_{}.cr2", i)),
                error: "No space left on device".to_string(),
            })
            .collect();
        report
    }

    #[test]
    fn test_outcome() {
        assert_eq!(report(0, 0, 0).outcome(), JobOutcome::NothingToDo);
        assert_eq!(report(3, 3, 0).outcome(), JobOutcome::Completed);
        assert_eq!(report(3, 2, 1).outcome(), JobOutcome::PartialFailure);
        assert_eq!(report(3, 0, 3).outcome(), JobOutcome::AllFailed);

        let mut cancelled = report(5, 2, 0);
        cancelled.cancelled = true;
        assert_eq!(cancelled.outcome(), JobOutcome::Cancelled);
    }

    #[test]
    fn test_error_preview_caps_and_summarizes() {
        let report = report(15, 3, 12);
        let preview = report.error_preview(10);

        assert_eq!(preview.len(), 11);
        assert_eq!(preview[0], "Failed to copy IMG_0.cr2: No space left on device");
        assert_eq!(preview[10], "... and 2 more errors");
    }

    #[test]
    fn test_summary_messages() {
        assert_eq!(report(2, 2, 0).summary(10), "Copied 2 files successfully!");
        assert_eq!(report(0, 0, 0).summary(10), "No matching files found to copy!");

        let partial = report(5, 4, 1).summary(10);
        assert!(partial.starts_with("Copied 4/5 files."));
        assert!(partial.ends_with("Failed to copy IMG_0.cr2: No space left on device"));

        let failed = report(2, 0, 2).summary(10);
        assert!(failed.starts_with("No files were copied (2 errors)."));
        assert!(failed.ends_with("Failed to copy IMG_1.cr2: No space left on device"));

        let mut cancelled = report(5, 2, 0);
        cancelled.cancelled = true;
        assert_eq!(cancelled.summary(10), "Operation cancelled. 2 files were copied.");
    }

    #[test]
    fn test_success_rate() {
        assert_eq!(report(0, 0, 0).success_rate(), 0.0);
        assert_eq!(report(4, 3, 1).success_rate(), 0.75);
    }
}
