pub mod job;
pub mod progress;
pub mod report;

pub use job::{FilteredInput, JobRequest, ValidatedJob};
pub use progress::ProgressEvent;
pub use report::{CopyError, JobOutcome, JobReport, JobState};
