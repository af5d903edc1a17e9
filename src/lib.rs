pub mod error;
pub mod models;
pub mod services;
pub mod utils;

// Re-export commonly used types
pub use error::ShortlistError;
pub use models::{
    CopyError, FilteredInput, JobOutcome, JobReport, JobRequest, JobState, ProgressEvent,
    ValidatedJob,
};
pub use services::{
    build_filter_set, scan_candidates, CancelFlag, CandidateFile, CopyConfig, FilterSet,
    JobHandle, Orchestrator, ProgressSink,
};
pub use utils::ExtensionPolicy;

// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub copy: CopyConfig,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            copy: CopyConfig::default(),
            log_level: "info".to_string(),
        }
    }
}
