pub mod candidate_scan;
pub mod copy_orchestrator;
pub mod filter_set;
pub mod progress_channel;

pub use candidate_scan::{scan_candidates, CandidateFile};
pub use copy_orchestrator::{
    copy_candidates, finish_job, run_job, CancelFlag, CopyConfig, CopyTally, JobHandle,
    Orchestrator,
};
pub use filter_set::{build_filter_set, FilterSet};
pub use progress_channel::{
    progress_channel, ProgressReceiver, ProgressSender, ProgressSink, RecordingSink,
};
