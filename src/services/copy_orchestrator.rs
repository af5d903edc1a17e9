use crate::error::{Result, ShortlistError};
use crate::models::{CopyError, JobReport, JobRequest, JobState, ProgressEvent, ValidatedJob};
use crate::services::candidate_scan::scan_candidates;
use crate::services::filter_set::build_filter_set;
use crate::services::progress_channel::{progress_channel, ProgressReceiver, ProgressSender, ProgressSink};
use crate::utils::copy_with_metadata;
use chrono::Utc;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Configuration for copy jobs
#[derive(Debug, Clone)]
pub struct CopyConfig {
    /// Emit a "Copying files" status line every this many files.
    pub progress_interval: usize,
    /// How many per-file errors a summary lists before "... and N more".
    pub error_preview_limit: usize,
    /// How often a front-end should poll for events, in milliseconds.
    pub poll_interval_ms: u64,
}

impl Default for CopyConfig {
    fn default() -> Self {
        Self {
            progress_interval: 5,
            error_preview_limit: 10,
            poll_interval_ms: 50,
        }
    }
}

/// Cooperative cancellation shared between a front-end and the worker.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Counters for one pass over the candidate list.
#[derive(Debug, Default)]
pub struct CopyTally {
    pub successful_copies: usize,
    pub errors: Vec<CopyError>,
    pub cancelled: bool,
}

/// Copy `file_names` from `source_dir` into `dest_dir`, one at a time.
///
/// A failed file is recorded and skipped. Cancellation is checked before
/// each file; whatever was copied stays copied.
pub fn copy_candidates(
    file_names: &[String],
    source_dir: &Path,
    dest_dir: &Path,
    cancel: &CancelFlag,
    sink: &dyn ProgressSink,
    progress_interval: usize,
) -> CopyTally {
    let total = file_names.len();
    let interval = progress_interval.max(1);
    let mut tally = CopyTally::default();

    sink.emit(ProgressEvent::progress(0, total));

    for (idx, file_name) in file_names.iter().enumerate() {
        let current = idx + 1;

        if cancel.is_requested() {
            info!("Cancellation requested, stopping after {} files", idx);
            sink.emit(ProgressEvent::status("Cancelling operation..."));
            tally.cancelled = true;
            break;
        }

        let source = source_dir.join(file_name);
        let destination = dest_dir.join(file_name);

        match copy_with_metadata(&source, &destination) {
            Ok(bytes) => {
                tally.successful_copies += 1;
                debug!("Copied {} ({} bytes)", file_name, bytes);
            }
            Err(e) => {
                error!(
                    "Failed to copy {} to {}: {}",
                    source.display(),
                    destination.display(),
                    e
                );
                tally.errors.push(CopyError {
                    file_name: file_name.clone(),
                    source,
                    destination,
                    error: e.to_string(),
                });
            }
        }

        sink.emit(ProgressEvent::progress(current, total));
        if current % interval == 0 || current == total {
            sink.emit(ProgressEvent::status(format!(
                "Copying files: {}/{}",
                current, total
            )));
        }
    }

    tally
}

/// Run a validated job end to end on the calling thread.
///
/// Returns the report, or the fatal error that stopped the job before any
/// file was copied. Does not emit the terminal events; see [`finish_job`].
pub fn run_job(
    job_id: Uuid,
    job: &ValidatedJob,
    config: &CopyConfig,
    cancel: &CancelFlag,
    sink: &dyn ProgressSink,
) -> Result<JobReport> {
    let started_at = Utc::now();
    info!("Starting copy job {}", job_id);

    let filter = build_filter_set(&job.selection)?;
    let candidates = scan_candidates(&job.source, &filter, &job.policy)?;

    if candidates.is_empty() {
        warn!("No matching files found in {}", job.source.display());
        sink.emit(ProgressEvent::status("No matching files found!"));
        return Ok(JobReport::empty(job_id, started_at));
    }

    if !job.destination.is_dir() {
        return Err(ShortlistError::validation(format!(
            "Invalid directory: {}",
            job.destination.display()
        )));
    }

    let file_names: Vec<String> = candidates.into_iter().map(|c| c.file_name).collect();
    let total = file_names.len();
    info!(
        "Copying {} files from {} to {}",
        total,
        job.source.display(),
        job.destination.display()
    );

    let tally = copy_candidates(
        &file_names,
        &job.source,
        &job.destination,
        cancel,
        sink,
        config.progress_interval,
    );

    let report = JobReport {
        job_id,
        started_at,
        finished_at: Utc::now(),
        total,
        successful_copies: tally.successful_copies,
        errors: tally.errors,
        cancelled: tally.cancelled,
    };

    info!(
        "Copy job {} finished. Success: {}, Errors: {}, Cancelled: {}",
        job_id,
        report.successful_copies,
        report.failed_count(),
        report.cancelled
    );

    Ok(report)
}

/// Emit the events that close every job, whatever its result.
///
/// The progress bar always reaches 100% and the status line is cleared last.
pub fn finish_job(result: &Result<JobReport>, sink: &dyn ProgressSink) -> JobState {
    let (state, total) = match result {
        Ok(report) if report.cancelled => (JobState::Cancelled, report.total),
        Ok(report) => (JobState::Completed, report.total),
        Err(e) => {
            error!("Operation failed: {}", e);
            sink.emit(ProgressEvent::status(format!("Error: {}", e)));
            (JobState::Failed, 0)
        }
    };

    sink.emit(ProgressEvent::progress(total, total));
    sink.emit(ProgressEvent::status(""));
    state
}

/// Marks the job failed if the worker unwinds before recording a state, and
/// still closes the event stream for whoever is polling.
struct StateGuard {
    state: Arc<Mutex<JobState>>,
    channel: ProgressSender,
}

impl Drop for StateGuard {
    fn drop(&mut self) {
        let mut state = lock(&self.state);
        if !state.is_running() {
            return;
        }
        *state = JobState::Failed;
        drop(state);

        error!("Copy worker stopped unexpectedly");
        self.channel
            .emit(ProgressEvent::status("Error: copy worker stopped unexpectedly"));
        self.channel.emit(ProgressEvent::progress(0, 0));
        self.channel.emit(ProgressEvent::status(""));
    }
}

/// Worker-side sink: the poll channel plus an optional pushed-to observer.
#[derive(Clone)]
struct JobSink {
    channel: ProgressSender,
    observer: Option<Arc<dyn ProgressSink>>,
}

impl ProgressSink for JobSink {
    fn emit(&self, event: ProgressEvent) {
        if let Some(observer) = &self.observer {
            observer.emit(event.clone());
        }
        self.channel.emit(event);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// A job running on the blocking pool.
#[derive(Debug)]
pub struct JobHandle {
    job_id: Uuid,
    handle: JoinHandle<Result<JobReport>>,
}

impl JobHandle {
    pub fn job_id(&self) -> Uuid {
        self.job_id
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the terminal report.
    pub async fn wait(self) -> Result<JobReport> {
        self.handle
            .await
            .unwrap_or_else(|e| Err(ShortlistError::Worker(format!("Task join error: {}", e))))
    }
}

/// Owns the state of at most one running copy job at a time.
pub struct Orchestrator {
    config: CopyConfig,
    state: Arc<Mutex<JobState>>,
    cancel: CancelFlag,
    sender: ProgressSender,
    receiver: Mutex<ProgressReceiver>,
    observer: Option<Arc<dyn ProgressSink>>,
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new(CopyConfig::default())
    }
}

impl Orchestrator {
    pub fn new(config: CopyConfig) -> Self {
        let (sender, receiver) = progress_channel();
        Self {
            config,
            state: Arc::new(Mutex::new(JobState::Idle)),
            cancel: CancelFlag::new(),
            sender,
            receiver: Mutex::new(receiver),
            observer: None,
        }
    }

    /// Like [`Orchestrator::new`], but every event is also pushed to
    /// `observer` from the worker thread as it happens.
    ///
    /// Polling keeps working; the observer sees events before the queue does.
    pub fn with_observer(config: CopyConfig, observer: Arc<dyn ProgressSink>) -> Self {
        Self {
            observer: Some(observer),
            ..Self::new(config)
        }
    }

    pub fn state(&self) -> JobState {
        *lock(&self.state)
    }

    /// Validate `request` and start copying in the background.
    ///
    /// Fails with [`ShortlistError::AlreadyRunning`] while another job is in
    /// flight, and with a validation error before anything is touched.
    ///
    /// # Panics
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(&self, request: JobRequest) -> Result<JobHandle> {
        let mut state = lock(&self.state);
        if state.is_running() {
            warn!("Rejecting new job: already processing");
            return Err(ShortlistError::AlreadyRunning);
        }

        let job = request.validate()?;
        let job_id = Uuid::new_v4();

        // Reset before anyone can see Running, so an early cancel() sticks.
        self.cancel.reset();
        *state = JobState::Running;
        drop(state);

        let config = self.config.clone();
        let cancel = self.cancel.clone();
        let sink = JobSink {
            channel: self.sender.clone(),
            observer: self.observer.clone(),
        };
        let guard = StateGuard {
            state: Arc::clone(&self.state),
            channel: self.sender.clone(),
        };

        let handle = tokio::task::spawn_blocking(move || {
            let result = run_job(job_id, &job, &config, &cancel, &sink);
            let final_state = finish_job(&result, &sink);

            *lock(&guard.state) = final_state;
            result
        });

        Ok(JobHandle { job_id, handle })
    }

    /// Ask the running job to stop before its next file.
    ///
    /// Returns `false` when nothing is running.
    pub fn cancel(&self) -> bool {
        if !self.state().is_running() {
            return false;
        }
        info!("Cancellation requested");
        self.cancel.request();
        true
    }

    /// Flag a front-end can hold on to, e.g. for a signal handler.
    pub fn cancel_handle(&self) -> CancelFlag {
        self.cancel.clone()
    }

    /// Every event emitted since the last poll, oldest first.
    pub fn poll(&self) -> Vec<ProgressEvent> {
        lock(&self.receiver).drain()
    }
}
