use crate::models::ProgressEvent;
use std::sync::Mutex;
use tokio::sync::mpsc::{self, error::TryRecvError, UnboundedReceiver, UnboundedSender};

/// Anything that can receive job progress.
///
/// The copy loop only talks to this trait, so a UI queue, a logger, or a
/// test recorder can all observe a job.
pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: ProgressEvent);
}

/// Create an unbounded FIFO pair for progress events.
pub fn progress_channel() -> (ProgressSender, ProgressReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ProgressSender { tx }, ProgressReceiver { rx })
}

#[derive(Debug, Clone)]
pub struct ProgressSender {
    tx: UnboundedSender<ProgressEvent>,
}

impl ProgressSink for ProgressSender {
    fn emit(&self, event: ProgressEvent) {
        if self.tx.send(event).is_err() {
            tracing::trace!("Progress receiver dropped, event discarded");
        }
    }
}

#[derive(Debug)]
pub struct ProgressReceiver {
    rx: UnboundedReceiver<ProgressEvent>,
}

impl ProgressReceiver {
    /// Take every event queued so far without blocking.
    pub fn drain(&mut self) -> Vec<ProgressEvent> {
        let mut events = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok(event) => events.push(event),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        events
    }

    /// Wait for the next event; `None` once every sender is gone.
    pub async fn recv(&mut self) -> Option<ProgressEvent> {
        self.rx.recv().await
    }
}

/// Sink that keeps every event in memory, in order.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<ProgressEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl ProgressSink for RecordingSink {
    fn emit(&self, event: ProgressEvent) {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(event);
    }
}
