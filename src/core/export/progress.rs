//! Shared progress counters for one batch
//!
//! Tasks of a batch run on the same async task, but the counters are atomics
//! so the tracker can be shared by reference without locking.

use crate::adapters::traits::ProgressObserver;
use crate::domain::ProgressSnapshot;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Default)]
pub struct ProgressTracker {
    processed: AtomicUsize,
    total: AtomicUsize,
    succeeded: AtomicUsize,
    observers: Vec<Arc<dyn ProgressObserver>>,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_observer(mut self, observer: Arc<dyn ProgressObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            processed: self.processed.load(Ordering::SeqCst),
            total: self.total.load(Ordering::SeqCst),
            succeeded: self.succeeded.load(Ordering::SeqCst),
        }
    }

    /// Start a new batch of `total` widgets
    pub fn reset(&self, partition: &str, total: usize) {
        self.processed.store(0, Ordering::SeqCst);
        self.succeeded.store(0, Ordering::SeqCst);
        self.total.store(total, Ordering::SeqCst);

        for observer in &self.observers {
            observer.on_batch_start(partition, total);
        }
        self.notify();
    }

    /// A ticket that records exactly one settled widget when dropped
    pub fn ticket(&self) -> ProgressTicket<'_> {
        ProgressTicket {
            tracker: self,
            succeeded: false,
        }
    }

    fn record(&self, succeeded: bool) {
        if succeeded {
            self.succeeded.fetch_add(1, Ordering::SeqCst);
        }
        self.processed.fetch_add(1, Ordering::SeqCst);
        self.notify();
    }

    fn notify(&self) {
        let snapshot = self.snapshot();
        for observer in &self.observers {
            observer.on_progress(snapshot);
        }
    }
}

/// Progress guard held by a widget task
///
/// Dropping it counts the widget as processed, and as succeeded if
/// [`ProgressTicket::succeeded`] was called.
pub struct ProgressTicket<'a> {
    tracker: &'a ProgressTracker,
    succeeded: bool,
}

impl ProgressTicket<'_> {
    pub fn succeeded(&mut self) {
        self.succeeded = true;
    }
}

impl Drop for ProgressTicket<'_> {
    fn drop(&mut self) {
        self.tracker.record(self.succeeded);
    }
}
