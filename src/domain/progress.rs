//! Batch progress counters

use serde::{Deserialize, Serialize};

/// Point-in-time progress of the running batch
///
/// `processed` only grows within a batch and is reset when the next batch
/// starts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub processed: usize,
    pub total: usize,
    pub succeeded: usize,
}

impl ProgressSnapshot {
    /// Whether every widget of the batch has settled
    pub fn is_complete(&self) -> bool {
        self.processed >= self.total
    }

    pub fn failed(&self) -> usize {
        self.processed.saturating_sub(self.succeeded)
    }
}
