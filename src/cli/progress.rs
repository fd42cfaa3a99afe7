//! Terminal progress bar for export jobs

use crate::adapters::traits::ProgressObserver;
use crate::domain::ProgressSnapshot;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;

/// Renders batch progress with indicatif, one bar per batch
pub struct TerminalProgress {
    bar: Mutex<Option<ProgressBar>>,
    enabled: bool,
}

impl TerminalProgress {
    /// A disabled instance draws nothing
    pub fn new(enabled: bool) -> Self {
        Self {
            bar: Mutex::new(None),
            enabled,
        }
    }

    fn style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:>12} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-")
    }

    /// Finish the current bar, leaving it on screen
    pub fn finish(&self) {
        if let Ok(mut bar) = self.bar.lock() {
            if let Some(bar) = bar.take() {
                bar.finish();
            }
        }
    }
}

impl ProgressObserver for TerminalProgress {
    fn on_batch_start(&self, partition: &str, total: usize) {
        if !self.enabled {
            return;
        }
        let Ok(mut slot) = self.bar.lock() else {
            return;
        };
        if let Some(previous) = slot.take() {
            previous.finish();
        }

        let bar = ProgressBar::new(total as u64);
        bar.set_style(Self::style());
        bar.set_prefix(partition.to_string());
        *slot = Some(bar);
    }

    fn on_progress(&self, snapshot: ProgressSnapshot) {
        let Ok(slot) = self.bar.lock() else {
            return;
        };
        if let Some(bar) = slot.as_ref() {
            bar.set_position(snapshot.processed as u64);
            let failed = snapshot.failed();
            if failed > 0 {
                bar.set_message(format!("({failed} skipped)"));
            }
        }
    }
}
