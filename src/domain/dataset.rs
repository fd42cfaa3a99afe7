//! Dashboard datasets and the active dataset view
//!
//! A [`Dataset`] is one snapshot of a dashboard's widgets, optionally filtered
//! to a partition. [`ActiveDataset`] is the single view currently shown to the
//! user; only the job orchestrator swaps it, and only between batches.

use super::ids::{DashboardId, PartitionId};
use super::widget::Widget;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::watch;

/// Label used for unfiltered datasets
pub const ALL_PARTITIONS_LABEL: &str = "All";

/// A dashboard's widgets under one filter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub dashboard_id: DashboardId,

    /// Human-readable dashboard name, used in document names
    pub dashboard_name: String,

    /// Partition filter, `None` when unfiltered
    #[serde(default)]
    pub partition: Option<PartitionId>,

    #[serde(default)]
    pub widgets: Vec<Widget>,
}

impl Dataset {
    /// Widgets that are exported, in dashboard order
    pub fn visible_widgets(&self) -> impl Iterator<Item = &Widget> {
        self.widgets.iter().filter(|w| w.visible)
    }

    /// Partition label for reports and document names
    pub fn partition_label(&self) -> &str {
        self.partition
            .as_ref()
            .map(PartitionId::as_str)
            .unwrap_or(ALL_PARTITIONS_LABEL)
    }
}

/// The dataset currently shown, observable by the presentation layer
pub struct ActiveDataset {
    tx: watch::Sender<Option<Arc<Dataset>>>,
}

impl ActiveDataset {
    /// Creates a view with an optional initial dataset
    pub fn new(initial: Option<Dataset>) -> Self {
        let (tx, _rx) = watch::channel(initial.map(Arc::new));
        Self { tx }
    }

    /// The dataset currently active
    pub fn current(&self) -> Option<Arc<Dataset>> {
        self.tx.borrow().clone()
    }

    /// Activates `dataset`, returning the previous one
    pub fn replace(&self, dataset: Option<Arc<Dataset>>) -> Option<Arc<Dataset>> {
        self.tx.send_replace(dataset)
    }

    /// Subscribe to dataset changes
    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<Dataset>>> {
        self.tx.subscribe()
    }
}

impl Default for ActiveDataset {
    fn default() -> Self {
        Self::new(None)
    }
}
