//! Batch processing of one dataset
//!
//! Runs a [`WidgetExportTask`] for every visible widget of a dataset, with at
//! most `max_concurrent_tasks` in flight, then merges the successful widget
//! documents into one deliverable.

use crate::core::capture::CaptureChain;
use crate::core::export::merge::{document_name, DocumentMergeService, MergeRequest};
use crate::core::export::progress::ProgressTracker;
use crate::core::export::services::ExportServices;
use crate::core::export::task::{ExportTaskResult, WidgetExportTask};
use crate::domain::{AssetRef, Dataset, DocumentFormat, ExportFailure, FolioError};
use crate::log_batch_complete;
use futures::stream::{self, StreamExt};
use std::time::{Duration, Instant};

/// Batch configuration
#[derive(Debug, Clone, Copy)]
pub struct BatchConfig {
    pub format: DocumentFormat,
    pub max_concurrent_tasks: usize,
    pub capture_timeout: Duration,
    pub remote_timeout: Duration,
}

/// How a batch ended
#[derive(Debug, Clone)]
enum BatchOutcome {
    Merged { url: String },
    Failed(ExportFailure),
}

/// Result of one batch
///
/// A merged document exists only when at least one widget succeeded.
#[derive(Debug, Clone)]
pub struct ExportBatchResult {
    /// Partition label ("All" when unfiltered)
    pub partition: String,
    /// Task results in widget order
    pub tasks: Vec<ExportTaskResult>,
    pub succeeded: usize,
    pub total: usize,
    pub duration: Duration,
    outcome: BatchOutcome,
}

impl ExportBatchResult {
    pub fn merged_url(&self) -> Option<&str> {
        match &self.outcome {
            BatchOutcome::Merged { url } => Some(url),
            BatchOutcome::Failed(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&ExportFailure> {
        match &self.outcome {
            BatchOutcome::Merged { .. } => None,
            BatchOutcome::Failed(failure) => Some(failure),
        }
    }

    /// Failed widgets, in widget order
    pub fn skipped(&self) -> impl Iterator<Item = &ExportTaskResult> {
        self.tasks.iter().filter(|t| !t.is_success())
    }
}

/// Batch runner
pub struct ExportBatchRunner<'a> {
    services: &'a ExportServices,
    progress: &'a ProgressTracker,
    config: BatchConfig,
    chain: CaptureChain,
}

impl<'a> ExportBatchRunner<'a> {
    pub fn new(services: &'a ExportServices, progress: &'a ProgressTracker, config: BatchConfig) -> Self {
        let chain = CaptureChain::standard(
            services.renderer.clone(),
            services.assets.clone(),
            config.capture_timeout,
        );
        Self {
            services,
            progress,
            config,
            chain,
        }
    }

    /// Export every visible widget of `dataset` and merge the results
    ///
    /// Widget failures are recorded in the result; a batch where nothing
    /// succeeded ends with [`ExportFailure::BatchEmptyFailure`] and the merge
    /// service is not called.
    pub async fn run(&self, dataset: &Dataset) -> ExportBatchResult {
        let started = Instant::now();
        let partition = dataset.partition_label().to_string();
        let widgets: Vec<_> = dataset.visible_widgets().collect();
        let total = widgets.len();

        tracing::info!(
            partition = %partition,
            widgets = total,
            hidden = dataset.widgets.len() - total,
            "Starting batch"
        );

        self.progress.reset(&partition, total);

        let task = WidgetExportTask::new(
            self.services,
            &self.chain,
            self.config.format,
            self.config.capture_timeout,
            self.config.remote_timeout,
        );

        let tasks: Vec<ExportTaskResult> = stream::iter(widgets.into_iter().enumerate())
            .map(|(index, widget)| task.run(widget, index + 1, self.progress))
            .buffered(self.config.max_concurrent_tasks.max(1))
            .collect()
            .await;

        let succeeded = tasks.iter().filter(|t| t.is_success()).count();

        let outcome = if succeeded == 0 {
            tracing::error!(partition = %partition, total, "No widget could be exported");
            BatchOutcome::Failed(ExportFailure::BatchEmptyFailure { total })
        } else {
            match self.merge(dataset, &partition, &tasks).await {
                Ok(url) => BatchOutcome::Merged { url },
                Err(FolioError::Export(failure)) => BatchOutcome::Failed(failure),
                Err(other) => BatchOutcome::Failed(ExportFailure::MergeFailure(other.to_string())),
            }
        };

        let duration = started.elapsed();
        log_batch_complete!(partition, succeeded, total, duration);

        ExportBatchResult {
            partition,
            tasks,
            succeeded,
            total,
            duration,
            outcome,
        }
    }

    async fn merge(
        &self,
        dataset: &Dataset,
        partition: &str,
        tasks: &[ExportTaskResult],
    ) -> crate::domain::Result<String> {
        let urls: Vec<String> = tasks
            .iter()
            .filter_map(|t| t.document_url().map(str::to_string))
            .collect();
        let assets: Vec<AssetRef> = tasks
            .iter()
            .flat_map(|t| t.display_asset.iter().chain(t.detail_asset.iter()))
            .cloned()
            .collect();
        let output_name = document_name(&dataset.dashboard_name, partition);

        DocumentMergeService::new(self.services.generator.as_ref(), self.config.remote_timeout)
            .merge(MergeRequest {
                dashboard_id: &dataset.dashboard_id,
                format: self.config.format,
                urls: &urls,
                output_name: &output_name,
                assets: &assets,
            })
            .await
    }
}
