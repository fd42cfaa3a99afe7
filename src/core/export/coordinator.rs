//! Export job orchestrator - runs a whole export job
//!
//! This module coordinates the export workflow: the session gate, one batch
//! per partition (plus the unfiltered baseline), activation of each batch's
//! dataset, and restoring the original dataset when the job ends.

use crate::adapters::traits::ProgressObserver;
use crate::config::ExportConfig;
use crate::core::export::batch::{BatchConfig, ExportBatchRunner};
use crate::core::export::progress::ProgressTracker;
use crate::core::export::services::ExportServices;
use crate::core::export::summary::{JobReport, PartitionOutcome};
use crate::domain::{
    ActiveDataset, DashboardId, Dataset, ExportFailure, ExportJobSpec, ExportType, FolioError,
    PartitionId, Result, ALL_PARTITIONS_LABEL,
};
use crate::log_job_start;
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

/// One planned batch: a partition filter, or the unfiltered dashboard
#[derive(Debug, Clone, PartialEq, Eq)]
enum BatchPlan {
    Unfiltered,
    Partition(PartitionId),
}

impl BatchPlan {
    fn label(&self) -> &str {
        match self {
            BatchPlan::Unfiltered => ALL_PARTITIONS_LABEL,
            BatchPlan::Partition(p) => p.as_str(),
        }
    }
}

/// Puts the dataset that was active before the job back on drop
struct DatasetRestore<'a> {
    active: &'a ActiveDataset,
    original: Option<Arc<Dataset>>,
}

impl<'a> DatasetRestore<'a> {
    fn new(active: &'a ActiveDataset) -> Self {
        Self {
            active,
            original: active.current(),
        }
    }
}

impl Drop for DatasetRestore<'_> {
    fn drop(&mut self) {
        self.active.replace(self.original.take());
        tracing::debug!("Original dataset restored");
    }
}

/// Export job orchestrator
pub struct ExportJobOrchestrator {
    services: ExportServices,
    settings: ExportConfig,
    active: Arc<ActiveDataset>,
    progress: ProgressTracker,
}

impl ExportJobOrchestrator {
    pub fn new(services: ExportServices, settings: ExportConfig, active: Arc<ActiveDataset>) -> Self {
        Self {
            services,
            settings,
            active,
            progress: ProgressTracker::new(),
        }
    }

    /// Register a progress observer
    pub fn with_observer(mut self, observer: Arc<dyn ProgressObserver>) -> Self {
        self.progress = std::mem::take(&mut self.progress).with_observer(observer);
        self
    }

    /// The dataset view swapped between batches
    pub fn active_dataset(&self) -> &Arc<ActiveDataset> {
        &self.active
    }

    /// Run an export job
    ///
    /// Batches run one after another. A batch that fails (no dataset, no
    /// widget exported, merge and fallback both failed) is recorded in the
    /// report and the job moves on to the next partition.
    ///
    /// # Errors
    ///
    /// Fails before any batch starts when `spec` is invalid or when the
    /// session expires in less than `min_session_minutes`
    /// ([`ExportFailure::SessionInsufficient`]).
    pub async fn run(&self, dashboard_id: &DashboardId, spec: &ExportJobSpec) -> Result<JobReport> {
        spec.validate().map_err(FolioError::Validation)?;
        self.check_session().await?;

        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("export_job", run_id = %run_id, dashboard_id = %dashboard_id);

        self.execute(run_id, dashboard_id, spec).instrument(span).await
    }

    async fn check_session(&self) -> Result<()> {
        let required_ms = self.settings.min_session_ms();
        if self.services.session.has_enough_time_for(required_ms).await? {
            return Ok(());
        }

        let remaining_ms = self.services.session.remaining_ms().await.unwrap_or(0);
        tracing::warn!(
            remaining_ms,
            required_ms,
            "Session expires too soon, export refused"
        );
        Err(ExportFailure::SessionInsufficient {
            remaining_minutes: remaining_ms / 60_000,
            required_minutes: self.settings.min_session_minutes,
        }
        .into())
    }

    async fn execute(
        &self,
        run_id: Uuid,
        dashboard_id: &DashboardId,
        spec: &ExportJobSpec,
    ) -> Result<JobReport> {
        let started_at = Utc::now();
        let started = Instant::now();
        let plans = self.plan(spec);

        log_job_start!(dashboard_id, spec.export_type, plans.len());

        let batch_config = BatchConfig {
            format: spec.format,
            max_concurrent_tasks: self.settings.max_concurrent_tasks,
            capture_timeout: self.settings.capture_timeout(),
            remote_timeout: self.settings.remote_timeout(),
        };
        let runner = ExportBatchRunner::new(&self.services, &self.progress, batch_config);

        let _restore = DatasetRestore::new(&self.active);
        let mut partitions = Vec::with_capacity(plans.len());

        for plan in &plans {
            let dataset = match self.fetch(dashboard_id, plan).await {
                Ok(dataset) => Arc::new(dataset),
                Err(e) => {
                    tracing::error!(partition = plan.label(), error = %e, "Failed to load dashboard data");
                    partitions.push(PartitionOutcome::fetch_failed(plan.label(), &e));
                    continue;
                }
            };

            self.active.replace(Some(dataset.clone()));
            let batch = runner.run(&dataset).await;
            partitions.push(PartitionOutcome::from_batch(&batch));
        }

        let report = JobReport {
            run_id,
            dashboard_id: dashboard_id.clone(),
            export_type: spec.export_type,
            format: spec.format,
            started_at,
            duration: started.elapsed(),
            partitions,
        };
        report.log_summary();

        Ok(report)
    }

    fn plan(&self, spec: &ExportJobSpec) -> Vec<BatchPlan> {
        match spec.export_type {
            ExportType::NoPartition => vec![BatchPlan::Unfiltered],
            ExportType::SinglePartition => spec
                .partitions
                .iter()
                .take(1)
                .cloned()
                .map(BatchPlan::Partition)
                .collect(),
            ExportType::AllPartitionsSeparate => {
                let mut plans: Vec<BatchPlan> = spec
                    .partitions
                    .iter()
                    .cloned()
                    .map(BatchPlan::Partition)
                    .collect();
                if self.settings.include_baseline {
                    plans.push(BatchPlan::Unfiltered);
                }
                plans
            }
        }
    }

    async fn fetch(&self, dashboard_id: &DashboardId, plan: &BatchPlan) -> Result<Dataset> {
        let call = async {
            match plan {
                BatchPlan::Unfiltered => self.services.provider.get_dashboard(dashboard_id).await,
                BatchPlan::Partition(partition) => {
                    self.services
                        .provider
                        .get_dashboard_filtered_by_partition(
                            dashboard_id,
                            std::slice::from_ref(partition),
                        )
                        .await
                }
            }
        };

        let timeout = self.settings.remote_timeout();
        tokio::time::timeout(timeout, call)
            .await
            .map_err(|_| FolioError::timeout("load dashboard", timeout))?
    }
}
