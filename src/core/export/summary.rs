//! Export job report
//!
//! This module defines structures for tracking and reporting job results:
//! one [`PartitionOutcome`] per batch, rolled up into a [`JobReport`].

use crate::core::export::batch::ExportBatchResult;
use crate::domain::{DashboardId, DocumentFormat, ExportType, FolioError, WidgetId};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;
use uuid::Uuid;

/// Overall job status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Every partition produced a document
    Succeeded,
    /// Some partitions produced a document
    PartiallySucceeded,
    /// No partition produced a document
    Failed,
}

/// A widget left out of a document
#[derive(Debug, Clone, Serialize)]
pub struct SkippedWidget {
    pub position: usize,
    pub widget_id: WidgetId,
    pub title: String,
    pub reason: String,
}

/// Outcome of one partition's batch
#[derive(Debug, Clone, Serialize)]
pub struct PartitionOutcome {
    pub partition: String,
    pub document_url: Option<String>,
    pub succeeded: usize,
    pub total: usize,
    pub skipped: Vec<SkippedWidget>,
    /// Why no document was produced
    pub error: Option<String>,
    #[serde(with = "duration_ms")]
    pub duration: Duration,
}

impl PartitionOutcome {
    pub fn from_batch(batch: &ExportBatchResult) -> Self {
        let skipped = batch
            .skipped()
            .map(|task| SkippedWidget {
                position: task.position,
                widget_id: task.widget_id.clone(),
                title: task.title.clone(),
                reason: task
                    .failure()
                    .map(|f| f.to_string())
                    .unwrap_or_default(),
            })
            .collect();

        Self {
            partition: batch.partition.clone(),
            document_url: batch.merged_url().map(str::to_string),
            succeeded: batch.succeeded,
            total: batch.total,
            skipped,
            error: batch.failure().map(|f| f.to_string()),
            duration: batch.duration,
        }
    }

    /// The dataset for the partition could not be loaded
    pub fn fetch_failed(partition: impl Into<String>, error: &FolioError) -> Self {
        Self {
            partition: partition.into(),
            document_url: None,
            succeeded: 0,
            total: 0,
            skipped: Vec::new(),
            error: Some(format!("Failed to load dashboard data: {error}")),
            duration: Duration::ZERO,
        }
    }

    pub fn is_success(&self) -> bool {
        self.document_url.is_some()
    }

    /// `"2 included, 1 skipped: [3. Title]"`
    pub fn summary_line(&self) -> String {
        format_summary(
            self.succeeded,
            self.skipped.iter().map(|s| format!("{}. {}", s.position, s.title)),
        )
    }

    /// `"[3. Title, 5. Other]"`, empty when nothing was skipped
    pub fn skip_list(&self) -> String {
        format_skip_list(self.skipped.iter().map(|s| format!("{}. {}", s.position, s.title)))
    }
}

/// Report of a whole export job
#[derive(Debug, Clone, Serialize)]
pub struct JobReport {
    pub run_id: Uuid,
    pub dashboard_id: DashboardId,
    pub export_type: ExportType,
    pub format: DocumentFormat,
    pub started_at: DateTime<Utc>,
    #[serde(with = "duration_ms")]
    pub duration: Duration,
    pub partitions: Vec<PartitionOutcome>,
}

impl JobReport {
    pub fn status(&self) -> JobStatus {
        let produced = self.partitions.iter().filter(|p| p.is_success()).count();
        if produced == 0 {
            JobStatus::Failed
        } else if produced == self.partitions.len() {
            JobStatus::Succeeded
        } else {
            JobStatus::PartiallySucceeded
        }
    }

    /// `(partition, url)` of every produced document, in batch order
    pub fn documents(&self) -> Vec<(&str, &str)> {
        self.partitions
            .iter()
            .filter_map(|p| p.document_url.as_deref().map(|url| (p.partition.as_str(), url)))
            .collect()
    }

    /// Widgets included in produced documents
    pub fn included(&self) -> usize {
        self.partitions
            .iter()
            .filter(|p| p.is_success())
            .map(|p| p.succeeded)
            .sum()
    }

    /// First partition error, for reporting a total failure
    pub fn first_error(&self) -> Option<&str> {
        self.partitions.iter().find_map(|p| p.error.as_deref())
    }

    /// Job-level summary
    ///
    /// Skipped widgets are labelled with their partition when the job had
    /// more than one.
    pub fn summary_line(&self) -> String {
        format_summary(self.included(), self.skip_entries())
    }

    pub fn skip_list(&self) -> String {
        format_skip_list(self.skip_entries())
    }

    fn skip_entries(&self) -> impl Iterator<Item = String> + '_ {
        let labelled = self.partitions.len() > 1;
        self.partitions
            .iter()
            .filter(|p| p.is_success())
            .flat_map(move |p| {
                p.skipped.iter().map(move |s| {
                    if labelled {
                        format!("{} {}. {}", p.partition, s.position, s.title)
                    } else {
                        format!("{}. {}", s.position, s.title)
                    }
                })
            })
    }

    /// Log the report
    pub fn log_summary(&self) {
        tracing::info!(
            run_id = %self.run_id,
            dashboard_id = %self.dashboard_id,
            status = ?self.status(),
            partitions = self.partitions.len(),
            documents = self.documents().len(),
            included = self.included(),
            duration_ms = self.duration.as_millis() as u64,
            "Export job finished"
        );

        for partition in self.partitions.iter().filter(|p| !p.is_success()) {
            tracing::warn!(
                partition = %partition.partition,
                error = partition.error.as_deref().unwrap_or("unknown"),
                "Partition produced no document"
            );
        }
    }
}

fn format_summary(included: usize, skipped: impl Iterator<Item = String>) -> String {
    let skipped: Vec<String> = skipped.collect();
    if skipped.is_empty() {
        format!("{included} included")
    } else {
        format!(
            "{included} included, {} skipped: [{}]",
            skipped.len(),
            skipped.join(", ")
        )
    }
}

fn format_skip_list(entries: impl Iterator<Item = String>) -> String {
    let entries: Vec<String> = entries.collect();
    if entries.is_empty() {
        String::new()
    } else {
        format!("[{}]", entries.join(", "))
    }
}

mod duration_ms {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_millis() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skipped(position: usize, title: &str) -> SkippedWidget {
        SkippedWidget {
            position,
            widget_id: WidgetId::new(format!("w-{position}")).unwrap(),
            title: title.to_string(),
            reason: "capture failed".to_string(),
        }
    }

    fn outcome(partition: &str, url: Option<&str>, succeeded: usize, skips: Vec<SkippedWidget>) -> PartitionOutcome {
        PartitionOutcome {
            partition: partition.to_string(),
            document_url: url.map(str::to_string),
            succeeded,
            total: succeeded + skips.len(),
            skipped: skips,
            error: if url.is_none() {
                Some("No widget could be exported".to_string())
            } else {
                None
            },
            duration: Duration::from_millis(10),
        }
    }

    fn report(partitions: Vec<PartitionOutcome>) -> JobReport {
        JobReport {
            run_id: Uuid::new_v4(),
            dashboard_id: DashboardId::new("d-1").unwrap(),
            export_type: ExportType::AllPartitionsSeparate,
            format: DocumentFormat::Pdf,
            started_at: Utc::now(),
            duration: Duration::from_secs(1),
            partitions,
        }
    }

    #[test]
    fn test_partition_summary_line() {
        let outcome = outcome("All", Some("u"), 2, vec![skipped(3, "WidgetTitle")]);
        assert_eq!(outcome.summary_line(), "2 included, 1 skipped: [3. WidgetTitle]");
        assert_eq!(outcome.skip_list(), "[3. WidgetTitle]");
    }

    #[test]
    fn test_summary_without_skips() {
        let outcome = outcome("All", Some("u"), 4, Vec::new());
        assert_eq!(outcome.summary_line(), "4 included");
        assert_eq!(outcome.skip_list(), "");
    }

    #[test]
    fn test_status_rollup() {
        let ok = || outcome("North", Some("u"), 1, Vec::new());
        let failed = || outcome("South", None, 0, vec![skipped(1, "A")]);

        assert_eq!(report(vec![ok(), ok()]).status(), JobStatus::Succeeded);
        assert_eq!(report(vec![failed(), ok()]).status(), JobStatus::PartiallySucceeded);
        assert_eq!(report(vec![failed()]).status(), JobStatus::Failed);
        assert_eq!(report(Vec::new()).status(), JobStatus::Failed);
    }

    #[test]
    fn test_job_summary_labels_partitions() {
        let report = report(vec![
            outcome("North", Some("u1"), 2, vec![skipped(3, "Chronic absence")]),
            outcome("South", None, 0, vec![skipped(1, "Ignored")]),
        ]);
        assert_eq!(
            report.summary_line(),
            "2 included, 1 skipped: [North 3. Chronic absence]"
        );
        assert_eq!(report.documents(), vec![("North", "u1")]);
        assert_eq!(report.first_error(), Some("No widget could be exported"));
    }

    #[test]
    fn test_single_partition_job_summary() {
        let report = report(vec![outcome("All", Some("u"), 2, vec![skipped(3, "WidgetTitle")])]);
        assert_eq!(report.summary_line(), "2 included, 1 skipped: [3. WidgetTitle]");
    }

    #[test]
    fn test_fetch_failed_outcome() {
        let err = FolioError::Connection("refused".to_string());
        let outcome = PartitionOutcome::fetch_failed("North", &err);
        assert!(!outcome.is_success());
        assert!(outcome.error.unwrap().contains("refused"));
    }

    #[test]
    fn test_report_serializes_durations_as_ms() {
        let json = serde_json::to_value(report(Vec::new())).unwrap();
        assert_eq!(json["duration"], 1000);
    }
}
