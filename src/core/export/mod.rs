//! Export orchestration and batch processing
//!
//! This module provides the export pipeline:
//! - Per-widget tasks (capture, detail chart, document generation)
//! - Batches over one dataset with bounded concurrency, and the merge
//! - Job orchestration across partitions
//! - Progress tracking and the job report

pub mod batch;
pub mod coordinator;
pub mod merge;
pub mod progress;
pub mod services;
pub mod summary;
pub mod task;

pub use batch::{BatchConfig, ExportBatchResult, ExportBatchRunner};
pub use coordinator::ExportJobOrchestrator;
pub use merge::{document_name, sanitize_document_name, DocumentMergeService, MergeRequest};
pub use progress::{ProgressTicket, ProgressTracker};
pub use services::ExportServices;
pub use summary::{JobReport, JobStatus, PartitionOutcome, SkippedWidget};
pub use task::{ExportTaskResult, TaskOutcome, WidgetExportTask};
