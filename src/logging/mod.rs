//! Logging and observability
//!
//! Structured logging through `tracing`:
//! - Console output for interactive runs
//! - JSON-formatted rolling log files
//! - Configurable log levels
//!
//! # Example
//!
//! ```no_run
//! use folio::logging::init_logging;
//! use folio::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!(dashboard_id = "district", "Export requested");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log the start of an export job
///
/// # Example
///
/// ```no_run
/// use folio::log_job_start;
///
/// log_job_start!("district-overview", "all_partitions_separate", 3);
/// ```
#[macro_export]
macro_rules! log_job_start {
    ($dashboard_id:expr, $export_type:expr, $batches:expr) => {
        tracing::info!(
            dashboard_id = %$dashboard_id,
            export_type = ?$export_type,
            batches = $batches,
            "Starting export job"
        );
    };
}

/// Log the outcome of one batch
///
/// # Example
///
/// ```no_run
/// use folio::log_batch_complete;
/// use std::time::Duration;
///
/// log_batch_complete!("North", 2, 3, Duration::from_secs(4));
/// ```
#[macro_export]
macro_rules! log_batch_complete {
    ($partition:expr, $succeeded:expr, $total:expr, $duration:expr) => {
        tracing::info!(
            partition = %$partition,
            succeeded = $succeeded,
            total = $total,
            duration_ms = $duration.as_millis() as u64,
            "Batch completed"
        );
    };
}

/// Log a capture strategy that failed and handed over to the next one
///
/// # Example
///
/// ```no_run
/// use folio::log_strategy_fallback;
///
/// log_strategy_fallback!("w-1", "container_snapshot", "timed out");
/// ```
#[macro_export]
macro_rules! log_strategy_fallback {
    ($widget_id:expr, $strategy:expr, $reason:expr) => {
        tracing::debug!(
            widget_id = %$widget_id,
            strategy = $strategy,
            reason = %$reason,
            "Capture strategy failed, trying next"
        );
    };
}
