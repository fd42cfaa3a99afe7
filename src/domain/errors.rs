//! Domain error types
//!
//! This module defines the error hierarchy for Folio. Errors are domain-specific
//! and don't expose third-party types: HTTP and I/O failures are converted into
//! string-carrying variants at the adapter boundary.

use thiserror::Error;

/// Main Folio error type
///
/// This is the primary error type used throughout the application.
/// It wraps specific error types and provides context for error handling.
#[derive(Debug, Error)]
pub enum FolioError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Invalid input (job spec, identifiers, ...)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Network/connection errors
    #[error("Connection error: {0}")]
    Connection(String),

    /// A remote service answered with a non-success status
    #[error("Remote service error: {status} - {message}")]
    Remote { status: u16, message: String },

    /// A guarded operation did not finish in time
    #[error("Timed out after {after_ms} ms: {operation}")]
    Timeout { operation: String, after_ms: u64 },

    /// Session service errors
    #[error("Session error: {0}")]
    Session(String),

    /// Remote asset storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Local state store errors
    #[error("State error: {0}")]
    State(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Export pipeline failures
    #[error("Export error: {0}")]
    Export(#[from] ExportFailure),

    /// Rendering layer errors
    #[error("Render error: {0}")]
    Render(String),
}

impl FolioError {
    /// Builds a timeout error for `operation`
    pub fn timeout(operation: impl Into<String>, after: std::time::Duration) -> Self {
        FolioError::Timeout {
            operation: operation.into(),
            after_ms: after.as_millis() as u64,
        }
    }

    /// Whether this error is a timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, FolioError::Timeout { .. })
    }
}

/// Export pipeline failure taxonomy
///
/// Widget-level variants never escape a widget task; they are recorded as the
/// failure reason of that widget. Batch-level variants are returned to the job
/// orchestrator, job-level variants abort the job before any batch starts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExportFailure {
    /// Every capture strategy, including the placeholder, failed
    #[error("No image could be captured for widget {widget_id}")]
    CaptureFailure { widget_id: String },

    /// The detail chart could not be produced (logged only)
    #[error("Detail chart unavailable for widget {widget_id}: {reason}")]
    AuxiliaryChartFailure { widget_id: String, reason: String },

    /// The per-widget document could not be generated
    #[error("Document generation failed for widget {widget_id}: {reason}")]
    RemoteGenerationFailure { widget_id: String, reason: String },

    /// Merging the batch documents failed, and so did the full-dashboard fallback
    #[error("Merge failed: {0}")]
    MergeFailure(String),

    /// No widget in the batch produced a document
    #[error("No widget could be exported ({total} attempted)")]
    BatchEmptyFailure { total: usize },

    /// Not enough session time left to start a job
    #[error(
        "Session expires in {remaining_minutes} min but an export needs at least {required_minutes} min; sign in again and retry"
    )]
    SessionInsufficient {
        remaining_minutes: u64,
        required_minutes: u64,
    },
}

// Reports and task results carry failures as their message
impl serde::Serialize for ExportFailure {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for FolioError {
    fn from(err: std::io::Error) -> Self {
        FolioError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for FolioError {
    fn from(err: serde_json::Error) -> Self {
        FolioError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for FolioError {
    fn from(err: toml::de::Error) -> Self {
        FolioError::Configuration(format!("TOML parse error: {err}"))
    }
}
