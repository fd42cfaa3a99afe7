//! Persisted state records
//!
//! Two kinds of entries live in the state store:
//!
//! - `widget-pdf:{widgetId}` - the last document generated for a widget
//! - `auto-export-opts:{dashboardId}` - a one-shot export request consumed by
//!   the next `export --auto` for that dashboard

use crate::domain::ids::{DashboardId, PartitionId, WidgetId};
use crate::domain::job::{DocumentFormat, ExportJobSpec, ExportType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Key prefix of cached widget documents
pub const WIDGET_DOCUMENT_PREFIX: &str = "widget-pdf:";

/// Key prefix of pending auto-export options
pub const AUTO_EXPORT_PREFIX: &str = "auto-export-opts:";

pub(crate) fn widget_document_key(widget_id: &WidgetId) -> String {
    format!("{WIDGET_DOCUMENT_PREFIX}{widget_id}")
}

pub(crate) fn auto_export_key(dashboard_id: &DashboardId) -> String {
    format!("{AUTO_EXPORT_PREFIX}{dashboard_id}")
}

/// A generated per-widget document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedDocument {
    pub url: String,
    pub generated_at: DateTime<Utc>,
}

impl CachedDocument {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            generated_at: Utc::now(),
        }
    }
}

/// Export options saved for a later automatic run
///
/// # Examples
///
/// ```
/// use folio::core::state::AutoExportOptions;
/// use folio::domain::{DocumentFormat, ExportJobSpec, ExportType};
///
/// let options = AutoExportOptions::from_spec(&ExportJobSpec::unpartitioned(DocumentFormat::Pptx));
/// let spec = options.into_job_spec();
/// assert_eq!(spec.export_type, ExportType::NoPartition);
/// assert_eq!(spec.format, DocumentFormat::Pptx);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutoExportOptions {
    pub export_type: ExportType,

    #[serde(default)]
    pub partitions: Vec<PartitionId>,

    #[serde(default)]
    pub format: DocumentFormat,

    pub scheduled_at: DateTime<Utc>,
}

impl AutoExportOptions {
    pub fn from_spec(spec: &ExportJobSpec) -> Self {
        Self {
            export_type: spec.export_type,
            partitions: spec.partitions.clone(),
            format: spec.format,
            scheduled_at: Utc::now(),
        }
    }

    pub fn into_job_spec(self) -> ExportJobSpec {
        ExportJobSpec {
            export_type: self.export_type,
            partitions: self.partitions,
            format: self.format,
        }
    }
}
