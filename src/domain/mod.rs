//! Domain models and types for Folio.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`DashboardId`], [`WidgetId`], [`PartitionId`], [`AssetRef`])
//! - **Dashboard models** ([`Widget`], [`Dataset`], [`ActiveDataset`])
//! - **Job description** ([`ExportJobSpec`], [`ExportType`], [`DocumentFormat`])
//! - **Error types** ([`FolioError`], [`ExportFailure`])
//! - **Result type alias** ([`Result`])
//!
//! # Type Safety
//!
//! ```rust
//! use folio::domain::{DashboardId, WidgetId};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let dashboard = DashboardId::new("district-overview")?;
//! let widget = WidgetId::new("attendance-by-grade")?;
//!
//! // This won't compile - identifiers don't mix
//! // let wrong: DashboardId = widget;
//! # Ok(())
//! # }
//! ```

pub mod dataset;
pub mod errors;
pub mod ids;
pub mod job;
pub mod progress;
pub mod result;
pub mod widget;

// Re-export commonly used types for convenience
pub use dataset::{ActiveDataset, Dataset, ALL_PARTITIONS_LABEL};
pub use errors::{ExportFailure, FolioError};
pub use ids::{AssetRef, DashboardId, PartitionId, WidgetId};
pub use job::{AssetKind, AssetRole, DocumentFormat, ExportJobSpec, ExportType, ImageFormat};
pub use progress::ProgressSnapshot;
pub use result::Result;
pub use widget::{ChartKind, DataPoint, Series, Widget};
