//! Core business logic for Folio.
//!
//! This module contains the export pipeline and its local state.
//!
//! # Modules
//!
//! - [`capture`] - Widget image capture with strategy fallback
//! - [`export`] - Widget tasks, batches, merge and job orchestration
//! - [`state`] - Widget document cache and one-shot auto-export options
//!
//! # Export Workflow
//!
//! 1. **Session gate**: refuse to start when the session expires too soon
//! 2. **Fetch**: load the dashboard, filtered to the batch's partition
//! 3. **Activate**: show the batch's dataset to the presentation layer
//! 4. **Export widgets**: capture, upload and generate a document per widget
//! 5. **Merge**: combine widget documents, or regenerate the whole dashboard
//! 6. **Restore**: put the original dataset back when the job ends
//! 7. **Report**: one document URL or error per partition
//!
//! # Example
//!
//! ```rust,no_run
//! use folio::config::load_config;
//! use folio::core::export::{ExportJobOrchestrator, ExportServices};
//! use folio::domain::{ActiveDataset, DashboardId, DocumentFormat, ExportJobSpec};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("folio.toml")?;
//! let services = ExportServices::from_config(&config)?;
//! let orchestrator =
//!     ExportJobOrchestrator::new(services, config.export.clone(), Arc::new(ActiveDataset::default()));
//!
//! let dashboard = DashboardId::new("district-overview")?;
//! let report = orchestrator
//!     .run(&dashboard, &ExportJobSpec::unpartitioned(DocumentFormat::Pdf))
//!     .await?;
//!
//! println!("{}", report.summary_line());
//! # Ok(())
//! # }
//! ```

pub mod capture;
pub mod export;
pub mod state;

#[cfg(test)]
pub(crate) mod test_support;
