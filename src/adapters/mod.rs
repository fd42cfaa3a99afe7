//! Adapters for external services
//!
//! The export pipeline depends only on the collaborator traits in
//! [`traits`]. This module provides their production implementations:
//!
//! - [`http`] - reqwest clients for the export service and the render service
//! - [`state`] - JSON-file and in-memory state stores
//!
//! # Example
//!
//! ```no_run
//! use folio::adapters::http::{HttpExportService, HttpWidgetRenderer, ServiceClient};
//! use folio::config::FolioConfig;
//!
//! # fn example(config: &FolioConfig) -> folio::domain::Result<()> {
//! let service = HttpExportService::new(ServiceClient::for_service(&config.service)?);
//! let renderer = HttpWidgetRenderer::new(ServiceClient::for_renderer(
//!     &config.renderer,
//!     &config.service,
//! )?);
//! # Ok(())
//! # }
//! ```

pub mod http;
pub mod state;
pub mod traits;
