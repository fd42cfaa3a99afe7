//! HTTP adapters
//!
//! [`HttpExportService`] implements the data, session, asset and document
//! collaborators against the export service; [`HttpWidgetRenderer`] implements
//! the renderer against the render service. Both share [`ServiceClient`].

pub mod client;
pub mod export_service;
pub mod renderer;

pub use client::{RawBody, ServiceClient};
pub use export_service::HttpExportService;
pub use renderer::HttpWidgetRenderer;
