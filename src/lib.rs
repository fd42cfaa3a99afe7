// Folio - Dashboard Document Export Tool
// Copyright (c) 2025 Folio Contributors
// Licensed under the MIT License

//! # Folio - Dashboard Document Export
//!
//! Folio exports data-bound dashboards to PDF or PPTX documents through a
//! remote export service: one document per partition (e.g. per school), each
//! merged from per-widget documents.
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Capturing** every widget as an image, with a fallback chain that ends
//!   in a placeholder so a widget is never silently lost
//! - **Generating** one document per widget, concurrently within a batch
//! - **Merging** the widget documents, or regenerating the whole dashboard
//!   when the merge fails
//! - **Orchestrating** sequential batches across partitions behind a session
//!   gate
//!
//! ## Architecture
//!
//! Folio follows a layered architecture:
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Business logic (capture, export, state)
//! - [`adapters`] - Collaborator traits and their HTTP / file implementations
//! - [`domain`] - Core domain types and models
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging and observability
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use folio::config::load_config;
//! use folio::core::export::{ExportJobOrchestrator, ExportServices};
//! use folio::domain::{ActiveDataset, DashboardId, DocumentFormat, ExportJobSpec, ExportType, PartitionId};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("folio.toml")?;
//!     let services = ExportServices::from_config(&config)?;
//!     let orchestrator = ExportJobOrchestrator::new(
//!         services,
//!         config.export.clone(),
//!         Arc::new(ActiveDataset::default()),
//!     );
//!
//!     let spec = ExportJobSpec {
//!         export_type: ExportType::AllPartitionsSeparate,
//!         partitions: PartitionId::parse_list("Lincoln High, Roosevelt Middle"),
//!         format: DocumentFormat::Pdf,
//!     };
//!     let report = orchestrator.run(&DashboardId::new("district")?, &spec).await?;
//!
//!     for (partition, url) in report.documents() {
//!         println!("{partition}: {url}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Folio uses the [`domain::FolioError`] type for all errors. Widget-level
//! failures ([`domain::ExportFailure`]) never abort a batch; they are recorded
//! on the widget's result and show up in the report's skip list.
//!
//! ## Logging
//!
//! Folio uses structured logging with the `tracing` crate. Every job runs in
//! a span carrying its `run_id`.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
