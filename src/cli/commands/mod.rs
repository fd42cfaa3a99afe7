//! CLI command implementations
//!
//! This module contains all CLI command implementations.

pub mod export;
pub mod init;
pub mod schedule;
pub mod status;
pub mod validate;

use crate::adapters::state::FileStateStore;
use crate::config::FolioConfig;
use crate::core::state::StateManager;
use crate::domain::{DocumentFormat, ExportJobSpec, ExportType, PartitionId};
use clap::Args;
use std::str::FromStr;
use std::sync::Arc;

/// State manager over the configured state file
pub(crate) fn state_manager(config: &FolioConfig) -> StateManager {
    StateManager::new_with_storage(Arc::new(FileStateStore::new(&config.state.path)))
}

/// Job options shared by `export` and `schedule`
#[derive(Args, Debug, Clone, Default)]
pub struct JobArgs {
    /// Partition mode (none, single, all)
    #[arg(long)]
    pub mode: Option<String>,

    /// Partition value(s) (comma-separated, in processing order)
    #[arg(long)]
    pub partition: Option<String>,

    /// Document format (pdf or pptx), defaults to `export.format`
    #[arg(long)]
    pub format: Option<String>,
}

impl JobArgs {
    /// Build the job spec
    ///
    /// Without `--mode`, a single partition selects `single`, several select
    /// `all`, and none selects `none`.
    pub fn job_spec(&self, default_format: DocumentFormat) -> Result<ExportJobSpec, String> {
        let partitions = self
            .partition
            .as_deref()
            .map(PartitionId::parse_list)
            .unwrap_or_default();

        let export_type = match &self.mode {
            Some(mode) => ExportType::from_str(mode)?,
            None => match partitions.len() {
                0 => ExportType::NoPartition,
                1 => ExportType::SinglePartition,
                _ => ExportType::AllPartitionsSeparate,
            },
        };

        let format = match &self.format {
            Some(format) => DocumentFormat::from_str(format)?,
            None => default_format,
        };

        let spec = ExportJobSpec {
            export_type,
            partitions,
            format,
        };
        spec.validate()?;
        Ok(spec)
    }
}
