//! Schedule command implementation
//!
//! Stores one-shot export options for a dashboard. The next
//! `folio export --dashboard <id> --auto` consumes them.

use super::{state_manager, JobArgs};
use crate::cli::exit_code;
use crate::config::load_config;
use crate::core::state::AutoExportOptions;
use crate::domain::DashboardId;
use clap::Args;

/// Arguments for the schedule command
#[derive(Args, Debug)]
pub struct ScheduleArgs {
    /// Dashboard the options apply to
    #[arg(long)]
    pub dashboard: String,

    #[command(flatten)]
    pub job: JobArgs,
}

impl ScheduleArgs {
    /// Execute the schedule command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(exit_code::CONFIGURATION);
            }
        };

        let dashboard_id = match DashboardId::new(self.dashboard.as_str()) {
            Ok(id) => id,
            Err(e) => {
                println!("❌ {e}");
                return Ok(exit_code::CONFIGURATION);
            }
        };

        let spec = match self.job.job_spec(config.export.format) {
            Ok(spec) => spec,
            Err(e) => {
                println!("❌ {e}");
                return Ok(exit_code::CONFIGURATION);
            }
        };

        let options = AutoExportOptions::from_spec(&spec);
        if let Err(e) = state_manager(&config)
            .save_auto_export_options(&dashboard_id, &options)
            .await
        {
            println!("❌ Failed to save export options");
            println!("   Error: {e}");
            return Ok(exit_code::FATAL);
        }

        println!("✅ Export scheduled for dashboard {dashboard_id}");
        println!("   Mode: {:?}, format: {}", spec.export_type, spec.format);
        println!("   Run 'folio export --dashboard {dashboard_id} --auto' to start it.");
        Ok(exit_code::SUCCESS)
    }
}
