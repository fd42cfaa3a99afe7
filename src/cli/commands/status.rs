//! Status command implementation
//!
//! This module implements the `status` command, which lists cached widget
//! documents and pending scheduled exports from the local state file.

use super::state_manager;
use crate::cli::exit_code;
use crate::config::load_config;
use clap::Args;

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Only show widgets whose id contains this text
    #[arg(long)]
    pub widget: Option<String>,
}

impl StatusArgs {
    /// Execute the status command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Checking export status");

        println!("📊 Export Status");
        println!();

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(exit_code::CONFIGURATION);
            }
        };

        let state = state_manager(&config);

        let (documents, pending) = match (
            state.cached_widget_documents().await,
            state.pending_auto_exports().await,
        ) {
            (Ok(documents), Ok(pending)) => (documents, pending),
            (Err(e), _) | (_, Err(e)) => {
                println!("❌ Failed to read state file {}", config.state.path);
                println!("   Error: {e}");
                return Ok(exit_code::FATAL);
            }
        };

        let documents: Vec<_> = documents
            .into_iter()
            .filter(|(id, _)| self.widget.as_deref().map_or(true, |w| id.contains(w)))
            .collect();

        if documents.is_empty() {
            println!("No cached widget documents.");
        } else {
            println!("Found {} cached widget document(s):", documents.len());
            println!();
            println!("{:<30} {:<22} {}", "Widget ID", "Generated", "URL");
            println!("{}", "-".repeat(100));
            for (widget_id, document) in &documents {
                println!(
                    "{:<30} {:<22} {}",
                    widget_id,
                    document.generated_at.format("%Y-%m-%d %H:%M:%S"),
                    document.url
                );
            }
        }
        println!();

        if pending.is_empty() {
            println!("No scheduled exports.");
        } else {
            println!("Scheduled exports:");
            for (dashboard_id, options) in &pending {
                let partitions: Vec<&str> = options.partitions.iter().map(|p| p.as_str()).collect();
                println!(
                    "  {dashboard_id}: {:?} [{}] as {} (scheduled {})",
                    options.export_type,
                    partitions.join(", "),
                    options.format,
                    options.scheduled_at.format("%Y-%m-%d %H:%M:%S")
                );
            }
        }
        println!();

        Ok(exit_code::SUCCESS)
    }
}
