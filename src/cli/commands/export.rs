//! Export command implementation
//!
//! This module implements the `export` command: it builds the job spec from
//! the command line (or consumes scheduled options with `--auto`), runs the
//! job with a progress bar and prints the report.

use crate::cli::commands::JobArgs;
use crate::cli::exit_code;
use crate::cli::progress::TerminalProgress;
use crate::config::{load_config, FolioConfig};
use crate::core::export::{ExportJobOrchestrator, ExportServices, JobReport, JobStatus};
use crate::core::state::{AutoExportOptions, StateManager};
use crate::domain::{ActiveDataset, DashboardId, ExportFailure, ExportJobSpec, FolioError};
use clap::Args;
use std::io::IsTerminal;
use std::sync::Arc;
use tokio::sync::watch;

/// Conventional exit code after Ctrl+C
const INTERRUPTED: i32 = 130;

/// Arguments for the export command
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Dashboard to export
    #[arg(long)]
    pub dashboard: String,

    #[command(flatten)]
    pub job: JobArgs,

    /// Use the options stored by `folio schedule` (consumed once)
    #[arg(long, conflicts_with_all = ["mode", "partition", "format"])]
    pub auto: bool,

    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

impl ExportArgs {
    /// Execute the export command
    ///
    /// `cancel` only matters until the job starts; a running job is never
    /// interrupted.
    pub async fn execute(
        &self,
        config_path: &str,
        mut cancel: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!(dashboard = %self.dashboard, "Starting export command");

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Configuration loading failed");
                eprintln!("❌ {e}");
                return Ok(exit_code::CONFIGURATION);
            }
        };

        let dashboard_id = match DashboardId::new(self.dashboard.as_str()) {
            Ok(id) => id,
            Err(e) => {
                eprintln!("❌ {e}");
                return Ok(exit_code::CONFIGURATION);
            }
        };

        let services = match ExportServices::from_config(&config) {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "Failed to initialize export services");
                eprintln!("Failed to initialize export: {e}");
                return Ok(exit_code::CONNECTION);
            }
        };

        let spec = match self.resolve_spec(&config, &services, &dashboard_id).await {
            Ok(Some(spec)) => spec,
            Ok(None) => {
                println!("No scheduled export for dashboard {dashboard_id}.");
                println!("Run 'folio schedule --dashboard {dashboard_id} ...' first.");
                return Ok(exit_code::SUCCESS);
            }
            Err(e) => {
                eprintln!("❌ {e}");
                return Ok(exit_code::CONFIGURATION);
            }
        };

        if !self.yes {
            print_plan(&dashboard_id, &spec, &config);
            let confirmed = tokio::select! {
                answer = confirm() => answer?,
                Ok(()) = cancel.changed() => {
                    println!();
                    println!("Export cancelled.");
                    return Ok(INTERRUPTED);
                }
            };
            if !confirmed {
                println!("Export cancelled.");
                return Ok(exit_code::SUCCESS);
            }
        }

        if *cancel.borrow() {
            tracing::info!("Export cancelled before start");
            println!("Export cancelled.");
            return Ok(INTERRUPTED);
        }

        let state = services.state.clone();
        let scheduled = if self.auto {
            state.take_auto_export_options(&dashboard_id).await?
        } else {
            None
        };

        let progress = Arc::new(TerminalProgress::new(!self.json && std::io::stdout().is_terminal()));
        let orchestrator = ExportJobOrchestrator::new(
            services,
            config.export.clone(),
            Arc::new(ActiveDataset::default()),
        )
        .with_observer(progress.clone());

        println!("🚀 Starting export...");
        let result = orchestrator.run(&dashboard_id, &spec).await;
        progress.finish();

        let report = match result {
            Ok(report) => report,
            Err(e) => {
                if let Some(options) = &scheduled {
                    reschedule(&state, &dashboard_id, options).await;
                }
                return Ok(report_error(&e));
            }
        };

        if self.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            print_report(&report);
        }

        Ok(match report.status() {
            JobStatus::Succeeded => exit_code::SUCCESS,
            JobStatus::PartiallySucceeded => exit_code::PARTIAL,
            JobStatus::Failed => exit_code::FATAL,
        })
    }

    /// The job spec from the command line, or the scheduled one with `--auto`
    async fn resolve_spec(
        &self,
        config: &FolioConfig,
        services: &ExportServices,
        dashboard_id: &DashboardId,
    ) -> anyhow::Result<Option<ExportJobSpec>> {
        if !self.auto {
            let spec = self
                .job
                .job_spec(config.export.format)
                .map_err(anyhow::Error::msg)?;
            return Ok(Some(spec));
        }

        // Left in place until the job is cleared to start
        let options = services.state.auto_export_options(dashboard_id).await?;
        if let Some(options) = &options {
            tracing::info!(
                dashboard_id = %dashboard_id,
                scheduled_at = %options.scheduled_at,
                "Using scheduled export options"
            );
        }
        Ok(options.map(|o| o.into_job_spec()))
    }
}

/// Put back scheduled options for a job that was refused before it started
async fn reschedule(state: &StateManager, dashboard_id: &DashboardId, options: &AutoExportOptions) {
    match state.save_auto_export_options(dashboard_id, options).await {
        Ok(()) => println!("Scheduled options kept for the next 'folio export --auto'."),
        Err(e) => {
            tracing::error!(dashboard_id = %dashboard_id, error = %e, "Failed to restore scheduled options")
        }
    }
}

async fn confirm() -> anyhow::Result<bool> {
    use std::io::Write;

    print!("Proceed with export? [y/N]: ");
    std::io::stdout().flush()?;

    let input = tokio::task::spawn_blocking(|| {
        let mut input = String::new();
        std::io::stdin().read_line(&mut input).map(|_| input)
    })
    .await??;

    Ok(input.trim().eq_ignore_ascii_case("y"))
}

fn print_plan(dashboard_id: &DashboardId, spec: &ExportJobSpec, config: &FolioConfig) {
    println!("Export Configuration:");
    println!("  Dashboard: {dashboard_id}");
    println!("  Mode: {:?}", spec.export_type);
    if !spec.partitions.is_empty() {
        let names: Vec<&str> = spec.partitions.iter().map(|p| p.as_str()).collect();
        println!("  Partitions: {}", names.join(", "));
    }
    println!("  Format: {}", spec.format);
    println!("  Concurrent widgets: {}", config.export.max_concurrent_tasks);
    println!();
}

fn print_report(report: &JobReport) {
    println!();
    println!("📊 Export Summary:");
    for partition in &report.partitions {
        match &partition.document_url {
            Some(url) => {
                println!("  ✅ {}: {}", partition.partition, url);
                println!("     {}", partition.summary_line());
            }
            None => println!(
                "  ❌ {}: {}",
                partition.partition,
                partition.error.as_deref().unwrap_or("no document")
            ),
        }
    }
    println!("  Duration: {:.2}s", report.duration.as_secs_f64());
    println!("  Run ID: {}", report.run_id);
    println!();

    match report.status() {
        JobStatus::Succeeded => println!("✅ Export completed: {}", report.summary_line()),
        JobStatus::PartiallySucceeded => {
            println!("⚠️  Export completed with failures: {}", report.summary_line())
        }
        JobStatus::Failed => println!(
            "❌ Export failed: {}",
            report.first_error().unwrap_or("no document was produced")
        ),
    }
}

/// Print a job-level error and map it to an exit code
fn report_error(error: &FolioError) -> i32 {
    tracing::error!(error = %error, "Export failed");
    match error {
        FolioError::Export(ExportFailure::SessionInsufficient { .. }) => {
            eprintln!("⏳ {error}");
            exit_code::SESSION
        }
        FolioError::Validation(_) | FolioError::Configuration(_) => {
            eprintln!("❌ {error}");
            exit_code::CONFIGURATION
        }
        FolioError::Connection(_)
        | FolioError::Timeout { .. }
        | FolioError::Remote { .. }
        | FolioError::Session(_) => {
            eprintln!("❌ {error}");
            exit_code::CONNECTION
        }
        _ => {
            eprintln!("Export failed: {error}");
            exit_code::FATAL
        }
    }
}
