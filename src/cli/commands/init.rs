//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use crate::cli::exit_code;
use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "folio.toml")]
    pub output: String,

    /// Include example values and comments
    #[arg(long)]
    pub with_examples: bool,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing Folio configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(exit_code::CONFIGURATION);
        }

        let config_content = if self.with_examples {
            Self::generate_config_with_examples()
        } else {
            Self::generate_minimal_config()
        };

        match fs::write(&self.output, config_content) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your service URLs", self.output);
                println!("  2. Create a .env file with FOLIO_API_TOKEN");
                println!("  3. Validate configuration: folio validate-config");
                println!("  4. Run export: folio export --dashboard <id>");
                println!();
                Ok(exit_code::SUCCESS)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {e}");
                Ok(exit_code::FATAL)
            }
        }
    }

    /// Generate minimal configuration
    fn generate_minimal_config() -> String {
        r#"# Folio Configuration File

[application]
log_level = "info"

[service]
base_url = "https://reports.example.org/api"
api_token = "${FOLIO_API_TOKEN}"

[renderer]
base_url = "https://reports.example.org/render"

[export]
format = "pdf"
max_concurrent_tasks = 8
min_session_minutes = 12

[state]
path = ".folio/state.json"

[logging]
local_enabled = false
"#
        .to_string()
    }

    /// Generate configuration with examples and comments
    fn generate_config_with_examples() -> String {
        r#"# Folio Configuration File
#
# Every value can be overridden with FOLIO_<SECTION>_<KEY>, for example
# FOLIO_EXPORT_MAX_CONCURRENT_TASKS=4. ${VAR} placeholders are replaced with
# environment variables (a .env file is loaded at startup).

[application]
# trace | debug | info | warn | error
log_level = "info"

# Export service: dashboard data, session, asset storage, document generation
[service]
base_url = "https://reports.example.org/api"
api_token = "${FOLIO_API_TOKEN}"
timeout_seconds = 60
# Only disable against development servers with self-signed certificates
tls_verify = true

# Retries for idempotent reads (dashboard data, session lookup)
[service.retry]
max_retries = 3
initial_delay_ms = 500
max_delay_ms = 8000
backoff_multiplier = 2.0

# Render service: owns the widget pixels
[renderer]
base_url = "https://reports.example.org/render"
timeout_seconds = 60

[export]
# pdf | pptx
format = "pdf"
# Per capture attempt (capture + upload), 1-120
capture_timeout_secs = 10
# Per document generation or merge call, 1-600
remote_timeout_secs = 60
# Widgets exported concurrently within one batch, 1-256
max_concurrent_tasks = 8
# Refuse to start when the session expires sooner than this
min_session_minutes = 12
# Add an unfiltered document after per-partition documents
include_baseline = true

[state]
# Widget document cache and scheduled export options
path = ".folio/state.json"

[logging]
# JSON log files in addition to console output
local_enabled = true
local_path = "/var/log/folio"
# daily | hourly | never
local_rotation = "daily"
"#
        .to_string()
    }
}
