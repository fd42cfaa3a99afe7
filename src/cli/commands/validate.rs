//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the Folio configuration file.

use crate::cli::exit_code;
use crate::config::load_config;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    ///
    /// `load_config` validates as it loads, so a loaded file is valid.
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Configuration is invalid");
                println!("   Error: {e}");
                return Ok(exit_code::CONFIGURATION);
            }
        };

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Export Service: {}", config.service.base_url);
        println!(
            "  API Token: {}",
            if config.service.api_token.is_some() {
                "set"
            } else {
                "not set"
            }
        );
        println!("  Render Service: {}", config.renderer.base_url);
        println!("  Format: {}", config.export.format);
        println!("  Capture Timeout: {}s", config.export.capture_timeout_secs);
        println!("  Remote Timeout: {}s", config.export.remote_timeout_secs);
        println!("  Concurrent Widgets: {}", config.export.max_concurrent_tasks);
        println!("  Minimum Session: {} min", config.export.min_session_minutes);
        println!("  Baseline Document: {}", config.export.include_baseline);
        println!("  State File: {}", config.state.path);
        println!();
        Ok(exit_code::SUCCESS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_missing_file_is_configuration_error() {
        let code = ValidateArgs {}
            .execute("/nonexistent/folio.toml")
            .await
            .unwrap();
        assert_eq!(code, exit_code::CONFIGURATION);
    }

    #[tokio::test]
    async fn test_valid_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[service]\nbase_url = \"https://reports.example.org/api\"").unwrap();

        let code = ValidateArgs {}
            .execute(file.path().to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(code, exit_code::SUCCESS);
    }
}
