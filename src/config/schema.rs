//! Configuration schema types
//!
//! This module defines the configuration structure for Folio. Every section
//! has defaults except `[service]`, whose `base_url` must be provided.

use crate::config::SecretString;
use crate::domain::DocumentFormat;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main Folio configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolioConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Export service (data, session, assets, documents)
    pub service: ServiceConfig,

    /// Render service (owns widget pixels)
    #[serde(default)]
    pub renderer: RendererConfig,

    /// Export pipeline settings
    #[serde(default)]
    pub export: ExportConfig,

    /// Local state (document cache, one-shot export options)
    #[serde(default)]
    pub state: StateConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl FolioConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.service.validate()?;
        self.renderer.validate()?;
        self.export.validate()?;
        self.state.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Retry configuration for idempotent reads
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,

    /// Initial delay in milliseconds
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    /// Maximum delay in milliseconds
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Backoff multiplier
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
}

impl RetryConfig {
    /// Delay before retry number `attempt` (1-based)
    pub fn delay_for(&self, attempt: usize) -> Duration {
        let factor = self
            .backoff_multiplier
            .powi(attempt.saturating_sub(1) as i32);
        let delay_ms = (self.initial_delay_ms as f64 * factor) as u64;
        Duration::from_millis(delay_ms.min(self.max_delay_ms))
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            backoff_multiplier: default_backoff_multiplier(),
        }
    }
}

/// Export service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Base URL of the export service
    pub base_url: String,

    /// Bearer token (optional)
    /// Stored securely in memory and automatically zeroized on drop
    #[serde(default)]
    pub api_token: Option<SecretString>,

    /// HTTP client timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// TLS certificate verification enabled
    ///
    /// Only disable against development servers with self-signed certificates.
    #[serde(default = "default_true")]
    pub tls_verify: bool,

    /// Retry configuration
    #[serde(default)]
    pub retry: RetryConfig,
}

impl ServiceConfig {
    fn validate(&self) -> Result<(), String> {
        use secrecy::ExposeSecret;

        validate_url("service.base_url", &self.base_url)?;

        if self.timeout_seconds == 0 {
            return Err("service.timeout_seconds must be greater than 0".to_string());
        }

        if let Some(token) = &self.api_token {
            if token.expose_secret().is_empty() {
                return Err("service.api_token cannot be empty when set".to_string());
            }
        }

        if self.retry.backoff_multiplier < 1.0 {
            return Err("service.retry.backoff_multiplier must be at least 1.0".to_string());
        }

        Ok(())
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api".to_string(),
            api_token: None,
            timeout_seconds: default_timeout_seconds(),
            tls_verify: true,
            retry: RetryConfig::default(),
        }
    }
}

/// Render service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RendererConfig {
    /// Base URL of the render service
    #[serde(default = "default_renderer_url")]
    pub base_url: String,

    /// HTTP client timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl RendererConfig {
    fn validate(&self) -> Result<(), String> {
        validate_url("renderer.base_url", &self.base_url)?;
        if self.timeout_seconds == 0 {
            return Err("renderer.timeout_seconds must be greater than 0".to_string());
        }
        Ok(())
    }
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            base_url: default_renderer_url(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

/// Export pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Document format (pdf or pptx)
    #[serde(default)]
    pub format: DocumentFormat,

    /// Timeout for each capture attempt (capture + upload), in seconds
    #[serde(default = "default_capture_timeout_secs")]
    pub capture_timeout_secs: u64,

    /// Timeout for document generation and merge calls, in seconds
    #[serde(default = "default_remote_timeout_secs")]
    pub remote_timeout_secs: u64,

    /// Widgets exported concurrently within one batch
    #[serde(default = "default_max_concurrent_tasks")]
    pub max_concurrent_tasks: usize,

    /// Session time required before a job may start, in minutes
    #[serde(default = "default_min_session_minutes")]
    pub min_session_minutes: u64,

    /// Add an unfiltered document after per-partition documents
    #[serde(default = "default_true")]
    pub include_baseline: bool,
}

impl ExportConfig {
    fn validate(&self) -> Result<(), String> {
        if !(1..=120).contains(&self.capture_timeout_secs) {
            return Err(format!(
                "export.capture_timeout_secs must be between 1 and 120, got {}",
                self.capture_timeout_secs
            ));
        }
        if !(1..=600).contains(&self.remote_timeout_secs) {
            return Err(format!(
                "export.remote_timeout_secs must be between 1 and 600, got {}",
                self.remote_timeout_secs
            ));
        }
        if !(1..=256).contains(&self.max_concurrent_tasks) {
            return Err(format!(
                "export.max_concurrent_tasks must be between 1 and 256, got {}",
                self.max_concurrent_tasks
            ));
        }
        if self.min_session_minutes > 1440 {
            return Err(format!(
                "export.min_session_minutes must be at most 1440, got {}",
                self.min_session_minutes
            ));
        }
        Ok(())
    }

    pub fn capture_timeout(&self) -> Duration {
        Duration::from_secs(self.capture_timeout_secs)
    }

    pub fn remote_timeout(&self) -> Duration {
        Duration::from_secs(self.remote_timeout_secs)
    }

    /// Minimum remaining session time, in milliseconds
    pub fn min_session_ms(&self) -> u64 {
        self.min_session_minutes.saturating_mul(60 * 1000)
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            format: DocumentFormat::default(),
            capture_timeout_secs: default_capture_timeout_secs(),
            remote_timeout_secs: default_remote_timeout_secs(),
            max_concurrent_tasks: default_max_concurrent_tasks(),
            min_session_minutes: default_min_session_minutes(),
            include_baseline: true,
        }
    }
}

/// Local state configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateConfig {
    /// Path of the JSON state file
    #[serde(default = "default_state_path")]
    pub path: String,
}

impl StateConfig {
    fn validate(&self) -> Result<(), String> {
        if self.path.trim().is_empty() {
            return Err("state.path cannot be empty".to_string());
        }
        Ok(())
    }
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            path: default_state_path(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable JSON file logging
    #[serde(default = "default_true")]
    pub local_enabled: bool,

    /// Directory for log files
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Rotation (daily, hourly, never)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid = ["daily", "hourly", "never"];
        if !valid.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid.join(", ")
            ));
        }
        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when file logging is enabled".to_string());
        }
        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: true,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

fn validate_url(field: &str, value: &str) -> Result<(), String> {
    if value.is_empty() {
        return Err(format!("{field} cannot be empty"));
    }
    if !value.starts_with("http://") && !value.starts_with("https://") {
        return Err(format!("{field} must start with http:// or https://"));
    }
    url::Url::parse(value).map_err(|e| format!("{field} is not a valid URL: {e}"))?;
    Ok(())
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_timeout_seconds() -> u64 {
    60
}

fn default_initial_delay_ms() -> u64 {
    500
}

fn default_max_delay_ms() -> u64 {
    8000
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_max_retries() -> usize {
    3
}

fn default_renderer_url() -> String {
    "http://localhost:9222/render".to_string()
}

fn default_capture_timeout_secs() -> u64 {
    10
}

fn default_remote_timeout_secs() -> u64 {
    60
}

fn default_max_concurrent_tasks() -> usize {
    8
}

fn default_min_session_minutes() -> u64 {
    12
}

fn default_state_path() -> String {
    ".folio/state.json".to_string()
}

fn default_local_path() -> String {
    "/var/log/folio".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
