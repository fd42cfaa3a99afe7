//! Configuration management for Folio.
//!
//! Folio reads a TOML file with:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `FOLIO_<SECTION>_<KEY>` environment overrides
//! - Default values for optional settings
//! - Validation on load
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Log level
//! - [`ServiceConfig`] - Export service URL, token, timeouts, retries
//! - [`RendererConfig`] - Render service URL
//! - [`ExportConfig`] - Format, capture/remote timeouts, concurrency cap, session minimum
//! - [`StateConfig`] - Local state file
//! - [`LoggingConfig`] - File logging
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [service]
//! base_url = "https://reports.example.org/api"
//! api_token = "${FOLIO_API_TOKEN}"
//!
//! [renderer]
//! base_url = "https://reports.example.org/render"
//!
//! [export]
//! format = "pdf"
//! capture_timeout_secs = 10
//! max_concurrent_tasks = 8
//! min_session_minutes = 12
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::load_config;
pub use schema::{
    ApplicationConfig, ExportConfig, FolioConfig, LoggingConfig, RendererConfig, RetryConfig,
    ServiceConfig, StateConfig,
};
pub use secret::{bearer_header, secret_string, SecretString, SecretValue};
