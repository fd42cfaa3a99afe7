//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::FolioConfig;
use super::secret_string;
use crate::domain::errors::FolioError;
use crate::domain::result::Result;
use crate::domain::DocumentFormat;
use regex::Regex;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into FolioConfig
/// 4. Applies environment variable overrides (FOLIO_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if the file cannot be read, a referenced environment
/// variable is unset, parsing fails, or validation fails.
///
/// # Examples
///
/// ```no_run
/// use folio::config::loader::load_config;
///
/// let config = load_config("folio.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<FolioConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(FolioError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        FolioError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: FolioConfig = toml::from_str(&contents)
        .map_err(|e| FolioError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        FolioError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched.
///
/// # Errors
///
/// Returns an error listing every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| FolioError::Configuration(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::new();
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{var_name}}}");
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(FolioError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies environment variable overrides using the FOLIO_* prefix
///
/// Variables follow the pattern FOLIO_<SECTION>_<KEY>, for example
/// FOLIO_SERVICE_BASE_URL or FOLIO_EXPORT_MAX_CONCURRENT_TASKS.
fn apply_env_overrides(config: &mut FolioConfig) -> Result<()> {
    if let Ok(val) = std::env::var("FOLIO_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    // Service overrides
    if let Ok(val) = std::env::var("FOLIO_SERVICE_BASE_URL") {
        config.service.base_url = val;
    }
    if let Ok(val) = std::env::var("FOLIO_SERVICE_API_TOKEN") {
        config.service.api_token = Some(secret_string(val));
    }
    if let Ok(val) = std::env::var("FOLIO_SERVICE_TIMEOUT_SECONDS") {
        if let Ok(secs) = val.parse() {
            config.service.timeout_seconds = secs;
        }
    }
    if let Ok(val) = std::env::var("FOLIO_SERVICE_TLS_VERIFY") {
        config.service.tls_verify = val.parse().unwrap_or(true);
    }

    // Renderer overrides
    if let Ok(val) = std::env::var("FOLIO_RENDERER_BASE_URL") {
        config.renderer.base_url = val;
    }

    // Export overrides
    if let Ok(val) = std::env::var("FOLIO_EXPORT_FORMAT") {
        config.export.format = DocumentFormat::from_str(&val).map_err(FolioError::Configuration)?;
    }
    if let Ok(val) = std::env::var("FOLIO_EXPORT_CAPTURE_TIMEOUT_SECS") {
        if let Ok(secs) = val.parse() {
            config.export.capture_timeout_secs = secs;
        }
    }
    if let Ok(val) = std::env::var("FOLIO_EXPORT_REMOTE_TIMEOUT_SECS") {
        if let Ok(secs) = val.parse() {
            config.export.remote_timeout_secs = secs;
        }
    }
    if let Ok(val) = std::env::var("FOLIO_EXPORT_MAX_CONCURRENT_TASKS") {
        if let Ok(cap) = val.parse() {
            config.export.max_concurrent_tasks = cap;
        }
    }
    if let Ok(val) = std::env::var("FOLIO_EXPORT_MIN_SESSION_MINUTES") {
        if let Ok(minutes) = val.parse() {
            config.export.min_session_minutes = minutes;
        }
    }
    if let Ok(val) = std::env::var("FOLIO_EXPORT_INCLUDE_BASELINE") {
        config.export.include_baseline = val.parse().unwrap_or(true);
    }

    // State overrides
    if let Ok(val) = std::env::var("FOLIO_STATE_PATH") {
        config.state.path = val;
    }

    // Logging overrides
    if let Ok(val) = std::env::var("FOLIO_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(true);
    }
    if let Ok(val) = std::env::var("FOLIO_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }

    Ok(())
}
