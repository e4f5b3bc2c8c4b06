//! Configuration loading from disk and the process environment.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use thiserror::Error;

use crate::config::schema::GateConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {key}: {value:?}")]
    Env { key: &'static str, value: String },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

impl ConfigError {
    /// True when the only thing wrong is the absent admin password hash.
    pub fn is_missing_password_hash(&self) -> bool {
        matches!(self, ConfigError::Validation(errors)
            if errors.iter().any(|e| *e == ValidationError::MissingPasswordHash))
    }
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load a TOML file, apply environment overrides and validate.
pub fn load_config(path: &Path) -> Result<GateConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let mut config: GateConfig = toml::from_str(&content)?;

    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Build a configuration from defaults plus environment overrides only.
pub fn load_from_env() -> Result<GateConfig, ConfigError> {
    let mut config = GateConfig::default();

    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Overlay environment variables (typically from a `.env` file) on `config`.
///
/// `lookup` abstracts the environment so callers can supply their own source.
pub fn apply_env_overrides<F>(config: &mut GateConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(user) = lookup("ADMIN_USER") {
        config.admin.username = user;
    }
    if let Some(hash) = lookup("ADMIN_PW_HASH") {
        config.admin.password_hash = Some(hash.trim().to_string());
    }
    if let Some(dir) = lookup("STATIC_FOLDER") {
        config.site.static_dir = dir;
    }
    if let Some(file) = lookup("LOG_FILE") {
        config.observability.audit_log_file = Some(file);
    }
    if let Some(port) = parse_var::<u16, _>(&lookup, "PORT")? {
        let host = config
            .listener
            .bind_address
            .rsplit_once(':')
            .map(|(host, _)| host.to_string())
            .unwrap_or_else(|| "0.0.0.0".to_string());
        config.listener.bind_address = format!("{host}:{port}");
    }
    if let Some(threshold) = parse_var(&lookup, "LOCKOUT_THRESHOLD")? {
        config.admin.lockout_threshold = threshold;
    }
    if let Some(period) = parse_var(&lookup, "LOCKOUT_PERIOD")? {
        config.admin.lockout_period_secs = period;
    }
    if let Some(window) = parse_var(&lookup, "RATE_LIMIT_WINDOW")? {
        config.admin.rate_window_secs = window;
    }
    if let Some(max) = parse_var(&lookup, "RATE_LIMIT_MAX")? {
        config.admin.rate_max_requests = max;
    }
    Ok(())
}

fn parse_var<T, F>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Env { key, value }),
    }
}
