//! Configuration loading from disk and the process environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Credential for the GitHub API.
pub const ENV_GITHUB_TOKEN: &str = "GITHUB_TOKEN";
/// Gist holding the stats document.
pub const ENV_GIST_ID: &str = "GIST_ID";
/// Explicit file name inside the gist.
pub const ENV_STATS_FILE_NAME: &str = "STATS_FILE_NAME";
/// Override for the GitHub API base URL.
pub const ENV_GITHUB_API_URL: &str = "GITHUB_API_URL";
/// Override for the listener address.
pub const ENV_BIND_ADDRESS: &str = "GATEWAY_BIND_ADDRESS";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file, then layer the
/// environment on top.
pub fn load_config(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let mut config: GatewayConfig = toml::from_str(&content)?;

    apply_env(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Build configuration from defaults and the environment only.
pub fn from_env() -> Result<GatewayConfig, ConfigError> {
    let mut config = GatewayConfig::default();
    apply_env(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Apply overrides from the process environment.
pub fn apply_env(config: &mut GatewayConfig) {
    apply_overrides(config, |key| std::env::var(key).ok());
}

/// Apply overrides from an arbitrary lookup. Unset or empty values leave the
/// configuration untouched.
pub fn apply_overrides<F>(config: &mut GatewayConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

    if let Some(token) = get(ENV_GITHUB_TOKEN) {
        config.github.token = Some(token);
    }
    if let Some(gist_id) = get(ENV_GIST_ID) {
        config.stats.gist_id = Some(gist_id);
    }
    if let Some(file_name) = get(ENV_STATS_FILE_NAME) {
        config.stats.file_name = Some(file_name);
    }
    if let Some(api_url) = get(ENV_GITHUB_API_URL) {
        config.github.api_base_url = api_url;
    }
    if let Some(bind) = get(ENV_BIND_ADDRESS) {
        config.server.bind_address = bind;
    }
}
