//! Environment variable loading and interpolation for configuration

use super::error::ConfigError;
use super::schema::{BalancerConfig, DEFAULT_API_VERSION, DEFAULT_DEPLOYMENT_NAME};
use regex::Regex;
use std::sync::OnceLock;

/// Comma separated deployment addresses
pub const ENDPOINTS_VAR: &str = "AZURE_OPENAI_ENDPOINTS";
/// Comma separated keys, paired with the addresses by position
pub const KEYS_VAR: &str = "AZURE_OPENAI_KEYS";
pub const DEPLOYMENT_NAME_VAR: &str = "AZURE_OPENAI_DEPLOYMENT_NAME";
pub const API_VERSION_VAR: &str = "AZURE_OPENAI_API_VERSION";
/// Optional per-attempt timeout in seconds
pub const TIMEOUT_VAR: &str = "AZURE_OPENAI_TIMEOUT_SECS";

/// Pattern for `${VAR}` placeholders
pub(crate) fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").expect("placeholder pattern is a valid regex")
    })
}

/// Split a comma separated list, trimming entries and dropping empty ones
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

/// Build a config from `AZURE_OPENAI_*` variables resolved through `lookup`.
///
/// Missing list variables yield empty lists; the validator reports them.
pub fn config_from_lookup<F>(lookup: F) -> Result<BalancerConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let endpoints = lookup(ENDPOINTS_VAR)
        .map(|value| split_list(&value))
        .unwrap_or_default();
    let api_keys = lookup(KEYS_VAR)
        .map(|value| split_list(&value))
        .unwrap_or_default();

    let mut config = BalancerConfig::new(endpoints, api_keys)
        .with_deployment_name(
            lookup(DEPLOYMENT_NAME_VAR).unwrap_or_else(|| DEFAULT_DEPLOYMENT_NAME.to_string()),
        )
        .with_api_version(
            lookup(API_VERSION_VAR).unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
        );

    if let Some(raw) = lookup(TIMEOUT_VAR) {
        config.timeout_secs = raw.trim().parse().map_err(|_| ConfigError::Invalid {
            message: format!("{} must be a whole number of seconds, got '{}'", TIMEOUT_VAR, raw),
        })?;
    }

    Ok(config)
}

/// Replace `${VAR}` placeholders using `lookup`
pub fn interpolate_with<F>(content: &str, lookup: F) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut result = content.to_string();

    for cap in env_var_pattern().captures_iter(content) {
        let var_name = &cap[1];
        match lookup(var_name) {
            Some(value) => result = result.replace(&cap[0], &value),
            None => {
                return Err(ConfigError::EnvVarNotFound {
                    var: var_name.to_string(),
                })
            }
        }
    }

    Ok(result)
}

/// Interpolate process environment variables in a configuration string
pub fn interpolate_env_vars(content: &str) -> Result<String, ConfigError> {
    interpolate_with(content, |name| std::env::var(name).ok())
}
