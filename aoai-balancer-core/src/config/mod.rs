//! Configuration for the failover engine
//!
//! Configuration is read once at process start, validated, and then passed
//! down explicitly. The engine itself never reads the environment.
//!
//! Sources:
//! - `AZURE_OPENAI_*` environment variables ([`load_from_env`])
//! - YAML or JSON files with `${VAR}` interpolation ([`load_from_yaml`], [`load_from_json`])

mod env;
mod error;
mod schema;
mod secrets;
mod validator;

pub use env::{
    config_from_lookup, interpolate_env_vars, interpolate_with, split_list, API_VERSION_VAR,
    DEPLOYMENT_NAME_VAR, ENDPOINTS_VAR, KEYS_VAR, TIMEOUT_VAR,
};
pub use error::{ConfigError, ConfigResult, ValidationError, ValidationErrorKind};
pub use schema::{
    BackoffConfig, BalancerConfig, DEFAULT_API_VERSION, DEFAULT_DEPLOYMENT_NAME, DEFAULT_METHOD,
    DEFAULT_TIMEOUT_SECS,
};
pub use secrets::SecretString;
pub use validator::ConfigValidator;

use std::fs;
use std::path::Path;

/// Load and validate a configuration from the process environment
pub fn load_from_env() -> ConfigResult<BalancerConfig> {
    load_from_lookup(|name| std::env::var(name).ok())
}

/// Load and validate a configuration from an arbitrary variable source
pub fn load_from_lookup<F>(lookup: F) -> ConfigResult<BalancerConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let config = config_from_lookup(lookup)?;
    ConfigValidator::new().validate(&config)?;
    Ok(config)
}

/// Load a configuration from a YAML file
pub fn load_from_yaml<P: AsRef<Path>>(path: P) -> ConfigResult<BalancerConfig> {
    let path = path.as_ref();
    let content = read_interpolated(path)?;

    let config: BalancerConfig =
        serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_string_lossy().to_string(),
            line: e.location().map(|l| l.line()),
            column: e.location().map(|l| l.column()),
            message: e.to_string(),
        })?;

    ConfigValidator::new().validate(&config)?;
    Ok(config)
}

/// Load a configuration from a JSON file
pub fn load_from_json<P: AsRef<Path>>(path: P) -> ConfigResult<BalancerConfig> {
    let path = path.as_ref();
    let content = read_interpolated(path)?;

    let config: BalancerConfig =
        serde_json::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_string_lossy().to_string(),
            line: Some(e.line()),
            column: Some(e.column()),
            message: e.to_string(),
        })?;

    ConfigValidator::new().validate(&config)?;
    Ok(config)
}

fn read_interpolated(path: &Path) -> ConfigResult<String> {
    let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError {
        path: path.to_string_lossy().to_string(),
        source: e,
    })?;

    interpolate_env_vars(&content)
}
