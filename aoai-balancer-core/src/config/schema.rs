//! Configuration schema structures with serde support

use super::secrets::SecretString;
use crate::failover::{BackoffPolicy, ExponentialBackoff, FixedBackoff, DEFAULT_BACKOFF};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_DEPLOYMENT_NAME: &str = "test";
pub const DEFAULT_API_VERSION: &str = "2024-02-15-preview";
pub const DEFAULT_METHOD: &str = "completions";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Root configuration, built once at process start and passed down
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BalancerConfig {
    /// Deployment base addresses, in failover order
    pub endpoints: Vec<String>,

    /// Keys paired with `endpoints` by position
    pub api_keys: Vec<SecretString>,

    #[serde(default = "default_deployment_name")]
    pub deployment_name: String,

    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Path segment after `/chat/`
    #[serde(default = "default_method")]
    pub method: String,

    /// Per-attempt timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default)]
    pub backoff: BackoffConfig,
}

/// Wait applied between failover attempts
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "strategy", rename_all = "lowercase")]
pub enum BackoffConfig {
    /// Same delay after every failure
    Fixed {
        #[serde(default = "default_backoff_ms")]
        delay_ms: u64,
    },
    /// Growing delay, see [`ExponentialBackoff`]
    Exponential(ExponentialBackoff),
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self::Fixed {
            delay_ms: default_backoff_ms(),
        }
    }
}

impl BackoffConfig {
    /// Instantiate the configured policy
    pub fn build(&self) -> Arc<dyn BackoffPolicy> {
        match self {
            Self::Fixed { delay_ms } => {
                Arc::new(FixedBackoff::new(Duration::from_millis(*delay_ms)))
            }
            Self::Exponential(policy) => Arc::new(policy.clone()),
        }
    }
}

impl BalancerConfig {
    /// Config with the given endpoint/key lists and defaults for everything else
    pub fn new<K>(endpoints: Vec<String>, api_keys: Vec<K>) -> Self
    where
        K: Into<SecretString>,
    {
        Self {
            endpoints,
            api_keys: api_keys.into_iter().map(Into::into).collect(),
            deployment_name: default_deployment_name(),
            api_version: default_api_version(),
            method: default_method(),
            timeout_secs: default_timeout_secs(),
            backoff: BackoffConfig::default(),
        }
    }

    pub fn with_deployment_name(mut self, deployment_name: impl Into<String>) -> Self {
        self.deployment_name = deployment_name.into();
        self
    }

    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn with_backoff(mut self, backoff: BackoffConfig) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// `address (key)` pairs with keys partially redacted, for startup logs
    pub fn describe_endpoints(&self) -> Vec<String> {
        self.endpoints
            .iter()
            .zip(&self.api_keys)
            .map(|(address, key)| format!("{} ({})", address, key.partial_redact()))
            .collect()
    }
}

fn default_deployment_name() -> String {
    DEFAULT_DEPLOYMENT_NAME.to_string()
}

fn default_api_version() -> String {
    DEFAULT_API_VERSION.to_string()
}

fn default_method() -> String {
    DEFAULT_METHOD.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_backoff_ms() -> u64 {
    DEFAULT_BACKOFF.as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_minimal_yaml() {
        let yaml = r#"
endpoints:
  - https://east.openai.azure.com
api_keys:
  - key-east
"#;
        let config: BalancerConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.deployment_name, "test");
        assert_eq!(config.api_version, "2024-02-15-preview");
        assert_eq!(config.method, "completions");
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.backoff, BackoffConfig::Fixed { delay_ms: 1000 });
    }

    #[test]
    fn test_exponential_backoff_section() {
        let yaml = r#"
endpoints: [https://a.example]
api_keys: [k]
backoff:
  strategy: exponential
  initial_delay_ms: 250
  jitter_factor: 0.0
"#;
        let config: BalancerConfig = serde_yaml::from_str(yaml).unwrap();
        match &config.backoff {
            BackoffConfig::Exponential(policy) => {
                assert_eq!(policy.initial_delay_ms, 250);
                assert_eq!(policy.max_delay_ms, 10_000);
            }
            other => panic!("Expected exponential backoff, got {:?}", other),
        }
        assert_eq!(config.backoff.build().delay(1), Duration::from_millis(500));
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let yaml = "endpoints: [a]\napi_keys: [b]\nregion: east\n";
        assert!(serde_yaml::from_str::<BalancerConfig>(yaml).is_err());
    }

    #[test]
    fn test_describe_endpoints_redacts_keys() {
        let config = BalancerConfig::new(
            vec!["https://a.example".to_string()],
            vec!["abcdefghijklmnop"],
        );
        assert_eq!(config.describe_endpoints(), vec!["https://a.example (ab...op)"]);
    }
}
