//! Configuration validation utilities

use super::env::env_var_pattern;
use super::error::{ValidationError, ValidationErrorKind};
use super::schema::{BackoffConfig, BalancerConfig};
use url::Url;

/// Validates a [`BalancerConfig`] before any engine is built from it
#[derive(Debug, Default, Clone, Copy)]
pub struct ConfigValidator;

impl ConfigValidator {
    pub fn new() -> Self {
        Self
    }

    pub fn validate(&self, config: &BalancerConfig) -> Result<(), ValidationError> {
        self.validate_endpoints(config)?;
        self.validate_keys(config)?;
        self.validate_call_settings(config)?;
        self.validate_backoff(&config.backoff)?;
        Ok(())
    }

    fn validate_endpoints(&self, config: &BalancerConfig) -> Result<(), ValidationError> {
        if config.endpoints.is_empty() {
            return Err(ValidationError::required("endpoints")
                .with_context("Azure OpenAI endpoints and keys must be configured"));
        }

        for (i, endpoint) in config.endpoints.iter().enumerate() {
            let field = format!("endpoints[{}]", i);

            if env_var_pattern().is_match(endpoint) {
                return Err(ValidationError::invalid_value(
                    field,
                    "resolved address",
                    endpoint.clone(),
                )
                .with_context("unresolved environment placeholder"));
            }

            let url = Url::parse(endpoint).map_err(|e| {
                ValidationError::new(
                    field.clone(),
                    ValidationErrorKind::InvalidUrl {
                        message: e.to_string(),
                    },
                )
            })?;

            if url.scheme() != "http" && url.scheme() != "https" {
                return Err(ValidationError::new(
                    field,
                    ValidationErrorKind::InvalidUrl {
                        message: format!("unsupported scheme '{}'", url.scheme()),
                    },
                ));
            }
        }

        Ok(())
    }

    fn validate_keys(&self, config: &BalancerConfig) -> Result<(), ValidationError> {
        if config.api_keys.is_empty() {
            return Err(ValidationError::required("api_keys")
                .with_context("Azure OpenAI endpoints and keys must be configured"));
        }

        if config.api_keys.len() != config.endpoints.len() {
            return Err(ValidationError::new(
                "api_keys",
                ValidationErrorKind::Incompatible {
                    message: format!(
                        "{} endpoints configured but {} api keys",
                        config.endpoints.len(),
                        config.api_keys.len()
                    ),
                },
            ));
        }

        for (i, key) in config.api_keys.iter().enumerate() {
            if key.is_empty() {
                return Err(ValidationError::required(format!("api_keys[{}]", i)));
            }
            if env_var_pattern().is_match(key.expose_secret()) {
                return Err(ValidationError::invalid_value(
                    format!("api_keys[{}]", i),
                    "resolved key",
                    "unresolved placeholder",
                ));
            }
        }

        Ok(())
    }

    fn validate_call_settings(&self, config: &BalancerConfig) -> Result<(), ValidationError> {
        if config.deployment_name.trim().is_empty() {
            return Err(ValidationError::required("deployment_name"));
        }
        if config.api_version.trim().is_empty() {
            return Err(ValidationError::required("api_version"));
        }
        if config.method.trim().is_empty() {
            return Err(ValidationError::required("method"));
        }
        if config.timeout_secs == 0 {
            return Err(ValidationError::out_of_range(
                "timeout_secs",
                "timeout must be greater than zero",
            ));
        }
        Ok(())
    }

    fn validate_backoff(&self, backoff: &BackoffConfig) -> Result<(), ValidationError> {
        if let BackoffConfig::Exponential(policy) = backoff {
            if policy.exponential_base < 1.0 {
                return Err(ValidationError::out_of_range(
                    "backoff.exponential_base",
                    format!("must be >= 1.0, got {}", policy.exponential_base),
                ));
            }
            if !(0.0..=1.0).contains(&policy.jitter_factor) {
                return Err(ValidationError::out_of_range(
                    "backoff.jitter_factor",
                    format!("must be within 0.0..=1.0, got {}", policy.jitter_factor),
                ));
            }
            if policy.max_delay_ms < policy.initial_delay_ms {
                return Err(ValidationError::out_of_range(
                    "backoff.max_delay_ms",
                    "must not be below initial_delay_ms",
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::failover::ExponentialBackoff;

    fn config(endpoints: &[&str], keys: &[&str]) -> BalancerConfig {
        BalancerConfig::new(
            endpoints.iter().map(|e| e.to_string()).collect(),
            keys.to_vec(),
        )
    }

    #[test]
    fn test_valid_config() {
        let config = config(&["https://a.example", "http://localhost:8080"], &["k1", "k2"]);
        assert!(ConfigValidator::new().validate(&config).is_ok());
    }

    #[test]
    fn test_empty_endpoints() {
        let err = ConfigValidator::new()
            .validate(&config(&[], &["k1"]))
            .unwrap_err();
        assert_eq!(err.field_path, "endpoints");
    }

    #[test]
    fn test_mismatched_lengths() {
        let err = ConfigValidator::new()
            .validate(&config(&["https://a.example"], &["k1", "k2"]))
            .unwrap_err();
        assert_eq!(err.field_path, "api_keys");
        assert!(matches!(err.kind, ValidationErrorKind::Incompatible { .. }));
    }

    #[test]
    fn test_invalid_url() {
        let err = ConfigValidator::new()
            .validate(&config(&["https://a.example", "not a url"], &["k1", "k2"]))
            .unwrap_err();
        assert_eq!(err.field_path, "endpoints[1]");
        assert!(matches!(err.kind, ValidationErrorKind::InvalidUrl { .. }));
    }

    #[test]
    fn test_unsupported_scheme() {
        let err = ConfigValidator::new()
            .validate(&config(&["ftp://a.example"], &["k1"]))
            .unwrap_err();
        assert!(matches!(err.kind, ValidationErrorKind::InvalidUrl { .. }));
    }

    #[test]
    fn test_unresolved_placeholder() {
        let err = ConfigValidator::new()
            .validate(&config(&["${EAST_ENDPOINT}"], &["k1"]))
            .unwrap_err();
        assert_eq!(err.field_path, "endpoints[0]");
    }

    #[test]
    fn test_zero_timeout() {
        let config = config(&["https://a.example"], &["k1"]).with_timeout_secs(0);
        let err = ConfigValidator::new().validate(&config).unwrap_err();
        assert_eq!(err.field_path, "timeout_secs");
    }

    #[test]
    fn test_bad_jitter() {
        let config = config(&["https://a.example"], &["k1"]).with_backoff(
            BackoffConfig::Exponential(ExponentialBackoff {
                jitter_factor: 1.5,
                ..Default::default()
            }),
        );
        let err = ConfigValidator::new().validate(&config).unwrap_err();
        assert_eq!(err.field_path, "backoff.jitter_factor");
    }
}
