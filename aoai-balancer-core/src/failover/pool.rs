//! Ordered, immutable set of deployment endpoints

use crate::config::{ConfigError, SecretString, ValidationError, ValidationErrorKind};

/// One deployment address and the key that authenticates against it.
/// The key prints as `[REDACTED]` in debug output.
#[derive(Debug, Clone, PartialEq)]
pub struct Endpoint {
    address: String,
    api_key: SecretString,
}

impl Endpoint {
    pub fn new(address: impl Into<String>, api_key: impl Into<SecretString>) -> Self {
        Self {
            address: address.into(),
            api_key: api_key.into(),
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn api_key(&self) -> &SecretString {
        &self.api_key
    }
}

/// Endpoints paired by position with their keys. Always non-empty.
#[derive(Debug, Clone)]
pub struct EndpointPool {
    endpoints: Vec<Endpoint>,
}

impl EndpointPool {
    /// Pair `addresses[i]` with `keys[i]`.
    ///
    /// Fails when either list is empty or the lengths differ.
    pub fn new<K>(addresses: Vec<String>, keys: Vec<K>) -> Result<Self, ConfigError>
    where
        K: Into<SecretString>,
    {
        if addresses.is_empty() {
            return Err(ValidationError::required("endpoints")
                .with_context("At least one endpoint address must be configured")
                .into());
        }
        if keys.is_empty() {
            return Err(ValidationError::required("api_keys")
                .with_context("At least one api key must be configured")
                .into());
        }
        if addresses.len() != keys.len() {
            return Err(ValidationError::new(
                "api_keys",
                ValidationErrorKind::Incompatible {
                    message: format!(
                        "{} endpoints configured but {} api keys",
                        addresses.len(),
                        keys.len()
                    ),
                },
            )
            .into());
        }

        let endpoints = addresses
            .into_iter()
            .zip(keys)
            .map(|(address, key)| Endpoint::new(address, key))
            .collect();

        Ok(Self { endpoints })
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    /// Always false; kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Endpoint> {
        self.endpoints.get(index)
    }

    /// Endpoints in failover order
    pub fn iter(&self) -> impl Iterator<Item = &Endpoint> {
        self.endpoints.iter()
    }

    pub fn addresses(&self) -> Vec<&str> {
        self.endpoints.iter().map(Endpoint::address).collect()
    }
}
