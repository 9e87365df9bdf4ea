//! Failover across interchangeable deployments
//!
//! This module implements the core of the crate:
//! - [`EndpointPool`]: ordered endpoint/key pairs
//! - [`BackoffPolicy`]: the wait between attempts
//! - [`FailoverEngine`]: the attempt loop and failure classification
//! - [`FailoverError`]: terminal failures surfaced to callers

pub mod backoff;
pub mod engine;
pub mod error;
pub mod pool;

pub use backoff::{BackoffPolicy, ExponentialBackoff, FixedBackoff, DEFAULT_BACKOFF};
pub use engine::{AttemptRecord, FailoverBuilder, FailoverEngine, FailoverResult};
pub use error::{
    ErrorClassification, FailoverError, CONTENT_FILTER_APP_CODE, TOO_MANY_REQUESTS_APP_CODE,
};
pub use pool::{Endpoint, EndpointPool};
