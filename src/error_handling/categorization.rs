//! Error categorization and retry strategy.
//!
//! This module provides functions to categorize transport errors and configure the
//! retry strategy used for the redirect map fetch.

use std::time::Duration;
use tokio_retry::strategy::ExponentialBackoff;

use super::types::{ErrorType, ProbeError};

/// Creates an exponential backoff retry strategy.
///
/// Returns a retry strategy configured with:
/// - Initial delay: `RETRY_INITIAL_DELAY_MS` milliseconds
/// - Backoff factor: `RETRY_FACTOR`
/// - Maximum delay: `RETRY_MAX_DELAY_SECS` seconds
/// - Maximum retries: `RETRY_MAX_ATTEMPTS`
///
/// Only the redirect map fetch is retried. Live-site probes never are: a failing
/// probe is itself the finding.
pub fn get_retry_strategy() -> impl Iterator<Item = Duration> {
    ExponentialBackoff::from_millis(crate::config::RETRY_INITIAL_DELAY_MS)
        .factor(crate::config::RETRY_FACTOR)
        .max_delay(Duration::from_secs(crate::config::RETRY_MAX_DELAY_SECS))
        .take(crate::config::RETRY_MAX_ATTEMPTS)
}

/// Categorizes a `reqwest::Error` into an `ErrorType`.
pub fn categorize_reqwest_error(error: &reqwest::Error) -> ErrorType {
    if error.is_builder() {
        ErrorType::HttpRequestBuilderError
    } else if error.is_redirect() {
        ErrorType::HttpRequestRedirectError
    } else if error.is_timeout() {
        ErrorType::HttpRequestTimeoutError
    } else if error.is_connect() {
        ErrorType::HttpRequestConnectError
    } else if error.is_request() {
        ErrorType::HttpRequestRequestError
    } else if error.is_body() {
        ErrorType::HttpRequestBodyError
    } else if error.is_decode() {
        ErrorType::HttpRequestDecodeError
    } else {
        ErrorType::HttpRequestOtherError
    }
}

/// Converts a probe's `reqwest::Error` into a [`ProbeError`].
///
/// A redirect-policy error means the auto-following client ran out of hops, which
/// the resolver handles differently from a dead host.
pub fn probe_error_from_reqwest(url: &str, error: &reqwest::Error) -> ProbeError {
    match categorize_reqwest_error(error) {
        ErrorType::HttpRequestRedirectError => ProbeError::RedirectLimit {
            url: url.to_string(),
        },
        kind => ProbeError::Transport {
            kind,
            message: error.to_string(),
        },
    }
}
