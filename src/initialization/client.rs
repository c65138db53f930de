//! HTTP client initialization.
//!
//! This module provides functions to initialize HTTP clients for the two probe
//! modes: auto-following and single-hop.

use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::error_handling::InitializationError;
use reqwest::ClientBuilder;

/// Initializes the auto-following HTTP client.
///
/// Creates a `reqwest::Client` configured with:
/// - User-Agent header from config
/// - Per-request timeout from config
/// - Redirect following enabled (reqwest's default policy, up to 10 hops)
///
/// Used for the redirect map fetch and for the quick probe of each mapping entry.
///
/// # Errors
///
/// Returns `InitializationError::HttpClientError` if client creation fails.
pub fn init_client(config: &Config) -> Result<Arc<reqwest::Client>, InitializationError> {
    let client = ClientBuilder::new()
        .timeout(Duration::from_secs(config.timeout_seconds))
        .user_agent(config.user_agent.clone())
        .build()?;
    Ok(Arc::new(client))
}

/// Initializes the single-hop HTTP client for redirect counting.
///
/// Creates a `reqwest::Client` with redirects disabled so each hop of a chain can
/// be observed, counted and bounded.
///
/// # Errors
///
/// Returns `InitializationError::HttpClientError` if client creation fails.
pub fn init_redirect_client(
    config: &Config,
) -> Result<Arc<reqwest::Client>, InitializationError> {
    let client = ClientBuilder::new()
        .redirect(reqwest::redirect::Policy::none())
        .timeout(Duration::from_secs(config.timeout_seconds))
        .user_agent(config.user_agent.clone())
        .build()?;
    Ok(Arc::new(client))
}
