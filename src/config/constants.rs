//! Configuration constants.
//!
//! This module defines all configuration constants used throughout the application,
//! including timeouts, hop bounds, and the traffic model parameters.

/// Maximum concurrent live-site probes.
/// Kept low so an audit never looks like a flood to the audited site.
pub const DEFAULT_MAX_CONCURRENCY: usize = 10;

/// Per-request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Default User-Agent string for HTTP requests.
///
/// Users can override this via the `--user-agent` CLI flag.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

// Redirect map resource
/// Path of the declared redirect map, relative to the site root
pub const REDIRECTS_RESOURCE: &str = "redirects.json";

// Redirect handling
/// Maximum number of redirect hops counted for a single mapping entry.
/// The walk stops once this many hops have been taken; the next target is never fetched.
pub const MAX_REDIRECT_HOPS: usize = 5;

/// Status recorded when a probe fails below the HTTP layer (DNS, connect, timeout).
/// Never a real response code from the audited site.
pub const PROBE_FAILED_STATUS: u16 = 418;

/// Error message recorded for duplicate sources, which are never probed
pub const DUPLICATED_SOURCE_MESSAGE: &str = "Duplicated source URL";

// Projected traffic model
/// Share of issues assumed to cost a visit
pub const TRAFFIC_LOSS_RATE: f64 = 0.20;
/// Placeholder value of one lost visit
pub const TRAFFIC_UNIT_VALUE: f64 = 1.0;

// Opportunity and suggestion types
pub const OPPORTUNITY_TYPE: &str = "redirect-chains";
pub const SUGGESTION_TYPE: &str = "REDIRECT_UPDATE";

// Retry strategy (redirect map fetch only)
/// Initial delay in milliseconds before first retry
pub const RETRY_INITIAL_DELAY_MS: u64 = 250;
/// Factor by which retry delay is multiplied on each attempt
pub const RETRY_FACTOR: u64 = 2;
/// Maximum delay between retries in seconds
pub const RETRY_MAX_DELAY_SECS: u64 = 2;
/// Maximum number of retries after the initial attempt
pub const RETRY_MAX_ATTEMPTS: usize = 2;
