//! Error handling.
//!
//! This module provides:
//! - Error type definitions (initialization, map fetch, probe, persistence)
//! - Transport error categorization
//! - Retry strategy configuration for the redirect map fetch

mod categorization;
mod types;

// Re-export public API
pub use categorization::{categorize_reqwest_error, get_retry_strategy, probe_error_from_reqwest};
pub use types::{ErrorType, FetchError, InitializationError, PersistenceError, ProbeError};
