//! Error type definitions.
//!
//! This module defines the error types used throughout the application, plus the
//! `ErrorType` categories transport failures are sorted into.

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),
}

/// Failure to retrieve the declared redirect map.
///
/// The loader never surfaces these to its caller; they are logged and the map is
/// treated as empty.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The map resource answered with a non-success status other than 404.
    #[error("HTTP status {status} for {url}")]
    Status { status: u16, url: String },

    /// The request never produced a response.
    #[error("{kind} for {url}: {message}")]
    Transport {
        kind: ErrorType,
        url: String,
        message: String,
    },

    /// The body was not a redirect map document.
    #[error("Malformed redirect map at {url}: {message}")]
    Decode { url: String, message: String },
}

impl FetchError {
    /// Whether retrying the same request could succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            FetchError::Transport {
                kind: ErrorType::HttpRequestTimeoutError
                    | ErrorType::HttpRequestConnectError
                    | ErrorType::HttpRequestRequestError,
                ..
            }
        )
    }
}

/// Failure of a single live-site probe.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProbeError {
    /// DNS, connection, timeout and other failures below HTTP.
    #[error("{kind}: {message}")]
    Transport { kind: ErrorType, message: String },

    /// The auto-following client gave up on its own redirect limit.
    #[error("Redirect limit exceeded for {url}")]
    RedirectLimit { url: String },

    /// A redirect pointed at something that does not resolve to a URL.
    #[error("Invalid redirect location '{location}' from {url}")]
    InvalidLocation { url: String, location: String },
}

/// Failure of the external opportunity/suggestion persistence layer.
///
/// These always propagate: losing an audit's findings silently is not acceptable.
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("Failed to create opportunity: {0}")]
    Opportunity(String),

    #[error("Failed to sync suggestions for opportunity {id}: {message}")]
    Suggestions { id: String, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Categories of transport failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum ErrorType {
    HttpRequestBuilderError,
    HttpRequestRedirectError,
    HttpRequestTimeoutError,
    HttpRequestRequestError,
    HttpRequestConnectError,
    HttpRequestBodyError,
    HttpRequestDecodeError,
    HttpRequestOtherError,
}

impl std::fmt::Display for ErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::HttpRequestBuilderError => "HTTP request builder error",
            ErrorType::HttpRequestRedirectError => "HTTP request redirect error",
            ErrorType::HttpRequestTimeoutError => "HTTP request timeout error",
            ErrorType::HttpRequestRequestError => "HTTP request error",
            ErrorType::HttpRequestConnectError => "HTTP request connect error",
            ErrorType::HttpRequestBodyError => "HTTP request body error",
            ErrorType::HttpRequestDecodeError => "HTTP request decode error",
            ErrorType::HttpRequestOtherError => "HTTP request other error",
        }
    }
}
