//! Remote API error types
//!
//! # Error Types
//!
//! - **`Network`**: the request could not be completed (connection, timeout, TLS)
//! - **`Status`**: the server answered with a non-success status
//! - **`Decode`**: the body was not the JSON shape we expect
//! - **`InvalidUrl`**: the configured base URL or an endpoint could not be parsed

use thiserror::Error;

/// Errors from talking to the remote catalog
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport-level failure
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// Non-2xx response
    #[error("Server returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Malformed response body
    #[error("Malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Unusable API URL
    #[error("Invalid API URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}
