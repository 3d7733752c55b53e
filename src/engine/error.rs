//! Engine-visible error taxonomy
//!
//! These are the errors a catalog view can end up showing. They are cheap to
//! clone and compare because they are stored in the engine's snapshot.
//! Stale responses are not errors and never appear here.

use crate::api::ApiError;
use thiserror::Error;

/// Why the engine entered the `Failed` state
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// The fetch failed, timed out or the server refused it
    #[error("Could not reach the catalog: {0}")]
    Network(String),

    /// The server answered with something we could not read
    #[error("The catalog sent an unreadable response: {0}")]
    Decode(String),

    /// A setting was impossible; filter input is clamped and never ends up here
    #[error("Invalid setting: {0}")]
    Validation(String),
}

impl CatalogError {
    /// Short message suitable for showing in place of the result list
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::Network(_) => "The catalog is unreachable right now. Try again.",
            Self::Decode(_) => "The catalog returned data we could not read.",
            Self::Validation(_) => "The catalog is misconfigured.",
        }
    }
}

impl From<ApiError> for CatalogError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Decode(e) => Self::Decode(e.to_string()),
            other @ (ApiError::Network(_) | ApiError::Status { .. } | ApiError::InvalidUrl(_)) => {
                Self::Network(other.to_string())
            }
        }
    }
}
