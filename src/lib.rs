//! Catalogr - A catalog query, filter and pagination engine
//!
//! This library keeps a set of user-editable filters in sync with a
//! shareable query string, debounces free-text search, translates committed
//! filters into paginated remote queries, and makes sure only the answer to
//! the latest query is ever shown.

use thiserror::Error;

pub mod api;
pub mod cli;
pub mod config;
pub mod debounce;
pub mod engine;
pub mod filters;
pub mod location;
pub mod query;
pub mod view;

#[cfg(test)]
pub mod testing;

/// Error enum, contains all failure states of the program
#[derive(Debug, Error)]
pub enum CatalogrError {
    /// Catalog API error
    #[error("API error: {0}")]
    ApiError(#[from] api::ApiError),
    /// Catalog query failure as shown to users
    #[error("{0}")]
    CatalogError(#[from] engine::CatalogError),
    /// Represents a configuration error
    #[error("Configuration error: {0}")]
    ConfigError(#[from] ::config::ConfigError),
    /// Represents an I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    /// Invalid input error
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
