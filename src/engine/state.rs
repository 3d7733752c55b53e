//! Engine state types
//!
//! Plain data shared between the engine, its driver and the views.

use super::error::CatalogError;
use crate::api::{PageMetadata, Product};
use crate::filters::{FilterState, PriceRange};
use crate::query::{DEFAULT_PAGE_SIZE, RemoteQueryParams};
use std::fmt;
use std::time::Duration;

/// Search debounce window used when none is configured
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Identity of one dispatched query
///
/// Tokens increase monotonically per engine. Only a response carrying the
/// latest token is allowed to change visible state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QueryToken(pub(crate) u64);

impl QueryToken {
    /// Raw sequence number
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for QueryToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle of a catalog view
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EngineStatus {
    /// Not mounted yet; the URL has not been read
    #[default]
    Idle,
    /// A query is in flight
    Loading,
    /// The latest query succeeded
    Ready,
    /// The latest query failed; no results are shown
    Failed(CatalogError),
}

impl EngineStatus {
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    #[must_use]
    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }

    #[must_use]
    pub const fn error(&self) -> Option<&CatalogError> {
        match self {
            Self::Failed(err) => Some(err),
            _ => None,
        }
    }
}

impl fmt::Display for EngineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Loading => write!(f, "loading"),
            Self::Ready => write!(f, "ready"),
            Self::Failed(err) => write!(f, "failed: {err}"),
        }
    }
}

/// A query the engine wants executed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub token: QueryToken,
    pub params: RemoteQueryParams,
}

/// What happened to an arriving response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseOutcome {
    /// It answered the latest query and is now visible
    Applied,
    /// It answered a superseded query and was dropped
    Stale,
    /// It was empty because the page lies past the end; this query for the
    /// last existing page replaces it
    Refetch(FetchRequest),
}

/// Fixed settings of one engine instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineSettings {
    /// Catalog-wide price bounds; also the default price filter
    pub price_bounds: PriceRange,
    /// Items per page
    pub page_size: u32,
    /// Quiet window before a typed search term is committed
    pub debounce: Duration,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            price_bounds: PriceRange::default(),
            page_size: DEFAULT_PAGE_SIZE,
            debounce: DEFAULT_DEBOUNCE,
        }
    }
}

/// Everything a view needs to render the catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogSnapshot {
    pub draft_filters: FilterState,
    pub applied_filters: FilterState,
    pub page: u32,
    /// Items of the last accepted page, in server order
    pub results: Vec<Product>,
    pub metadata: Option<PageMetadata>,
    pub status: EngineStatus,
    /// A typed search term is waiting for its debounce window
    pub search_pending: bool,
}
