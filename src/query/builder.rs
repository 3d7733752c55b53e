//! Translation of committed filters into remote search parameters
//!
//! This is pure business logic: no I/O, no clock, no state. The output is
//! the exact parameter set sent to `GET /products`.

use crate::filters::{FilterState, PriceRange};
use crate::location::FIRST_PAGE;
use crate::location::codec::TAG_SEPARATOR;
use serde::Serialize;
use url::form_urlencoded;

/// Page size used when none is configured
pub const DEFAULT_PAGE_SIZE: u32 = 12;

/// Which page of results to request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageRequest {
    page_number: u32,
    page_size: u32,
}

impl PageRequest {
    /// Create a page request; page 0 and page size 0 are raised to 1
    #[must_use]
    pub fn new(page_number: u32, page_size: u32) -> Self {
        Self {
            page_number: page_number.max(FIRST_PAGE),
            page_size: page_size.max(1),
        }
    }

    /// 1-based page number
    #[must_use]
    pub const fn page_number(&self) -> u32 {
        self.page_number
    }

    /// Number of items per page
    #[must_use]
    pub const fn page_size(&self) -> u32 {
        self.page_size
    }
}

/// Parameters of one `GET /products` call
///
/// Optional fields are left out of the request entirely. `page`,
/// `page_size` and `sort` are always sent because the backend's defaults
/// (20 items, sorted by name) differ from the engine's.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemoteQueryParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Comma-joined tag list; the backend reads `tags` as CSV
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_from: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_to: Option<u64>,

    pub page: u32,

    pub page_size: u32,

    /// `price` or `-price`
    pub sort: String,
}

impl RemoteQueryParams {
    /// Key/value pairs in a fixed order, suitable for `reqwest::RequestBuilder::query`
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(8);
        if let Some(category) = &self.category {
            pairs.push(("category", category.clone()));
        }
        if let Some(tags) = &self.tags {
            pairs.push(("tags", tags.clone()));
        }
        if let Some(name) = &self.name {
            pairs.push(("name", name.clone()));
        }
        if let Some(price_from) = self.price_from {
            pairs.push(("price_from", price_from.to_string()));
        }
        if let Some(price_to) = self.price_to {
            pairs.push(("price_to", price_to.to_string()));
        }
        pairs.push(("page", self.page.to_string()));
        pairs.push(("page_size", self.page_size.to_string()));
        pairs.push(("sort", self.sort.clone()));
        pairs
    }

    /// URL-encoded form of `to_pairs`, used for logging and request matching
    #[must_use]
    pub fn to_query_string(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.to_pairs())
            .finish()
    }
}

/// Builds `RemoteQueryParams` from committed filters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryBuilder {
    price_bounds: PriceRange,
}

impl QueryBuilder {
    /// Create a builder for a catalog spanning `price_bounds`
    #[must_use]
    pub const fn new(price_bounds: PriceRange) -> Self {
        Self { price_bounds }
    }

    /// Derive the remote parameters for `filters` at `page`
    ///
    /// Defaults are omitted with the same rules the URL codec uses.
    #[must_use]
    pub fn build(&self, filters: &FilterState, page: PageRequest) -> RemoteQueryParams {
        let tags = (!filters.tags.is_empty()).then(|| {
            filters
                .tags
                .iter()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(TAG_SEPARATOR)
        });

        RemoteQueryParams {
            category: filters.category.clone().filter(|c| !c.is_empty()),
            tags,
            name: (!filters.search_term.is_empty()).then(|| filters.search_term.clone()),
            price_from: (filters.price_range.min() != self.price_bounds.min())
                .then(|| filters.price_range.min()),
            price_to: (filters.price_range.max() != self.price_bounds.max())
                .then(|| filters.price_range.max()),
            page: page.page_number(),
            page_size: page.page_size(),
            sort: filters.sort_order.sort_key().to_string(),
        }
    }
}

impl Default for QueryBuilder {
    fn default() -> Self {
        Self::new(PriceRange::default())
    }
}
