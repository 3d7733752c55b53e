//! Filter data structures and types
//!
//! This module defines the value types that describe one catalog query:
//! - `PriceRange`: inclusive price bounds, clamped so that `min <= max`
//! - `SortOrder`: price sort direction
//! - `FilterState`: the complete set of user-editable criteria
//!
//! `FilterState` is immutable by convention. Field-wise updates (`with_*`)
//! return a new value, and equality is structural, which is what the engine
//! uses to detect commits that change nothing.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Default lower bound of the catalog-wide price range
pub const DEFAULT_PRICE_MIN: u64 = 0;

/// Default upper bound of the catalog-wide price range
pub const DEFAULT_PRICE_MAX: u64 = 10_000_000;

/// Inclusive price bounds
///
/// Construction never fails: a minimum above the maximum is clamped down to
/// the maximum, so `PriceRange::new(500, 100)` is `(100, 100)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawPriceRange")]
pub struct PriceRange {
    min: u64,
    max: u64,
}

/// Unchecked wire form of `PriceRange`
#[derive(Deserialize)]
struct RawPriceRange {
    min: u64,
    max: u64,
}

impl From<RawPriceRange> for PriceRange {
    fn from(raw: RawPriceRange) -> Self {
        Self::new(raw.min, raw.max)
    }
}

impl PriceRange {
    /// Create a price range, clamping `min` so it does not exceed `max`
    #[must_use]
    pub const fn new(min: u64, max: u64) -> Self {
        if min > max {
            Self { min: max, max }
        } else {
            Self { min, max }
        }
    }

    /// Lower bound (inclusive)
    #[must_use]
    pub const fn min(&self) -> u64 {
        self.min
    }

    /// Upper bound (inclusive)
    #[must_use]
    pub const fn max(&self) -> u64 {
        self.max
    }

    /// Check whether a price falls within the range
    #[must_use]
    pub const fn contains(&self, price: u64) -> bool {
        price >= self.min && price <= self.max
    }
}

impl Default for PriceRange {
    fn default() -> Self {
        Self::new(DEFAULT_PRICE_MIN, DEFAULT_PRICE_MAX)
    }
}

impl fmt::Display for PriceRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.min, self.max)
    }
}

/// Price sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Cheapest first
    #[default]
    Ascending,
    /// Most expensive first
    Descending,
}

impl SortOrder {
    /// Remote sort key using the sign-prefix convention (`price` / `-price`)
    #[must_use]
    pub const fn sort_key(self) -> &'static str {
        match self {
            Self::Ascending => "price",
            Self::Descending => "-price",
        }
    }

    /// Parse a sign-prefixed sort key back into a sort order
    #[must_use]
    pub fn from_sort_key(key: &str) -> Option<Self> {
        match key {
            "price" => Some(Self::Ascending),
            "-price" => Some(Self::Descending),
            _ => None,
        }
    }

    /// The opposite direction
    #[must_use]
    pub const fn reversed(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ascending => write!(f, "price ascending"),
            Self::Descending => write!(f, "price descending"),
        }
    }
}

/// The user-editable criteria of one catalog query
///
/// Selected tags combine with AND: every selected tag narrows the result set.
/// Tags live in a `BTreeSet` so that order and duplicates never affect
/// equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterState {
    /// Selected category; `None` means all categories
    pub category: Option<String>,

    /// Selected tags (AND semantics)
    pub tags: BTreeSet<String>,

    /// Inclusive price bounds
    pub price_range: PriceRange,

    /// Free text matched against product names server-side
    pub search_term: String,

    /// Price sort direction
    pub sort_order: SortOrder,
}

impl FilterState {
    /// Create an empty filter state spanning the given catalog-wide price bounds
    #[must_use]
    pub const fn new(price_range: PriceRange) -> Self {
        Self {
            category: None,
            tags: BTreeSet::new(),
            price_range,
            search_term: String::new(),
            sort_order: SortOrder::Ascending,
        }
    }

    /// Create a builder seeded with the given catalog-wide price bounds
    #[must_use]
    pub fn builder(price_bounds: PriceRange) -> FilterStateBuilder {
        FilterStateBuilder::new(price_bounds)
    }

    /// Replace the category
    #[must_use]
    pub fn with_category(mut self, category: Option<String>) -> Self {
        self.category = category;
        self
    }

    /// Replace the whole tag set
    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Select the tag if it is not selected, deselect it otherwise
    #[must_use]
    pub fn with_tag_toggled(mut self, tag: &str) -> Self {
        if !self.tags.remove(tag) {
            self.tags.insert(tag.to_string());
        }
        self
    }

    /// Replace the price range
    #[must_use]
    pub const fn with_price_range(mut self, price_range: PriceRange) -> Self {
        self.price_range = price_range;
        self
    }

    /// Replace the search term
    #[must_use]
    pub fn with_search_term(mut self, search_term: impl Into<String>) -> Self {
        self.search_term = search_term.into();
        self
    }

    /// Replace the sort order
    #[must_use]
    pub const fn with_sort_order(mut self, sort_order: SortOrder) -> Self {
        self.sort_order = sort_order;
        self
    }

    /// Bring the state into canonical form
    ///
    /// - Category and search term are trimmed; an empty category becomes `None`
    /// - Tags are trimmed, split on commas, and empty entries are dropped
    /// - The price range is re-clamped so that `min <= max`
    ///
    /// Normalization is idempotent and never rejects input.
    #[must_use]
    pub fn normalized(self) -> Self {
        let category = self
            .category
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());

        let tags = self
            .tags
            .iter()
            .flat_map(|tag| tag.split(','))
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .map(String::from)
            .collect();

        Self {
            category,
            tags,
            price_range: PriceRange::new(self.price_range.min(), self.price_range.max()),
            search_term: self.search_term.trim().to_string(),
            sort_order: self.sort_order,
        }
    }

    /// Number of criteria that differ from an empty state over `price_bounds`
    #[must_use]
    pub fn active_criteria(&self, price_bounds: PriceRange) -> usize {
        let mut count = self.tags.len();
        if self.category.is_some() {
            count += 1;
        }
        if self.price_range != price_bounds {
            count += 1;
        }
        if !self.search_term.is_empty() {
            count += 1;
        }
        if self.sort_order != SortOrder::default() {
            count += 1;
        }
        count
    }
}

impl Default for FilterState {
    fn default() -> Self {
        Self::new(PriceRange::default())
    }
}

impl fmt::Display for FilterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let category = self.category.as_deref().unwrap_or("all");
        write!(f, "category: {category}")?;
        if !self.tags.is_empty() {
            let tags: Vec<&str> = self.tags.iter().map(String::as_str).collect();
            write!(f, ", tags: {}", tags.join(" + "))?;
        }
        write!(f, ", price: {}", self.price_range)?;
        if !self.search_term.is_empty() {
            write!(f, ", name: \"{}\"", self.search_term)?;
        }
        write!(f, ", sort: {}", self.sort_order)
    }
}

/// Builder for `FilterState`
///
/// `build()` always returns a normalized state.
#[derive(Debug, Clone)]
pub struct FilterStateBuilder {
    state: FilterState,
}

impl FilterStateBuilder {
    /// Create a builder with no criteria over the given price bounds
    #[must_use]
    pub const fn new(price_bounds: PriceRange) -> Self {
        Self {
            state: FilterState::new(price_bounds),
        }
    }

    /// Set the category
    #[must_use]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.state.category = Some(category.into());
        self
    }

    /// Add a single tag
    #[must_use]
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.state.tags.insert(tag.into());
        self
    }

    /// Add several tags
    #[must_use]
    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.state.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    /// Set the price bounds (clamped)
    #[must_use]
    pub const fn price_range(mut self, min: u64, max: u64) -> Self {
        self.state.price_range = PriceRange::new(min, max);
        self
    }

    /// Set the search term
    #[must_use]
    pub fn search_term(mut self, term: impl Into<String>) -> Self {
        self.state.search_term = term.into();
        self
    }

    /// Set the sort order
    #[must_use]
    pub const fn sort_order(mut self, sort_order: SortOrder) -> Self {
        self.state.sort_order = sort_order;
        self
    }

    /// Build the normalized filter state
    #[must_use]
    pub fn build(self) -> FilterState {
        self.state.normalized()
    }
}
