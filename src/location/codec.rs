//! Query-string encoding of the applied filter state
//!
//! The URL is the only place a catalog view persists its state, so the
//! encoding is kept short (defaults are omitted) and decoding is permissive:
//! a hand-edited or truncated URL degrades to defaults instead of failing.
//!
//! | Parameter    | Field                  | Omitted when             |
//! |--------------|------------------------|--------------------------|
//! | `category`   | `category`             | all categories           |
//! | `tags`       | `tags` (comma-joined)  | no tags                  |
//! | `name`       | `search_term`          | empty                    |
//! | `price_from` | `price_range.min`      | catalog-wide minimum     |
//! | `price_to`   | `price_range.max`      | catalog-wide maximum     |
//! | `sort`       | `sort_order`           | ascending                |
//! | `page`       | page number            | page 1                   |

use crate::filters::{FilterState, PriceRange, SortOrder};
use url::form_urlencoded;

pub const PARAM_CATEGORY: &str = "category";
pub const PARAM_TAGS: &str = "tags";
pub const PARAM_NAME: &str = "name";
pub const PARAM_PRICE_FROM: &str = "price_from";
pub const PARAM_PRICE_TO: &str = "price_to";
pub const PARAM_SORT: &str = "sort";
pub const PARAM_PAGE: &str = "page";

/// Separator used when a tag set is flattened into one parameter
pub const TAG_SEPARATOR: &str = ",";

/// First page number; pages are 1-based
pub const FIRST_PAGE: u32 = 1;

/// Bidirectional mapping between `(FilterState, page)` and a query string
///
/// The codec needs the catalog-wide price bounds to know which price values
/// are defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UrlCodec {
    price_bounds: PriceRange,
}

impl UrlCodec {
    /// Create a codec for a catalog spanning `price_bounds`
    #[must_use]
    pub const fn new(price_bounds: PriceRange) -> Self {
        Self { price_bounds }
    }

    /// Catalog-wide price bounds used as defaults
    #[must_use]
    pub const fn price_bounds(&self) -> PriceRange {
        self.price_bounds
    }

    /// The filter state an empty query string decodes to
    #[must_use]
    pub const fn default_filters(&self) -> FilterState {
        FilterState::new(self.price_bounds)
    }

    /// Encode filters and page into a query string (without the leading `?`)
    ///
    /// Parameters are emitted in a fixed order so equal states always encode
    /// to identical strings.
    #[must_use]
    pub fn encode(&self, filters: &FilterState, page: u32) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());

        if let Some(category) = filters.category.as_deref().filter(|c| !c.is_empty()) {
            serializer.append_pair(PARAM_CATEGORY, category);
        }

        if !filters.tags.is_empty() {
            let joined = filters
                .tags
                .iter()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(TAG_SEPARATOR);
            serializer.append_pair(PARAM_TAGS, &joined);
        }

        if !filters.search_term.is_empty() {
            serializer.append_pair(PARAM_NAME, &filters.search_term);
        }

        if filters.price_range.min() != self.price_bounds.min() {
            serializer.append_pair(PARAM_PRICE_FROM, &filters.price_range.min().to_string());
        }

        if filters.price_range.max() != self.price_bounds.max() {
            serializer.append_pair(PARAM_PRICE_TO, &filters.price_range.max().to_string());
        }

        if filters.sort_order != SortOrder::default() {
            serializer.append_pair(PARAM_SORT, filters.sort_order.sort_key());
        }

        if page > FIRST_PAGE {
            serializer.append_pair(PARAM_PAGE, &page.to_string());
        }

        serializer.finish()
    }

    /// Decode a query string into normalized filters and a page number
    ///
    /// Accepts a bare query string, one with a leading `?`, or a full URL.
    /// Never fails: unknown parameters are ignored and malformed values
    /// (non-numeric page or price, page 0, unknown sort key) fall back to
    /// defaults. Repeated `tags` parameters are merged; for every other
    /// parameter the last occurrence wins.
    #[must_use]
    pub fn decode(&self, query: &str) -> (FilterState, u32) {
        let mut filters = self.default_filters();
        let mut price_from = None;
        let mut price_to = None;
        let mut page = FIRST_PAGE;

        for (key, value) in form_urlencoded::parse(strip_to_query(query).as_bytes()) {
            match key.as_ref() {
                PARAM_CATEGORY => {
                    filters.category = Some(value.into_owned());
                }
                PARAM_TAGS => {
                    filters.tags.extend(
                        value
                            .split(TAG_SEPARATOR)
                            .map(str::trim)
                            .filter(|t| !t.is_empty())
                            .map(String::from),
                    );
                }
                PARAM_NAME => {
                    filters.search_term = value.into_owned();
                }
                PARAM_PRICE_FROM => {
                    price_from = value.trim().parse::<u64>().ok();
                }
                PARAM_PRICE_TO => {
                    price_to = value.trim().parse::<u64>().ok();
                }
                PARAM_SORT => {
                    filters.sort_order =
                        SortOrder::from_sort_key(value.trim()).unwrap_or_default();
                }
                PARAM_PAGE => {
                    page = value
                        .trim()
                        .parse::<u32>()
                        .ok()
                        .filter(|p| *p >= FIRST_PAGE)
                        .unwrap_or(FIRST_PAGE);
                }
                _ => {}
            }
        }

        filters.price_range = PriceRange::new(
            price_from.unwrap_or(self.price_bounds.min()),
            price_to.unwrap_or(self.price_bounds.max()),
        );

        (filters.normalized(), page)
    }
}

impl Default for UrlCodec {
    fn default() -> Self {
        Self::new(PriceRange::default())
    }
}

/// Reduce a URL or query string to the part between `?` and `#`
fn strip_to_query(input: &str) -> &str {
    let without_fragment = input.split('#').next().unwrap_or_default();
    match without_fragment.split_once('?') {
        Some((_, query)) => query,
        None => without_fragment,
    }
}
