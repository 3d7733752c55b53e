//! Filter state module
//!
//! This module provides the value types that describe what the catalog is
//! currently showing: category, tag set, price range, search term and sort
//! order.
//!
//! # Examples
//!
//! ```
//! use catalogr::filters::{FilterState, PriceRange, SortOrder};
//!
//! let state = FilterState::builder(PriceRange::new(0, 200))
//!     .category("Nature")
//!     .tag("neon")
//!     .price_range(500, 100)
//!     .sort_order(SortOrder::Descending)
//!     .build();
//!
//! // Inverted bounds are clamped, never rejected
//! assert_eq!(state.price_range, PriceRange::new(100, 100));
//! ```

pub mod types;

pub use types::{
    DEFAULT_PRICE_MAX, DEFAULT_PRICE_MIN, FilterState, FilterStateBuilder, PriceRange, SortOrder,
};
