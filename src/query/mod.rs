//! Remote query construction
//!
//! Maps a committed `FilterState` and a `PageRequest` onto the parameter
//! shape of the remote search endpoint.

pub mod builder;

pub use builder::{DEFAULT_PAGE_SIZE, PageRequest, QueryBuilder, RemoteQueryParams};
