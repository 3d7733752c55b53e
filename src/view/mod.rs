//! Terminal rendering of catalog results
//!
//! Pure functions of the engine's snapshot. Nothing here talks to the
//! engine or the network.

pub mod pager;
pub mod results;

pub use pager::Pager;
pub use results::{EMPTY_MESSAGE, ResultsView, format_price};
