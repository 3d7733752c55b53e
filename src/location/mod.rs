//! Page location handling
//!
//! - `codec`: encodes applied filters and the page number into a shareable
//!   query string and decodes them back, degrading malformed input to defaults
//! - `store`: the `UrlStore` collaborator the engine reads, writes and listens
//!   to, plus an in-memory history implementation

pub mod codec;
pub mod store;

pub use codec::{FIRST_PAGE, UrlCodec};
pub use store::{MemoryUrlStore, UrlListener, UrlStore};
