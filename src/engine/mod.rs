//! Catalog query engine
//!
//! This module owns the lifecycle of a catalog view: draft vs. applied
//! filters, the current page, the URL as shareable state, and the rule that
//! only the latest dispatched query may change what is shown.
//!
//! # Architecture
//!
//! - `session`: `CatalogQueryEngine`, a synchronous state machine that
//!   returns `FetchRequest`s instead of performing I/O
//! - `driver`: `CatalogDriver`, which runs those requests on tokio against a
//!   `CatalogApi` and feeds completions, debounce deadlines and navigation
//!   back into the engine
//! - `state`: status, tokens, settings and snapshots
//! - `error`: the failures a view can display
//!
//! # Examples
//!
//! ```
//! use catalogr::engine::{CatalogQueryEngine, EngineSettings, EngineStatus};
//! use catalogr::location::MemoryUrlStore;
//!
//! let store = MemoryUrlStore::new("category=Nature&page=2");
//! let mut engine = CatalogQueryEngine::new(store, EngineSettings::default());
//!
//! let request = engine.mount();
//! assert_eq!(request.params.category.as_deref(), Some("Nature"));
//! assert_eq!(request.params.page, 2);
//! assert_eq!(engine.status(), &EngineStatus::Loading);
//! ```

pub mod driver;
pub mod error;
pub mod session;
pub mod state;

pub use driver::{CatalogDriver, DriverEvent};
pub use error::CatalogError;
pub use session::CatalogQueryEngine;
pub use state::{
    CatalogSnapshot, DEFAULT_DEBOUNCE, EngineSettings, EngineStatus, FetchRequest, QueryToken,
    ResponseOutcome,
};
