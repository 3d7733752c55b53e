//! Async driver connecting the engine to a `CatalogApi`
//!
//! The engine decides *what* to fetch; the driver executes those fetches on
//! the tokio runtime, delivers completions back in arrival order, fires the
//! search debounce timer and forwards external URL changes. Superseded
//! requests are left to finish; their responses are discarded by token.

use super::error::CatalogError;
use super::session::CatalogQueryEngine;
use super::state::{EngineSettings, FetchRequest, QueryToken, ResponseOutcome};
use crate::api::{CatalogApi, PageResult, Vocabulary};
use crate::filters::FilterState;
use crate::location::UrlStore;
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::time::{Instant, sleep_until};
use tracing::{debug, warn};

/// Something the driver processed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverEvent {
    /// A product query finished
    Response {
        token: QueryToken,
        outcome: ResponseOutcome,
    },
    /// A query came back empty for a page past the end; `refetch` asks for the last page
    PageReset {
        token: QueryToken,
        refetch: QueryToken,
    },
    /// The debounce window elapsed; carries the dispatched query, if the term changed
    SearchCommitted(Option<QueryToken>),
    /// The URL changed from outside; carries the dispatched query, if the state changed
    Navigated(Option<QueryToken>),
}

struct Completion {
    token: QueryToken,
    result: Result<PageResult, CatalogError>,
}

/// Runs a `CatalogQueryEngine` against a catalog backend
pub struct CatalogDriver<A, S> {
    api: Arc<A>,
    engine: CatalogQueryEngine<S>,
    completions_tx: UnboundedSender<Completion>,
    completions_rx: UnboundedReceiver<Completion>,
    navigation_rx: UnboundedReceiver<String>,
    in_flight: usize,
}

impl<A, S> CatalogDriver<A, S>
where
    A: CatalogApi + 'static,
    S: UrlStore,
{
    /// Create a driver and subscribe to external changes of `store`
    pub fn new(api: Arc<A>, mut store: S, settings: EngineSettings) -> Self {
        let (navigation_tx, navigation_rx) = mpsc::unbounded_channel();
        store.on_external_change(Box::new(move |query| {
            // The receiver only goes away together with the driver
            let _ = navigation_tx.send(query.to_string());
        }));

        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        Self {
            api,
            engine: CatalogQueryEngine::new(store, settings),
            completions_tx,
            completions_rx,
            navigation_rx,
            in_flight: 0,
        }
    }

    /// Load the vocabulary, then run the first query for the current URL
    ///
    /// # Errors
    ///
    /// If the vocabulary cannot be loaded the engine enters `Failed` and no
    /// product query is sent. The error is also returned.
    pub async fn mount(&mut self) -> Result<QueryToken, CatalogError> {
        let (categories, tags) = tokio::join!(self.api.categories(), self.api.tags());
        let request = self.engine.mount();

        match categories.and_then(|categories| tags.map(|tags| Vocabulary { categories, tags })) {
            Ok(vocabulary) => {
                debug!(
                    categories = vocabulary.categories.len(),
                    tags = vocabulary.tags.len(),
                    "vocabulary loaded"
                );
                self.engine.set_vocabulary(vocabulary);
                Ok(self.spawn(request))
            }
            Err(err) => {
                let err = CatalogError::from(err);
                warn!(error = %err, "could not load catalog vocabulary");
                self.engine.fail(err.clone());
                Err(err)
            }
        }
    }

    /// Commit `draft`; see `CatalogQueryEngine::apply_filters`
    pub fn apply_filters(&mut self, draft: FilterState) -> Option<QueryToken> {
        let request = self.engine.apply_filters(draft);
        self.submit(request)
    }

    /// Commit the engine's current draft
    pub fn apply_draft(&mut self) -> Option<QueryToken> {
        let request = self.engine.apply_draft();
        self.submit(request)
    }

    pub fn change_page(&mut self, page: u32) -> Option<QueryToken> {
        let request = self.engine.change_page(page);
        self.submit(request)
    }

    pub fn next_page(&mut self) -> Option<QueryToken> {
        let request = self.engine.next_page();
        self.submit(request)
    }

    pub fn prev_page(&mut self) -> Option<QueryToken> {
        let request = self.engine.prev_page();
        self.submit(request)
    }

    /// Record a search keystroke at the current instant
    pub fn update_search_term(&mut self, term: impl Into<String>) {
        self.engine.update_search_term(term, Instant::now());
    }

    /// Execute a request obtained from `engine_mut()`
    pub fn submit(&mut self, request: Option<FetchRequest>) -> Option<QueryToken> {
        request.map(|request| self.spawn(request))
    }

    fn spawn(&mut self, request: FetchRequest) -> QueryToken {
        let FetchRequest { token, params } = request;
        let api = Arc::clone(&self.api);
        let completions = self.completions_tx.clone();
        self.in_flight += 1;

        tokio::spawn(async move {
            let result = api
                .list_products(&params)
                .await
                .map(|response| PageResult::from_response(response, params.page, params.page_size))
                .map_err(CatalogError::from);
            // The receiver only goes away together with the driver
            let _ = completions.send(Completion { token, result });
        });

        token
    }

    /// Apply external URL changes that have already been reported
    pub fn pump_navigation(&mut self) -> Vec<DriverEvent> {
        let mut events = Vec::new();
        while let Ok(query) = self.navigation_rx.try_recv() {
            events.push(self.navigated(&query));
        }
        events
    }

    fn navigated(&mut self, query: &str) -> DriverEvent {
        let request = self.engine.on_external_url_change(query);
        DriverEvent::Navigated(self.submit(request))
    }

    /// Wait for the next completion, debounce deadline or navigation
    ///
    /// Returns `None` only when nothing can ever happen again.
    pub async fn next_event(&mut self) -> Option<DriverEvent> {
        let deadline = self.engine.search_deadline();

        tokio::select! {
            Some(done) = self.completions_rx.recv() => {
                self.in_flight = self.in_flight.saturating_sub(1);
                let token = done.token;
                match self.engine.on_response(token, done.result) {
                    ResponseOutcome::Refetch(request) => {
                        let refetch = self.spawn(request);
                        Some(DriverEvent::PageReset { token, refetch })
                    }
                    outcome => Some(DriverEvent::Response { token, outcome }),
                }
            }
            Some(query) = self.navigation_rx.recv() => Some(self.navigated(&query)),
            () = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                let request = self.engine.poll_search(Instant::now());
                Some(DriverEvent::SearchCommitted(self.submit(request)))
            }
            else => None,
        }
    }

    /// Whether a query is in flight or a search term is waiting
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.in_flight > 0 || self.engine.search_deadline().is_some()
    }

    /// Process events until no query is in flight and no search is pending
    pub async fn settle(&mut self) -> Vec<DriverEvent> {
        let mut events = self.pump_navigation();
        while self.is_busy() {
            match self.next_event().await {
                Some(event) => events.push(event),
                None => break,
            }
        }
        events
    }

    #[must_use]
    pub const fn engine(&self) -> &CatalogQueryEngine<S> {
        &self.engine
    }

    /// Mutable engine access for draft edits
    ///
    /// Requests returned by engine operations must be passed to `submit`.
    pub const fn engine_mut(&mut self) -> &mut CatalogQueryEngine<S> {
        &mut self.engine
    }

    #[must_use]
    pub fn api(&self) -> &A {
        &self.api
    }
}
