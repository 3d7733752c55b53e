//! Catalog query session state machine
//!
//! `CatalogQueryEngine` owns the draft and applied filters, the page number
//! and the identity of the latest dispatched query. It performs no I/O of
//! its own: every operation that needs a fetch returns a `FetchRequest`,
//! and the caller later reports the outcome through `on_response`.
//!
//! # Workflow
//!
//! ```text
//! Idle ──mount()──→ Loading ──on_response(latest)──→ Ready | Failed
//!                     ↑                                   │
//!                     └── apply_filters / change_page / ──┘
//!                         debounced search / URL change
//! ```
//!
//! Draft edits never fetch and never touch the URL. Structured filters are
//! committed explicitly with `apply_filters`; the search term commits itself
//! once its debounce window elapses (`poll_search`).

use super::error::CatalogError;
use super::state::{
    CatalogSnapshot, EngineSettings, EngineStatus, FetchRequest, QueryToken, ResponseOutcome,
};
use crate::api::{PageMetadata, PageResult, Product, Vocabulary};
use crate::debounce::Debouncer;
use crate::filters::{FilterState, PriceRange, SortOrder};
use crate::location::{FIRST_PAGE, UrlCodec, UrlStore};
use crate::query::{PageRequest, QueryBuilder};
use tokio::time::Instant;
use tracing::{debug, trace, warn};

/// The catalog query engine for one catalog view
pub struct CatalogQueryEngine<S> {
    store: S,
    settings: EngineSettings,
    codec: UrlCodec,
    builder: QueryBuilder,
    draft: FilterState,
    applied: FilterState,
    page: u32,
    status: EngineStatus,
    results: Vec<Product>,
    metadata: Option<PageMetadata>,
    search: Debouncer<String>,
    last_token: u64,
    latest: Option<QueryToken>,
    vocabulary: Vocabulary,
}

impl<S: UrlStore> CatalogQueryEngine<S> {
    /// Create an unmounted engine reading and writing the URL through `store`
    #[must_use]
    pub fn new(store: S, settings: EngineSettings) -> Self {
        let codec = UrlCodec::new(settings.price_bounds);
        Self {
            store,
            settings,
            codec,
            builder: QueryBuilder::new(settings.price_bounds),
            draft: codec.default_filters(),
            applied: codec.default_filters(),
            page: FIRST_PAGE,
            status: EngineStatus::Idle,
            results: Vec::new(),
            metadata: None,
            search: Debouncer::new(settings.debounce),
            last_token: 0,
            latest: None,
            vocabulary: Vocabulary::default(),
        }
    }

    /// Seed draft and applied state from the current URL and dispatch the first query
    pub fn mount(&mut self) -> FetchRequest {
        let query = self.store.read();
        let (filters, page) = self.codec.decode(&query);
        debug!(%query, "mounting catalog view");

        self.search.cancel();
        self.draft = filters.clone();
        self.applied = filters;
        self.page = page;
        self.metadata = None;
        self.dispatch()
    }

    // Draft edits

    /// Replace the whole draft
    pub fn set_draft(&mut self, draft: FilterState) {
        trace!(%draft, "draft replaced");
        self.draft = draft;
    }

    /// Select a category in the draft (`None` for all)
    pub fn set_draft_category(&mut self, category: Option<String>) {
        self.set_draft(self.draft.clone().with_category(category));
    }

    /// Toggle a tag in the draft
    pub fn toggle_draft_tag(&mut self, tag: &str) {
        self.set_draft(self.draft.clone().with_tag_toggled(tag));
    }

    /// Set the draft price range
    pub fn set_draft_price_range(&mut self, price_range: PriceRange) {
        self.set_draft(self.draft.clone().with_price_range(price_range));
    }

    /// Set the draft sort order
    pub fn set_draft_sort(&mut self, sort_order: SortOrder) {
        self.set_draft(self.draft.clone().with_sort_order(sort_order));
    }

    /// Discard draft edits
    pub fn reset_draft(&mut self) {
        self.set_draft(self.applied.clone());
    }

    /// Record a search keystroke
    ///
    /// Updates the draft immediately and (re)starts the debounce window. The
    /// term is committed by `poll_search` once the window elapses.
    pub fn update_search_term(&mut self, term: impl Into<String>, now: Instant) {
        let term = term.into();
        trace!(%term, "search term typed");
        self.draft.search_term.clone_from(&term);
        self.search.push(term, now);
    }

    /// When the pending search term becomes due, if one is pending
    #[must_use]
    pub fn search_deadline(&self) -> Option<Instant> {
        self.search.deadline()
    }

    /// Commit the pending search term if its debounce window has elapsed
    ///
    /// Only the search term is promoted; other uncommitted draft edits stay
    /// in the draft.
    pub fn poll_search(&mut self, now: Instant) -> Option<FetchRequest> {
        let term = self.search.poll(now)?;
        let filters = self.applied.clone().with_search_term(term).normalized();
        self.commit(filters)
    }

    // Commits

    /// Commit `draft` as the applied filters
    ///
    /// The draft is normalized first (inverted price bounds are clamped). If
    /// the result equals the applied filters nothing happens: no fetch, no
    /// URL write. Otherwise the page resets to 1, the URL is written and a
    /// query is dispatched. Any pending search keystrokes are dropped since
    /// the draft already carries the latest term.
    pub fn apply_filters(&mut self, draft: FilterState) -> Option<FetchRequest> {
        let draft = draft.normalized();
        self.search.cancel();
        self.draft = draft.clone();
        self.commit(draft)
    }

    /// Commit the current draft
    pub fn apply_draft(&mut self) -> Option<FetchRequest> {
        self.apply_filters(self.draft.clone())
    }

    fn commit(&mut self, filters: FilterState) -> Option<FetchRequest> {
        if filters == self.applied {
            debug!("commit leaves filters unchanged, skipping fetch");
            return None;
        }

        debug!(%filters, "committing filters");
        self.applied = filters;
        self.page = FIRST_PAGE;
        self.metadata = None;
        self.write_url();
        Some(self.dispatch())
    }

    /// Move to page `page`, clamped into the known page range
    ///
    /// Requesting the current page does nothing, except after a failure,
    /// where it retries. Until the applied filters have produced metadata
    /// the range is unknown and any other page means the first one.
    pub fn change_page(&mut self, page: u32) -> Option<FetchRequest> {
        let target = self.clamp_page(page);
        let retry = matches!(self.status, EngineStatus::Failed(_));
        if target == self.page && !retry {
            return None;
        }

        debug!(from = self.page, to = target, "changing page");
        self.page = target;
        self.write_url();
        Some(self.dispatch())
    }

    /// Move to the next page, if there is one
    pub fn next_page(&mut self) -> Option<FetchRequest> {
        self.change_page(self.page.saturating_add(1))
    }

    /// Move to the previous page, if there is one
    pub fn prev_page(&mut self) -> Option<FetchRequest> {
        self.change_page(self.page.saturating_sub(1))
    }

    fn clamp_page(&self, page: u32) -> u32 {
        match &self.metadata {
            Some(meta) => page.max(meta.first_page).min(meta.last_page.max(meta.first_page)),
            None if page == self.page => page,
            None => FIRST_PAGE,
        }
    }

    /// React to navigation the engine did not cause (back button, pasted link)
    ///
    /// The URL is decoded and, if it describes a different state, replaces
    /// both draft and applied filters and the page. The URL is not rewritten
    /// since it is already the source of truth.
    pub fn on_external_url_change(&mut self, query: &str) -> Option<FetchRequest> {
        let (filters, page) = self.codec.decode(query);
        if filters == self.applied && page == self.page {
            trace!(%query, "external URL matches applied state");
            return None;
        }

        debug!(%query, "external navigation");
        self.search.cancel();
        if filters != self.applied {
            self.metadata = None;
        }
        self.draft = filters.clone();
        self.applied = filters;
        self.page = page;
        Some(self.dispatch())
    }

    // Responses

    /// Deliver the outcome of the query identified by `token`
    ///
    /// Responses to anything but the latest dispatched query are dropped
    /// without touching state. A failure clears the results so the view never
    /// shows a list that does not match the current filters.
    ///
    /// An empty answer for a page past the last one (a stale bookmark, or a
    /// result set that shrank) moves the engine to the last existing page and
    /// returns the replacement query as `ResponseOutcome::Refetch`.
    pub fn on_response(
        &mut self,
        token: QueryToken,
        result: Result<PageResult, CatalogError>,
    ) -> ResponseOutcome {
        if self.latest != Some(token) {
            debug!(%token, latest = ?self.latest, "discarding stale response");
            return ResponseOutcome::Stale;
        }

        match result {
            Ok(page) => {
                let last_page = page.metadata.last_page.max(FIRST_PAGE);
                if page.items.is_empty() && self.page > last_page {
                    debug!(
                        %token,
                        requested = self.page,
                        last_page,
                        "page past the end, refetching"
                    );
                    self.page = last_page;
                    self.write_url();
                    return ResponseOutcome::Refetch(self.dispatch());
                }

                debug!(
                    %token,
                    items = page.items.len(),
                    total = page.metadata.total_records,
                    "results received"
                );
                self.results = page.items;
                self.metadata = Some(page.metadata);
                self.status = EngineStatus::Ready;
            }
            Err(err) => {
                warn!(%token, error = %err, "catalog query failed");
                self.fail(err);
            }
        }

        ResponseOutcome::Applied
    }

    /// Enter `Failed` outside of a query, e.g. when the vocabulary cannot be loaded
    ///
    /// Any in-flight query becomes stale.
    pub fn fail(&mut self, err: CatalogError) {
        self.results.clear();
        self.metadata = None;
        self.latest = None;
        self.status = EngineStatus::Failed(err);
    }

    fn dispatch(&mut self) -> FetchRequest {
        self.last_token += 1;
        let token = QueryToken(self.last_token);
        self.latest = Some(token);
        self.status = EngineStatus::Loading;

        let params = self
            .builder
            .build(&self.applied, PageRequest::new(self.page, self.settings.page_size));
        debug!(%token, query = %params.to_query_string(), "dispatching catalog query");
        FetchRequest { token, params }
    }

    fn write_url(&mut self) {
        let query = self.codec.encode(&self.applied, self.page);
        debug!(%query, "writing URL");
        self.store.write(&query);
    }

    // Accessors

    /// Store the selectable categories and tags
    pub fn set_vocabulary(&mut self, vocabulary: Vocabulary) {
        self.vocabulary = vocabulary;
    }

    #[must_use]
    pub const fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    #[must_use]
    pub const fn draft(&self) -> &FilterState {
        &self.draft
    }

    #[must_use]
    pub const fn applied(&self) -> &FilterState {
        &self.applied
    }

    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    #[must_use]
    pub const fn status(&self) -> &EngineStatus {
        &self.status
    }

    #[must_use]
    pub fn results(&self) -> &[Product] {
        &self.results
    }

    #[must_use]
    pub const fn metadata(&self) -> Option<&PageMetadata> {
        self.metadata.as_ref()
    }

    /// Token of the query whose response is currently awaited
    #[must_use]
    pub const fn latest_token(&self) -> Option<QueryToken> {
        self.latest
    }

    #[must_use]
    pub const fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    #[must_use]
    pub const fn url_store(&self) -> &S {
        &self.store
    }

    /// Query string describing the applied state, for sharing
    #[must_use]
    pub fn shareable_query(&self) -> String {
        self.codec.encode(&self.applied, self.page)
    }

    /// Owned copy of everything a view renders
    #[must_use]
    pub fn snapshot(&self) -> CatalogSnapshot {
        CatalogSnapshot {
            draft_filters: self.draft.clone(),
            applied_filters: self.applied.clone(),
            page: self.page,
            results: self.results.clone(),
            metadata: self.metadata,
            status: self.status.clone(),
            search_pending: self.search.is_pending(),
        }
    }
}
