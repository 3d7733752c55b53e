//! URL storage collaborator
//!
//! The engine never touches a global location. It reads and writes the query
//! string through a `UrlStore`, and learns about navigation it did not cause
//! (back/forward, a pasted link) through a registered listener.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Callback invoked with the new query string after an external change
pub type UrlListener = Box<dyn FnMut(&str) + Send>;

/// Access to the page's query string
pub trait UrlStore {
    /// Current query string
    fn read(&self) -> String;

    /// Replace the query string on behalf of the engine
    ///
    /// Engine-originated writes must not be reported back to listeners.
    fn write(&mut self, query: &str);

    /// Register a listener for changes the engine did not make
    fn on_external_change(&mut self, listener: UrlListener);
}

#[derive(Default)]
struct HistoryInner {
    entries: Vec<String>,
    listeners: Vec<UrlListener>,
    writes: usize,
}

impl HistoryInner {
    fn current(&self) -> String {
        self.entries.last().cloned().unwrap_or_default()
    }

}

/// In-memory browser history
///
/// Cloning yields another handle onto the same history, so a caller can keep
/// one handle to simulate navigation while the engine owns another.
///
/// # Examples
///
/// ```
/// use catalogr::location::{MemoryUrlStore, UrlStore};
///
/// let mut store = MemoryUrlStore::new("category=Nature&page=2");
/// store.write("category=Abstract");
/// assert_eq!(store.read(), "category=Abstract");
///
/// assert!(store.back());
/// assert_eq!(store.read(), "category=Nature&page=2");
/// ```
#[derive(Clone, Default)]
pub struct MemoryUrlStore {
    inner: Arc<Mutex<HistoryInner>>,
}

impl MemoryUrlStore {
    /// Create a history whose first entry is `initial`
    #[must_use]
    pub fn new(initial: &str) -> Self {
        let inner = HistoryInner {
            entries: vec![initial.to_string()],
            ..HistoryInner::default()
        };
        Self {
            inner: Arc::new(Mutex::new(inner)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HistoryInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Simulate the user following a link: push an entry and notify listeners
    pub fn navigate(&self, query: &str) {
        self.lock().entries.push(query.to_string());
        self.notify();
    }

    /// Simulate the back button
    ///
    /// Returns `false` (and notifies nobody) when there is no earlier entry.
    pub fn back(&self) -> bool {
        {
            let mut inner = self.lock();
            if inner.entries.len() < 2 {
                return false;
            }
            inner.entries.pop();
        }
        self.notify();
        true
    }

    /// Run every listener with the current entry
    ///
    /// Listeners run without the history lock held, so they may read the
    /// store. Listeners registered while notifying are kept for the next change.
    fn notify(&self) {
        let (current, mut listeners) = {
            let mut inner = self.lock();
            (inner.current(), std::mem::take(&mut inner.listeners))
        };

        for listener in &mut listeners {
            listener(&current);
        }

        let mut inner = self.lock();
        listeners.append(&mut inner.listeners);
        inner.listeners = listeners;
    }

    /// All entries, oldest first
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.lock().entries.clone()
    }

    /// Number of engine-originated writes so far
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.lock().writes
    }
}

impl UrlStore for MemoryUrlStore {
    fn read(&self) -> String {
        self.lock().current()
    }

    fn write(&mut self, query: &str) {
        let mut inner = self.lock();
        inner.writes += 1;
        inner.entries.push(query.to_string());
    }

    fn on_external_change(&mut self, listener: UrlListener) {
        self.lock().listeners.push(listener);
    }
}

impl std::fmt::Debug for MemoryUrlStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.lock();
        f.debug_struct("MemoryUrlStore")
            .field("entries", &inner.entries)
            .field("writes", &inner.writes)
            .field("listeners", &inner.listeners.len())
            .finish()
    }
}
