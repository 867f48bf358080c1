//! Search panel with per-result watchlist stars.
//!
//! The panel keeps a derived set of "displayed results that are watched".
//! That set is a projection rebuilt from the store whenever the result list
//! changes or the store broadcasts a change; it is never patched in place,
//! so the store stays the single source of truth. Editing the query alone
//! does not rebuild it.

use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use watchlist_store::{NewStock, Subscription, WatchlistStore};

use crate::binding::bind;
use crate::search::{fill_defaults, SearchResult, SymbolSearch};

/// Results shown when no query is entered
pub const DEFAULT_POPULAR_LIMIT: usize = 10;

#[derive(Debug)]
struct PanelState {
    query: String,
    results: Vec<SearchResult>,
    watched: HashSet<String>,
    loading: bool,
    popular_limit: usize,
}

impl Default for PanelState {
    fn default() -> Self {
        Self {
            query: String::new(),
            results: Vec::new(),
            watched: HashSet::new(),
            loading: false,
            popular_limit: DEFAULT_POPULAR_LIMIT,
        }
    }
}

impl PanelState {
    fn is_search_mode(&self) -> bool {
        !self.query.trim().is_empty()
    }

    fn displayed(&self) -> &[SearchResult] {
        if self.is_search_mode() {
            &self.results
        } else {
            &self.results[..self.results.len().min(self.popular_limit)]
        }
    }

    fn reproject(&mut self, store: &WatchlistStore) {
        self.watched = self
            .displayed()
            .iter()
            .filter(|r| store.contains(&r.symbol))
            .map(|r| r.symbol.clone())
            .collect();
    }
}

pub struct SearchPanel {
    store: Arc<WatchlistStore>,
    searcher: Arc<dyn SymbolSearch>,
    initial_stocks: Vec<SearchResult>,
    state: Arc<Mutex<PanelState>>,
    _subscription: Subscription,
}

impl std::fmt::Debug for SearchPanel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("SearchPanel")
            .field("query", &state.query)
            .field("results", &state.results.len())
            .field("watched", &state.watched.len())
            .finish()
    }
}

impl SearchPanel {
    /// Mount the panel showing `initial_stocks` until the user searches
    pub fn mount(
        store: Arc<WatchlistStore>,
        searcher: Arc<dyn SymbolSearch>,
        initial_stocks: Vec<SearchResult>,
    ) -> Self {
        let state = Arc::new(Mutex::new(PanelState {
            results: initial_stocks.clone(),
            ..Default::default()
        }));
        let subscription = bind(&store, &state, |store, state| {
            state.lock().reproject(store);
        });

        Self {
            store,
            searcher,
            initial_stocks,
            state,
            _subscription: subscription,
        }
    }

    pub fn with_popular_limit(self, limit: usize) -> Self {
        {
            let mut state = self.state.lock();
            state.popular_limit = limit;
            state.reproject(&self.store);
        }
        self
    }

    pub fn query(&self) -> String {
        self.state.lock().query.clone()
    }

    /// Update the query text without searching
    pub fn set_query(&self, query: &str) {
        self.state.lock().query = query.to_string();
    }

    pub fn is_search_mode(&self) -> bool {
        self.state.lock().is_search_mode()
    }

    pub fn is_loading(&self) -> bool {
        self.state.lock().loading
    }

    /// Set the query and run the search
    pub async fn search(&self, query: &str) {
        self.set_query(query);
        self.run_search().await;
    }

    /// Search for the current query. A blank query restores the popular
    /// list; a failed search shows no results.
    pub async fn run_search(&self) {
        let query = {
            let mut state = self.state.lock();
            if !state.is_search_mode() {
                drop(state);
                self.set_results(self.initial_stocks.clone());
                return;
            }
            state.loading = true;
            state.query.trim().to_string()
        };

        let results = match self.searcher.search(&query).await {
            Ok(results) => results.into_iter().map(fill_defaults).collect(),
            Err(e) => {
                tracing::warn!("Symbol search for '{}' failed: {}", query, e);
                Vec::new()
            }
        };

        self.state.lock().loading = false;
        tracing::debug!("Search '{}' returned {} results", query, results.len());
        self.set_results(results);
    }

    fn set_results(&self, results: Vec<SearchResult>) {
        let mut state = self.state.lock();
        state.results = results;
        state.reproject(&self.store);
    }

    /// Results currently rendered: everything in search mode, the first
    /// `popular_limit` otherwise
    pub fn displayed(&self) -> Vec<SearchResult> {
        self.state.lock().displayed().to_vec()
    }

    /// Whether the star for `symbol` is filled
    pub fn is_watched(&self, symbol: &str) -> bool {
        self.state.lock().watched.contains(symbol)
    }

    pub fn watched_symbols(&self) -> HashSet<String> {
        self.state.lock().watched.clone()
    }

    /// Toggle the star on a displayed result. Returns the new membership,
    /// or `None` if `symbol` is not displayed.
    pub fn toggle_star(&self, symbol: &str) -> Option<bool> {
        let result = self.displayed().into_iter().find(|r| r.symbol == symbol)?;
        Some(self.store.toggle(NewStock::from(&result)))
    }

    /// "Search results (n)" or "Popular stocks (n)"
    pub fn header(&self) -> String {
        let count = self.displayed().len();
        if self.is_search_mode() {
            format!("Search results ({})", count)
        } else {
            format!("Popular stocks ({})", count)
        }
    }

    /// Placeholder text when nothing is displayed
    pub fn empty_message(&self) -> Option<&'static str> {
        if self.is_loading() {
            return Some("Loading stocks...");
        }
        if !self.displayed().is_empty() {
            return None;
        }
        if self.is_search_mode() {
            Some("No results found")
        } else {
            Some("No stocks available")
        }
    }

    /// Follow a result to its detail page, resetting the panel.
    /// Returns the detail route.
    pub fn select(&self, symbol: &str) -> String {
        self.reset();
        format!("/stocks/{}", symbol)
    }

    /// Clear the query and show the popular list again
    pub fn reset(&self) {
        self.set_query("");
        self.set_results(self.initial_stocks.clone());
    }
}
