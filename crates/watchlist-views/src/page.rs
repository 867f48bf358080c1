//! Watchlist page: the full list with remove, clear, export and import.

use chrono::Utc;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use watchlist_store::{snapshot_file_name, Subscription, WatchedStock, WatchlistError, WatchlistStore};

use crate::binding::bind;

pub struct WatchlistPage {
    store: Arc<WatchlistStore>,
    entries: Arc<Mutex<Vec<WatchedStock>>>,
    _subscription: Subscription,
}

impl std::fmt::Debug for WatchlistPage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatchlistPage")
            .field("entries", &self.len())
            .finish()
    }
}

impl WatchlistPage {
    pub fn mount(store: Arc<WatchlistStore>) -> Self {
        let entries: Arc<Mutex<Vec<WatchedStock>>> = Arc::new(Mutex::new(Vec::new()));
        let subscription = bind(&store, &entries, |store, entries| {
            *entries.lock() = store.list();
        });

        Self {
            store,
            entries,
            _subscription: subscription,
        }
    }

    /// Rendered entries, newest first
    pub fn entries(&self) -> Vec<WatchedStock> {
        self.entries.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Header caption
    pub fn summary(&self) -> String {
        format!("Track your favorite stocks ({} stocks)", self.len())
    }

    pub fn can_export(&self) -> bool {
        !self.is_empty()
    }

    pub fn can_clear(&self) -> bool {
        !self.is_empty()
    }

    pub fn remove(&self, symbol: &str) -> bool {
        self.store.remove(symbol)
    }

    pub fn clear_all(&self) {
        self.store.clear();
    }

    /// Export as `(file_name, json)` for a download
    pub fn export(&self) -> Result<(String, String), WatchlistError> {
        let file_name = snapshot_file_name(Utc::now().date_naive());
        Ok((file_name, self.store.export_snapshot()?))
    }

    pub fn export_to_dir(&self, dir: &Path) -> Result<PathBuf, WatchlistError> {
        self.store.export_to_dir(dir)
    }

    pub fn import(&self, data: &str) -> Result<usize, WatchlistError> {
        self.store.import_snapshot(data)
    }

    pub fn import_file(&self, path: &Path) -> Result<usize, WatchlistError> {
        self.store.import_from_file(path)
    }
}
