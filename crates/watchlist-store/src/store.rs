//! Watchlist Store
//!
//! Session-scoped owner of the watched-symbol collection. Every mutation
//! runs under one lock, and the change notification is delivered after the
//! lock is released so observers can query the store from their callbacks.

use chrono::{SubsecRound, Utc};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use crate::error::WatchlistError;
use crate::models::{NewStock, WatchedStock};
use crate::notifier::{ChangeNotifier, Subscription};
use crate::snapshot;

/// A stored stock plus its insertion sequence, used to order entries that
/// share a millisecond timestamp.
#[derive(Debug)]
struct Entry {
    stock: WatchedStock,
    seq: u64,
}

#[derive(Debug, Default)]
struct Collection {
    entries: HashMap<String, Entry>,
    next_seq: u64,
}

impl Collection {
    /// Insert or overwrite. Returns true if an entry was replaced.
    fn insert(&mut self, stock: WatchedStock) -> bool {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.insert_at(stock, seq)
    }

    fn insert_at(&mut self, stock: WatchedStock, seq: u64) -> bool {
        self.entries
            .insert(stock.symbol.clone(), Entry { stock, seq })
            .is_some()
    }

    fn sorted(&self) -> Vec<WatchedStock> {
        let mut entries: Vec<&Entry> = self.entries.values().collect();
        entries.sort_by(|a, b| {
            b.stock
                .added_at
                .cmp(&a.stock.added_at)
                .then_with(|| b.seq.cmp(&a.seq))
        });
        entries.into_iter().map(|e| e.stock.clone()).collect()
    }
}

/// The watchlist for one session.
///
/// Construct one per session and share it (`Arc<WatchlistStore>`) with every
/// surface that displays membership.
#[derive(Debug, Default)]
pub struct WatchlistStore {
    collection: Mutex<Collection>,
    notifier: ChangeNotifier,
}

impl WatchlistStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the entry for `stock.symbol`, stamping `added_at`
    /// with the current time.
    pub fn add(&self, stock: NewStock) {
        let symbol = stock.symbol.clone();
        let replaced = self.collection.lock().insert(stock.stamp(now()));

        if replaced {
            tracing::debug!("Re-added {} to watchlist", symbol);
        } else {
            tracing::debug!("Added {} to watchlist", symbol);
        }
        self.notifier.notify();
    }

    /// Remove an entry. Returns whether it existed. Notifies either way.
    pub fn remove(&self, symbol: &str) -> bool {
        let existed = self.collection.lock().entries.remove(symbol).is_some();

        tracing::debug!("Remove {} from watchlist (existed: {})", symbol, existed);
        self.notifier.notify();
        existed
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.collection.lock().entries.contains_key(symbol)
    }

    pub fn get(&self, symbol: &str) -> Option<WatchedStock> {
        self.collection
            .lock()
            .entries
            .get(symbol)
            .map(|e| e.stock.clone())
    }

    /// All entries, newest first. The returned vector is a snapshot.
    pub fn list(&self) -> Vec<WatchedStock> {
        self.collection.lock().sorted()
    }

    /// Current symbols, unordered
    pub fn symbols(&self) -> HashSet<String> {
        self.collection.lock().entries.keys().cloned().collect()
    }

    pub fn count(&self) -> usize {
        self.collection.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    pub fn clear(&self) {
        let removed = {
            let mut collection = self.collection.lock();
            let n = collection.entries.len();
            collection.entries.clear();
            n
        };

        tracing::debug!("Cleared watchlist ({} entries)", removed);
        self.notifier.notify();
    }

    /// Add the stock if absent, remove it if present. Returns whether the
    /// symbol is watched afterwards.
    pub fn toggle(&self, stock: NewStock) -> bool {
        let now_watched = {
            let mut collection = self.collection.lock();
            if collection.entries.remove(&stock.symbol).is_some() {
                false
            } else {
                collection.insert(stock.clone().stamp(now()));
                true
            }
        };

        tracing::debug!("Toggled {} (watched: {})", stock.symbol, now_watched);
        self.notifier.notify();
        now_watched
    }

    /// Serialize `list()` as pretty-printed JSON
    pub fn export_snapshot(&self) -> Result<String, WatchlistError> {
        snapshot::render(&self.list())
    }

    /// Apply a snapshot produced by `export_snapshot`, keeping each record's
    /// `addedAt`. Nothing is applied unless the whole batch parses. Returns
    /// the number of records applied.
    pub fn import_snapshot(&self, data: &str) -> Result<usize, WatchlistError> {
        let stocks = match snapshot::parse(data) {
            Ok(stocks) => stocks,
            Err(e) => {
                tracing::warn!("Rejected watchlist import: {}", e);
                return Err(e);
            }
        };

        let applied = stocks.len();
        {
            let mut collection = self.collection.lock();
            // Earlier records in the document sort first among equal timestamps.
            let base = collection.next_seq;
            collection.next_seq += applied as u64;
            for (index, stock) in stocks.into_iter().enumerate() {
                let seq = base + (applied - 1 - index) as u64;
                collection.insert_at(stock, seq);
            }
        }

        tracing::info!("Imported {} watchlist records", applied);
        self.notifier.notify();
        Ok(applied)
    }

    /// Write the export to `dir/watchlist-<YYYY-MM-DD>.json` (UTC date).
    pub fn export_to_dir(&self, dir: &Path) -> Result<PathBuf, WatchlistError> {
        let path = dir.join(snapshot::snapshot_file_name(Utc::now().date_naive()));
        std::fs::write(&path, self.export_snapshot()?)?;

        tracing::info!("Exported {} watchlist entries to {}", self.count(), path.display());
        Ok(path)
    }

    pub fn import_from_file(&self, path: &Path) -> Result<usize, WatchlistError> {
        let data = std::fs::read_to_string(path)?;
        self.import_snapshot(&data)
    }

    /// Register a change observer. The callback carries no payload; re-query
    /// the store inside it. Dropping the guard unsubscribes.
    #[must_use = "dropping the Subscription unsubscribes immediately"]
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.notifier.subscribe(callback)
    }

    pub fn subscriber_count(&self) -> usize {
        self.notifier.subscriber_count()
    }
}

/// Millisecond precision, matching what the snapshot format can carry
fn now() -> chrono::DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn apple() -> NewStock {
        NewStock::new("AAPL", "Apple Inc.")
            .with_exchange("NASDAQ")
            .with_instrument_type("Common Stock")
    }

    fn counting(store: &WatchlistStore) -> (Arc<AtomicUsize>, Subscription) {
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        let sub = store.subscribe(move || {
            c.fetch_add(1, Ordering::SeqCst);
        });
        (count, sub)
    }

    #[test]
    fn test_add_remove_scenario() {
        let store = WatchlistStore::new();
        store.add(apple());

        assert!(store.contains("AAPL"));
        assert_eq!(store.count(), 1);
        assert!(store.remove("AAPL"));
        assert!(!store.contains("AAPL"));
        assert_eq!(store.count(), 0);
    }

    #[test]
    fn test_symbols_are_case_sensitive() {
        let store = WatchlistStore::new();
        store.add(apple());

        assert!(!store.contains("aapl"));
        assert!(store.get("aapl").is_none());
    }

    #[test]
    fn test_readd_overwrites() {
        let store = WatchlistStore::new();
        store.add(apple());
        let first = store.get("AAPL").unwrap();

        store.add(NewStock::new("AAPL", "Apple").with_exchange("NMS"));
        let second = store.get("AAPL").unwrap();

        assert_eq!(store.count(), 1);
        assert_eq!(second.name, "Apple");
        assert_eq!(second.exchange, "NMS");
        assert!(second.added_at >= first.added_at);
    }

    #[test]
    fn test_empty_symbol_accepted() {
        let store = WatchlistStore::new();
        store.add(NewStock::new("", ""));
        assert!(store.contains(""));
    }

    #[test]
    fn test_list_newest_first() {
        let store = WatchlistStore::new();
        store.add(NewStock::new("A", "Alpha"));
        store.add(NewStock::new("B", "Beta"));
        store.add(NewStock::new("C", "Gamma"));

        let symbols: Vec<String> = store.list().into_iter().map(|s| s.symbol).collect();
        assert_eq!(symbols, vec!["C", "B", "A"]);
    }

    #[test]
    fn test_readd_moves_to_front() {
        let store = WatchlistStore::new();
        store.add(NewStock::new("A", "Alpha"));
        store.add(NewStock::new("B", "Beta"));
        store.add(NewStock::new("A", "Alpha"));

        let symbols: Vec<String> = store.list().into_iter().map(|s| s.symbol).collect();
        assert_eq!(symbols, vec!["A", "B"]);
    }

    #[test]
    fn test_list_is_a_snapshot() {
        let store = WatchlistStore::new();
        store.add(apple());
        let before = store.list();

        store.clear();
        assert_eq!(before.len(), 1);
        assert!(store.list().is_empty());
    }

    #[test]
    fn test_remove_absent_still_notifies() {
        let store = WatchlistStore::new();
        let (count, _sub) = counting(&store);

        assert!(!store.remove("NOPE"));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_reads_do_not_notify() {
        let store = WatchlistStore::new();
        store.add(apple());
        let (count, _sub) = counting(&store);

        store.contains("AAPL");
        store.get("AAPL");
        store.list();
        store.count();
        store.symbols();
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_notification_count_and_timing() {
        let store = WatchlistStore::new();
        let (count, _sub) = counting(&store);

        store.add(apple());
        assert_eq!(count.load(Ordering::SeqCst), 1);
        store.add(NewStock::new("MSFT", "Microsoft"));
        assert_eq!(count.load(Ordering::SeqCst), 2);
        store.remove("AAPL");
        assert_eq!(count.load(Ordering::SeqCst), 3);
        store.clear();
        assert_eq!(count.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn test_toggle_law() {
        let store = WatchlistStore::new();
        let (count, _sub) = counting(&store);

        assert!(store.toggle(apple()));
        assert!(store.contains("AAPL"));
        assert!(!store.toggle(apple()));
        assert!(!store.contains("AAPL"));
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_observer_can_reenter_store() {
        let store = Arc::new(WatchlistStore::new());
        let seen = Arc::new(AtomicUsize::new(usize::MAX));

        let weak = Arc::downgrade(&store);
        let s = Arc::clone(&seen);
        let _sub = store.subscribe(move || {
            if let Some(store) = weak.upgrade() {
                s.store(store.count(), Ordering::SeqCst);
            }
        });

        store.add(apple());
        assert_eq!(seen.load(Ordering::SeqCst), 1);
        store.clear();
        assert_eq!(seen.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_dropped_subscription_stops_delivery() {
        let store = WatchlistStore::new();
        let (count, sub) = counting(&store);

        store.add(apple());
        drop(sub);
        store.clear();

        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(store.subscriber_count(), 0);
    }

    #[test]
    fn test_import_keeps_timestamp() {
        let store = WatchlistStore::new();
        let data = r#"[{"symbol":"MSFT","name":"Microsoft","exchange":"NASDAQ","type":"Common Stock","addedAt":"2020-01-01T00:00:00.000Z"}]"#;

        assert_eq!(store.import_snapshot(data).unwrap(), 1);
        assert_eq!(
            store.get("MSFT").unwrap().added_at,
            Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_malformed_import_leaves_store_unchanged() {
        let store = WatchlistStore::new();
        store.add(apple());
        let (count, _sub) = counting(&store);

        let err = store.import_snapshot("not json").unwrap_err();
        assert!(matches!(err, WatchlistError::MalformedImportData(_)));
        assert_eq!(store.count(), 1);
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_import_notifies_once() {
        let store = WatchlistStore::new();
        let (count, _sub) = counting(&store);
        let data = r#"[
            {"symbol":"A","addedAt":"2020-01-01T00:00:00.000Z"},
            {"symbol":"B","addedAt":"2020-01-02T00:00:00.000Z"},
            {"symbol":"A","name":"Later","addedAt":"2020-01-03T00:00:00.000Z"}
        ]"#;

        assert_eq!(store.import_snapshot(data).unwrap(), 3);
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(store.count(), 2);
        assert_eq!(store.get("A").unwrap().name, "Later");
    }

    #[test]
    fn test_round_trip() {
        let store = WatchlistStore::new();
        store.add(apple());
        store.add(NewStock::new("MSFT", "Microsoft"));
        store.add(NewStock::new("SPY", "SPDR S&P 500").with_instrument_type("ETF"));
        let before = store.list();

        let exported = store.export_snapshot().unwrap();
        store.import_snapshot(&exported).unwrap();
        assert_eq!(store.list(), before);

        let fresh = WatchlistStore::new();
        fresh.import_snapshot(&exported).unwrap();
        assert_eq!(fresh.list(), before);
    }

    #[test]
    fn test_round_trip_sub_millisecond_import() {
        let store = WatchlistStore::new();
        let data = r#"[
            {"symbol":"A","addedAt":"2020-01-01T00:00:00.123456Z"},
            {"symbol":"B","addedAt":"2020-01-01T00:00:00.123999Z"}
        ]"#;
        store.import_snapshot(data).unwrap();
        let before = store.list();
        assert_eq!(before[0].added_at, before[1].added_at);

        let exported = store.export_snapshot().unwrap();
        store.import_snapshot(&exported).unwrap();
        assert_eq!(store.list(), before);

        let fresh = WatchlistStore::new();
        fresh.import_snapshot(&exported).unwrap();
        assert_eq!(fresh.list(), before);
    }

    #[test]
    fn test_export_to_dir_and_back() {
        let dir = tempfile::tempdir().unwrap();
        let store = WatchlistStore::new();
        store.add(apple());

        let path = store.export_to_dir(dir.path()).unwrap();
        let file_name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(file_name.starts_with("watchlist-"));
        assert!(file_name.ends_with(".json"));

        let other = WatchlistStore::new();
        assert_eq!(other.import_from_file(&path).unwrap(), 1);
        assert_eq!(other.list(), store.list());
    }

    #[test]
    fn test_import_missing_file_is_io_error() {
        let store = WatchlistStore::new();
        let err = store
            .import_from_file(Path::new("/definitely/not/here.json"))
            .unwrap_err();
        assert!(matches!(err, WatchlistError::Io(_)));
    }

    #[test]
    fn test_store_is_shareable_across_threads() {
        let store = Arc::new(WatchlistStore::new());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for j in 0..25 {
                        store.add(NewStock::new(format!("S{}-{}", i, j), "x"));
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(store.count(), 100);
    }
}
