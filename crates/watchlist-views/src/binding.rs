//! Observer binding shared by every watchlist surface.
//!
//! A surface keeps its view state behind an `Arc`, and [`bind`] wires that
//! state to the store:
//!
//! 1. `refresh` runs once immediately to establish the initial view.
//! 2. `refresh` runs again after every store mutation.
//! 3. The returned [`Subscription`] unsubscribes when the surface drops it.
//!
//! The callback holds only weak references, so a surface never keeps the
//! store alive and the store never keeps a surface alive.

use std::sync::Arc;
use watchlist_store::{Subscription, WatchlistStore};

#[must_use = "dropping the Subscription unbinds the view"]
pub fn bind<S, F>(store: &Arc<WatchlistStore>, state: &Arc<S>, refresh: F) -> Subscription
where
    S: Send + Sync + 'static,
    F: Fn(&WatchlistStore, &S) + Send + Sync + 'static,
{
    refresh(store.as_ref(), state.as_ref());

    let weak_store = Arc::downgrade(store);
    let weak_state = Arc::downgrade(state);
    store.subscribe(move || {
        if let (Some(store), Some(state)) = (weak_store.upgrade(), weak_state.upgrade()) {
            refresh(store.as_ref(), state.as_ref());
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use watchlist_store::NewStock;

    #[test]
    fn test_initial_refresh_and_updates() {
        let store = Arc::new(WatchlistStore::new());
        store.add(NewStock::new("AAPL", "Apple Inc."));

        let count = Arc::new(Mutex::new(0usize));
        let _sub = bind(&store, &count, |store, count| {
            *count.lock() = store.count();
        });
        assert_eq!(*count.lock(), 1);

        store.add(NewStock::new("MSFT", "Microsoft"));
        assert_eq!(*count.lock(), 2);
    }

    #[test]
    fn test_unbind_on_drop() {
        let store = Arc::new(WatchlistStore::new());
        let count = Arc::new(Mutex::new(0usize));

        let sub = bind(&store, &count, |store, count| {
            *count.lock() = store.count();
        });
        drop(sub);
        store.add(NewStock::new("AAPL", "Apple Inc."));

        assert_eq!(*count.lock(), 0);
        assert_eq!(store.subscriber_count(), 0);
    }

    #[test]
    fn test_binding_does_not_keep_state_alive() {
        let store = Arc::new(WatchlistStore::new());
        let state = Arc::new(Mutex::new(0usize));
        let weak = Arc::downgrade(&state);

        let _sub = bind(&store, &state, |store, s| *s.lock() = store.count());
        drop(state);

        assert!(weak.upgrade().is_none());
        store.clear();
    }
}
