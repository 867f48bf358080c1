//! Change notification for the watchlist.
//!
//! A [`ChangeNotifier`] is a payload-less broadcast: observers learn *that*
//! the watchlist changed and re-query the store to learn *what* changed.
//!
//! # Invariants
//!
//! 1. Subscribers are notified in registration order.
//! 2. Delivery is synchronous; every callback has returned before
//!    [`ChangeNotifier::notify`] returns.
//! 3. No registry lock is held while callbacks run, so a callback may
//!    subscribe, unsubscribe or call back into the store.
//! 4. Dropping a [`Subscription`] removes its callback before the next
//!    notification cycle.

use parking_lot::Mutex;
use std::sync::{Arc, Weak};

type Callback = Arc<dyn Fn() + Send + Sync>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    listeners: Vec<(u64, Callback)>,
}

/// Broadcast channel shared by the store and its subscription guards
#[derive(Clone, Default)]
pub struct ChangeNotifier {
    registry: Arc<Mutex<Registry>>,
}

impl std::fmt::Debug for ChangeNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback. It stays registered until the returned guard
    /// is dropped.
    #[must_use = "dropping the Subscription unsubscribes immediately"]
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        let mut registry = self.registry.lock();
        let id = registry.next_id;
        registry.next_id += 1;
        registry.listeners.push((id, Arc::new(callback)));

        Subscription {
            id,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Deliver one notification to every current subscriber.
    /// Returns the number of callbacks invoked.
    pub fn notify(&self) -> usize {
        let callbacks: Vec<Callback> = self
            .registry
            .lock()
            .listeners
            .iter()
            .map(|(_, cb)| Arc::clone(cb))
            .collect();

        for callback in &callbacks {
            callback();
        }

        callbacks.len()
    }

    pub fn subscriber_count(&self) -> usize {
        self.registry.lock().listeners.len()
    }
}

/// RAII guard for a registered callback. Unsubscribes on drop.
pub struct Subscription {
    id: u64,
    registry: Weak<Mutex<Registry>>,
}

impl Subscription {
    /// Release the subscription now instead of at end of scope
    pub fn unsubscribe(self) {}

    /// Whether the callback is still registered with a live notifier
    pub fn is_active(&self) -> bool {
        self.registry
            .upgrade()
            .map(|registry| registry.lock().listeners.iter().any(|(id, _)| *id == self.id))
            .unwrap_or(false)
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        // The callback may own other guards; release it outside the lock.
        let removed = {
            let mut registry = registry.lock();
            registry
                .listeners
                .iter()
                .position(|(id, _)| *id == self.id)
                .map(|pos| registry.listeners.remove(pos))
        };
        drop(removed);
    }
}
