//! Standalone watchlist toggle for a single symbol (detail pages, cards).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use watchlist_store::{NewStock, Subscription, WatchlistStore};

use crate::binding::bind;

/// How the button renders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ButtonVariant {
    /// Text button, "Add to Watchlist" / "Remove from Watchlist"
    #[default]
    Button,
    /// Star icon with an accessible title
    Icon,
}

/// Called after a click with `(symbol, now_watched)`
pub type ChangeCallback = Box<dyn Fn(&str, bool) + Send + Sync>;

pub struct WatchlistButton {
    store: Arc<WatchlistStore>,
    stock: NewStock,
    variant: ButtonVariant,
    show_trash_icon: bool,
    on_change: Option<ChangeCallback>,
    added: Arc<AtomicBool>,
    _subscription: Subscription,
}

impl std::fmt::Debug for WatchlistButton {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatchlistButton")
            .field("symbol", &self.stock.symbol)
            .field("variant", &self.variant)
            .field("added", &self.is_added())
            .finish()
    }
}

impl WatchlistButton {
    /// Mount a button for `stock`, reading its current membership
    pub fn mount(store: Arc<WatchlistStore>, stock: NewStock) -> Self {
        let added = Arc::new(AtomicBool::new(false));
        let symbol = stock.symbol.clone();
        let subscription = bind(&store, &added, move |store, added| {
            added.store(store.contains(&symbol), Ordering::SeqCst);
        });

        Self {
            store,
            stock,
            variant: ButtonVariant::default(),
            show_trash_icon: false,
            on_change: None,
            added,
            _subscription: subscription,
        }
    }

    pub fn with_variant(mut self, variant: ButtonVariant) -> Self {
        self.variant = variant;
        self
    }

    pub fn with_trash_icon(mut self, show: bool) -> Self {
        self.show_trash_icon = show;
        self
    }

    pub fn on_change<F>(mut self, callback: F) -> Self
    where
        F: Fn(&str, bool) + Send + Sync + 'static,
    {
        self.on_change = Some(Box::new(callback));
        self
    }

    pub fn symbol(&self) -> &str {
        &self.stock.symbol
    }

    pub fn variant(&self) -> ButtonVariant {
        self.variant
    }

    pub fn is_added(&self) -> bool {
        self.added.load(Ordering::SeqCst)
    }

    /// Visible label for the button variant, accessible title for the icon
    pub fn label(&self) -> String {
        let added = self.is_added();
        match self.variant {
            ButtonVariant::Button if added => "Remove from Watchlist".to_string(),
            ButtonVariant::Button => "Add to Watchlist".to_string(),
            ButtonVariant::Icon if added => format!("Remove {} from watchlist", self.stock.symbol),
            ButtonVariant::Icon => format!("Add {} to watchlist", self.stock.symbol),
        }
    }

    /// Filled star for the icon variant
    pub fn is_filled(&self) -> bool {
        self.variant == ButtonVariant::Icon && self.is_added()
    }

    pub fn shows_trash_icon(&self) -> bool {
        self.variant == ButtonVariant::Button && self.show_trash_icon && self.is_added()
    }

    /// Flip membership. Returns whether the symbol is watched afterwards.
    pub fn click(&self) -> bool {
        if self.is_added() {
            self.store.remove(&self.stock.symbol);
        } else {
            self.store.add(self.stock.clone());
        }

        let now_watched = self.is_added();
        if let Some(callback) = &self.on_change {
            callback(&self.stock.symbol, now_watched);
        }
        now_watched
    }
}
