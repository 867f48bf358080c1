//! Watchlist Views
//!
//! Surfaces that render watchlist membership and stay in sync with the
//! shared [`WatchlistStore`](watchlist_store::WatchlistStore) through its
//! change notifications: a per-symbol toggle button, the search panel with
//! star toggles, and the full watchlist page.

pub mod binding;
pub mod button;
pub mod page;
pub mod search;
pub mod search_panel;

pub use binding::bind;
pub use button::{ButtonVariant, WatchlistButton};
pub use page::WatchlistPage;
pub use search::{SearchResult, StaticSymbolSearch, SymbolSearch};
pub use search_panel::SearchPanel;
