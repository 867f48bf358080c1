//! Watchlist Store
//!
//! Session-scoped set of watched stock symbols with a payload-less change
//! broadcast, so independently rendered surfaces stay in sync, plus JSON
//! snapshot export/import for backups.

pub mod error;
pub mod models;
pub mod notifier;
pub mod snapshot;
pub mod store;

pub use error::WatchlistError;
pub use models::{NewStock, WatchedStock, DEFAULT_EXCHANGE, DEFAULT_INSTRUMENT_TYPE};
pub use notifier::{ChangeNotifier, Subscription};
pub use snapshot::snapshot_file_name;
pub use store::WatchlistStore;
