use std::path::PathBuf;
use watchlist_store::{DEFAULT_EXCHANGE, DEFAULT_INSTRUMENT_TYPE};
use watchlist_views::search_panel::DEFAULT_POPULAR_LIMIT;

/// Configuration for a watchlist session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchlistConfig {
    /// Exchange recorded for `add`/`toggle` when none is given
    pub default_exchange: String,
    /// Instrument type recorded for `add`/`toggle` when none is given
    pub default_instrument_type: String,
    /// Where `export` writes `watchlist-<date>.json`
    pub export_dir: PathBuf,
    /// Popular stocks shown in the search panel before a query
    pub popular_limit: usize,
}

impl Default for WatchlistConfig {
    fn default() -> Self {
        Self {
            default_exchange: DEFAULT_EXCHANGE.to_string(),
            default_instrument_type: DEFAULT_INSTRUMENT_TYPE.to_string(),
            export_dir: PathBuf::from("."),
            popular_limit: DEFAULT_POPULAR_LIMIT,
        }
    }
}

impl WatchlistConfig {
    /// Load from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|s| !s.trim().is_empty());

        Self {
            default_exchange: non_empty("WATCHLIST_DEFAULT_EXCHANGE")
                .unwrap_or(defaults.default_exchange),
            default_instrument_type: non_empty("WATCHLIST_DEFAULT_TYPE")
                .unwrap_or(defaults.default_instrument_type),
            export_dir: non_empty("WATCHLIST_EXPORT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.export_dir),
            popular_limit: non_empty("WATCHLIST_POPULAR_LIMIT")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.popular_limit),
        }
    }
}
