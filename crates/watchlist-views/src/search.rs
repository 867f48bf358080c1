//! Symbol search seam.
//!
//! The search panel asks a [`SymbolSearch`] for candidate instruments.
//! Production deployments plug a market-data client in here;
//! [`StaticSymbolSearch`] serves a fixed universe of popular US listings.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use watchlist_store::{NewStock, DEFAULT_EXCHANGE, DEFAULT_INSTRUMENT_TYPE};

/// A candidate instrument returned by a search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub symbol: String,
    pub name: String,
    pub exchange: String,
    #[serde(rename = "type")]
    pub instrument_type: String,
}

impl SearchResult {
    pub fn new(symbol: &str, name: &str, exchange: &str, instrument_type: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            name: name.to_string(),
            exchange: exchange.to_string(),
            instrument_type: instrument_type.to_string(),
        }
    }

    /// One-line caption: "AAPL | NASDAQ | Common Stock"
    pub fn caption(&self) -> String {
        format!("{} | {} | {}", self.symbol, self.exchange, self.instrument_type)
    }
}

impl From<&SearchResult> for NewStock {
    fn from(result: &SearchResult) -> Self {
        NewStock::new(result.symbol.clone(), result.name.clone())
            .with_exchange(result.exchange.clone())
            .with_instrument_type(result.instrument_type.clone())
    }
}

/// Trait for symbol search providers
#[async_trait]
pub trait SymbolSearch: Send + Sync {
    /// Ranked candidates for a non-empty query
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>>;
}

/// Popular listings shown before the user types anything
const POPULAR_UNIVERSE: &[(&str, &str, &str, &str)] = &[
    ("AAPL", "Apple Inc.", "NASDAQ", "Common Stock"),
    ("MSFT", "Microsoft Corporation", "NASDAQ", "Common Stock"),
    ("NVDA", "NVIDIA Corporation", "NASDAQ", "Common Stock"),
    ("GOOGL", "Alphabet Inc. Class A", "NASDAQ", "Common Stock"),
    ("AMZN", "Amazon.com, Inc.", "NASDAQ", "Common Stock"),
    ("META", "Meta Platforms, Inc.", "NASDAQ", "Common Stock"),
    ("TSLA", "Tesla, Inc.", "NASDAQ", "Common Stock"),
    ("AVGO", "Broadcom Inc.", "NASDAQ", "Common Stock"),
    ("AMD", "Advanced Micro Devices, Inc.", "NASDAQ", "Common Stock"),
    ("NFLX", "Netflix, Inc.", "NASDAQ", "Common Stock"),
    ("JPM", "JPMorgan Chase & Co.", "NYSE", "Common Stock"),
    ("V", "Visa Inc.", "NYSE", "Common Stock"),
    ("UNH", "UnitedHealth Group Incorporated", "NYSE", "Common Stock"),
    ("JNJ", "Johnson & Johnson", "NYSE", "Common Stock"),
    ("XOM", "Exxon Mobil Corporation", "NYSE", "Common Stock"),
    ("PG", "The Procter & Gamble Company", "NYSE", "Common Stock"),
    ("HD", "The Home Depot, Inc.", "NYSE", "Common Stock"),
    ("LLY", "Eli Lilly and Company", "NYSE", "Common Stock"),
    ("SPY", "SPDR S&P 500 ETF Trust", "NYSE ARCA", "ETF"),
    ("QQQ", "Invesco QQQ Trust", "NASDAQ", "ETF"),
];

/// In-memory search over a fixed universe
#[derive(Debug, Clone)]
pub struct StaticSymbolSearch {
    universe: Vec<SearchResult>,
}

impl Default for StaticSymbolSearch {
    fn default() -> Self {
        Self::new()
    }
}

impl StaticSymbolSearch {
    /// Create a search over the built-in popular universe
    pub fn new() -> Self {
        Self {
            universe: POPULAR_UNIVERSE
                .iter()
                .map(|(s, n, e, t)| SearchResult::new(s, n, e, t))
                .collect(),
        }
    }

    /// Create a search over a custom universe
    pub fn with_universe(universe: Vec<SearchResult>) -> Self {
        Self { universe }
    }

    /// Universe entries in their listed order
    pub fn popular(&self) -> &[SearchResult] {
        &self.universe
    }

    /// Exact symbol match first, then symbol prefix, then any other symbol
    /// or name substring match. Ties keep universe order.
    fn rank(&self, query: &str) -> Vec<SearchResult> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }

        let mut hits: Vec<(u8, &SearchResult)> = self
            .universe
            .iter()
            .filter_map(|r| {
                let symbol = r.symbol.to_lowercase();
                if symbol == needle {
                    Some((0, r))
                } else if symbol.starts_with(&needle) {
                    Some((1, r))
                } else if symbol.contains(&needle) || r.name.to_lowercase().contains(&needle) {
                    Some((2, r))
                } else {
                    None
                }
            })
            .collect();

        hits.sort_by_key(|(rank, _)| *rank);
        hits.into_iter().map(|(_, r)| r.clone()).collect()
    }
}

#[async_trait]
impl SymbolSearch for StaticSymbolSearch {
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>> {
        Ok(self.rank(query))
    }
}

/// Display-field fallbacks for results from providers that omit them
pub fn fill_defaults(mut result: SearchResult) -> SearchResult {
    if result.exchange.is_empty() {
        result.exchange = DEFAULT_EXCHANGE.to_string();
    }
    if result.instrument_type.is_empty() {
        result.instrument_type = DEFAULT_INSTRUMENT_TYPE.to_string();
    }
    result
}
