//! Watchlist Data Models

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// Exchange used when the caller does not name one
pub const DEFAULT_EXCHANGE: &str = "NASDAQ";

/// Instrument type used when the caller does not name one
pub const DEFAULT_INSTRUMENT_TYPE: &str = "Common Stock";

/// A stock tracked in the watchlist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchedStock {
    /// Ticker symbol, case-sensitive collection key
    pub symbol: String,
    /// Company name
    pub name: String,
    /// Listing exchange (display only)
    pub exchange: String,
    /// Instrument type, e.g. "Common Stock" or "ETF"
    #[serde(rename = "type")]
    pub instrument_type: String,
    /// When the entry was inserted, stamped by the store
    #[serde(with = "iso_millis")]
    pub added_at: DateTime<Utc>,
}

impl WatchedStock {
    /// Date the entry was added, for "Added <date>" captions
    pub fn added_on(&self) -> String {
        self.added_at.format("%Y-%m-%d").to_string()
    }
}

/// Caller-supplied stock data for `add` and `toggle`.
///
/// Carries no timestamp; the store assigns `added_at` on insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStock {
    pub symbol: String,
    pub name: String,
    pub exchange: String,
    pub instrument_type: String,
}

impl NewStock {
    /// Create input with the default exchange and instrument type
    pub fn new(symbol: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            name: name.into(),
            exchange: DEFAULT_EXCHANGE.to_string(),
            instrument_type: DEFAULT_INSTRUMENT_TYPE.to_string(),
        }
    }

    pub fn with_exchange(mut self, exchange: impl Into<String>) -> Self {
        self.exchange = exchange.into();
        self
    }

    pub fn with_instrument_type(mut self, instrument_type: impl Into<String>) -> Self {
        self.instrument_type = instrument_type.into();
        self
    }

    pub(crate) fn stamp(self, added_at: DateTime<Utc>) -> WatchedStock {
        WatchedStock {
            symbol: self.symbol,
            name: self.name,
            exchange: self.exchange,
            instrument_type: self.instrument_type,
            added_at,
        }
    }
}

impl From<&WatchedStock> for NewStock {
    fn from(stock: &WatchedStock) -> Self {
        Self {
            symbol: stock.symbol.clone(),
            name: stock.name.clone(),
            exchange: stock.exchange.clone(),
            instrument_type: stock.instrument_type.clone(),
        }
    }
}

/// Timestamps are written as ISO-8601 UTC with millisecond precision
/// (`2020-01-01T00:00:00.000Z`) and read back from any RFC 3339 string,
/// truncated to the same precision.
pub(crate) mod iso_millis {
    use super::*;
    use serde::{Deserializer, Serializer};

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc).trunc_subsecs(3))
            .map_err(|e| serde::de::Error::custom(format!("invalid addedAt '{}': {}", raw, e)))
    }
}
