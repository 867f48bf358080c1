//! Snapshot Module
//!
//! JSON backup format for the watchlist: a pretty-printed array of
//! [`WatchedStock`] records, newest first.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::error::WatchlistError;
use crate::models::{WatchedStock, DEFAULT_EXCHANGE, DEFAULT_INSTRUMENT_TYPE};

/// Backup file name for a given day, e.g. `watchlist-2024-03-09.json`
pub fn snapshot_file_name(date: NaiveDate) -> String {
    format!("watchlist-{}.json", date.format("%Y-%m-%d"))
}

/// Render entries (already ordered) as pretty-printed JSON with 2-space indent
pub fn render(stocks: &[WatchedStock]) -> Result<String, WatchlistError> {
    serde_json::to_string_pretty(stocks).map_err(|e| WatchlistError::Serialization(e.to_string()))
}

/// One imported record. `symbol` and `addedAt` are required; display
/// fields fall back to the same defaults `add` uses.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImportRecord {
    symbol: String,
    #[serde(default)]
    name: String,
    #[serde(default = "default_exchange")]
    exchange: String,
    #[serde(rename = "type", default = "default_instrument_type")]
    instrument_type: String,
    #[serde(with = "crate::models::iso_millis")]
    added_at: DateTime<Utc>,
}

fn default_exchange() -> String {
    DEFAULT_EXCHANGE.to_string()
}

fn default_instrument_type() -> String {
    DEFAULT_INSTRUMENT_TYPE.to_string()
}

impl From<ImportRecord> for WatchedStock {
    fn from(record: ImportRecord) -> Self {
        Self {
            symbol: record.symbol,
            name: record.name,
            exchange: record.exchange,
            instrument_type: record.instrument_type,
            added_at: record.added_at,
        }
    }
}

/// Parse a snapshot, rejecting the whole batch on the first structural
/// violation. Records come back in document order.
pub fn parse(data: &str) -> Result<Vec<WatchedStock>, WatchlistError> {
    let value: Value = serde_json::from_str(data)
        .map_err(|e| WatchlistError::MalformedImportData(format!("not valid JSON: {}", e)))?;

    let items = match value {
        Value::Array(items) => items,
        other => {
            return Err(WatchlistError::MalformedImportData(format!(
                "expected a JSON array, found {}",
                kind_of(&other)
            )));
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            if !item.is_object() {
                return Err(WatchlistError::MalformedImportData(format!(
                    "record {} is {}, expected an object",
                    index,
                    kind_of(&item)
                )));
            }
            serde_json::from_value::<ImportRecord>(item)
                .map(WatchedStock::from)
                .map_err(|e| WatchlistError::MalformedImportData(format!("record {}: {}", index, e)))
        })
        .collect()
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
