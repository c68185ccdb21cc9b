//! Table definitions.

use crate::{Result, StoreError};

/// Columns of the raw archive table, in insert order.
pub(crate) const RAW_COLUMNS: [&str; 17] = [
    "asset_id",
    "name",
    "symbol",
    "rank",
    "price_usd",
    "price_btc",
    "volume_usd_24h",
    "market_cap_usd",
    "available_supply",
    "total_supply",
    "percent_change_1h",
    "percent_change_24h",
    "percent_change_7d",
    "last_updated",
    "price_cny",
    "volume_cny_24h",
    "market_cap_cny",
];

/// Columns of resolution tables, in insert order.
pub(crate) const WINDOW_COLUMNS: [&str; 19] = [
    "asset_id",
    "name",
    "symbol",
    "rank",
    "price_usd_first",
    "price_usd_last",
    "price_usd_low",
    "price_usd_high",
    "price_btc_first",
    "price_btc_last",
    "price_btc_low",
    "price_btc_high",
    "price_cny_first",
    "price_cny_last",
    "price_cny_low",
    "price_cny_high",
    "last_updated",
    "timestamp",
    "_group",
];

/// Checks that `name` is safe to interpolate into SQL as a table name.
///
/// Accepts ASCII letters, digits and underscores, not starting with a digit.
///
/// # Errors
///
/// Returns [`StoreError::InvalidTableName`] otherwise.
pub fn validate_table_name(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        && name.len() <= 63;
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidTableName(name.to_string()))
    }
}

pub(crate) fn raw_table_ddl(name: &str) -> String {
    let columns = RAW_COLUMNS
        .iter()
        .map(|c| format!("    {c} TEXT"))
        .collect::<Vec<_>>()
        .join(",\n");
    format!(
        "CREATE TABLE IF NOT EXISTS {name} (\n    id INTEGER PRIMARY KEY AUTOINCREMENT,\n{columns}\n);"
    )
}

pub(crate) fn resolution_table_ddl(name: &str) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {name} (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    asset_id TEXT,
    name TEXT,
    symbol TEXT,
    rank INTEGER,
    price_usd_first REAL,
    price_usd_last REAL,
    price_usd_low REAL,
    price_usd_high REAL,
    price_btc_first REAL,
    price_btc_last REAL,
    price_btc_low REAL,
    price_btc_high REAL,
    price_cny_first REAL,
    price_cny_last REAL,
    price_cny_low REAL,
    price_cny_high REAL,
    last_updated INTEGER,
    timestamp INTEGER,
    _group TEXT
);
CREATE INDEX IF NOT EXISTS {name}_timestamp_idx ON {name} (timestamp);
CREATE INDEX IF NOT EXISTS {name}_last_updated_idx ON {name} (last_updated);
CREATE INDEX IF NOT EXISTS {name}_symbol_idx ON {name} (symbol);"
    )
}

/// Raw rows count as expired only when `last_updated` is a plain run of ASCII
/// digits below the cutoff. [`archived_epoch`] is the in-memory twin.
pub(crate) fn expired_raw_sql(table: &str) -> String {
    format!(
        "DELETE FROM {table} WHERE last_updated <> '' \
         AND last_updated NOT GLOB '*[^0-9]*' \
         AND CAST(last_updated AS INTEGER) < ?1"
    )
}

/// Reads an archived `last_updated` value as epoch seconds.
pub(crate) fn archived_epoch(value: &str) -> Option<i64> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse().ok()
}

pub(crate) fn insert_sql(table: &str, columns: &[&str]) -> String {
    let placeholders = (1..=columns.len())
        .map(|i| format!("?{i}"))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "INSERT INTO {table} ({}) VALUES ({placeholders})",
        columns.join(", ")
    )
}
