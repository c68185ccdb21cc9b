//! SQLite-backed [`WindowStore`].

use kline_types::{RawTicker, Window};
use rusqlite::{Connection, Row, params};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

use crate::row::{NarrowBand, WindowRow};
use crate::schema::{
    RAW_COLUMNS, WINDOW_COLUMNS, expired_raw_sql, insert_sql, raw_table_ddl,
    resolution_table_ddl, validate_table_name,
};
use crate::{Result, StoreError, WindowStore};

/// A [`WindowStore`] on a single SQLite connection.
///
/// The connection runs in WAL mode so readers are never blocked by the
/// pipeline's writes. Writes are serialized through a mutex.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Opens (or creates) the database at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or configured.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|source| StoreError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        info!(path = %path.display(), "opened sqlite store");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Opens a private in-memory database.
    ///
    /// # Errors
    ///
    /// Returns an error if SQLite cannot allocate the database.
    pub fn open_in_memory() -> Result<Self> {
        Ok(Self {
            conn: Mutex::new(Connection::open_in_memory()?),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }

    /// Reads every row of a resolution table in insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error if the table does not exist or a row is malformed.
    pub fn window_rows(&self, table: &str) -> Result<Vec<WindowRow>> {
        validate_table_name(table)?;
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM {table} ORDER BY id",
            WINDOW_COLUMNS.join(", ")
        ))?;
        let rows = stmt
            .query_map([], read_window_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// Reads every row of the raw archive table in insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error if the table does not exist.
    pub fn raw_rows(&self, table: &str) -> Result<Vec<RawTicker>> {
        validate_table_name(table)?;
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM {table} ORDER BY id",
            RAW_COLUMNS.join(", ")
        ))?;
        let rows = stmt
            .query_map([], read_raw_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    fn insert_rows(
        &self,
        table: &str,
        delete_tag: Option<&str>,
        group: &str,
        window: &Window,
    ) -> Result<()> {
        validate_table_name(table)?;
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        if let Some(tag) = delete_tag {
            let removed = tx.execute(&format!("DELETE FROM {table} WHERE _group = ?1"), [tag])?;
            debug!(table, tag, removed, "cleared current view");
        }
        {
            let mut stmt = tx.prepare(&insert_sql(table, &WINDOW_COLUMNS))?;
            for record in window.records() {
                let row = WindowRow::from_record(record, window.timestamp, group)?;
                stmt.execute(params![
                    row.asset_id,
                    row.name,
                    row.symbol,
                    row.rank,
                    row.usd.first,
                    row.usd.last,
                    row.usd.low,
                    row.usd.high,
                    row.btc.first,
                    row.btc.last,
                    row.btc.low,
                    row.btc.high,
                    row.cny.first,
                    row.cny.last,
                    row.cny.low,
                    row.cny.high,
                    row.last_updated,
                    row.timestamp,
                    row.group,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }
}

impl WindowStore for SqliteStore {
    fn create_raw_table(&self, name: &str) -> Result<()> {
        validate_table_name(name)?;
        self.lock()?.execute_batch(&raw_table_ddl(name))?;
        debug!(table = name, "raw table ready");
        Ok(())
    }

    fn create_resolution_table(&self, name: &str) -> Result<()> {
        validate_table_name(name)?;
        self.lock()?.execute_batch(&resolution_table_ddl(name))?;
        debug!(table = name, "resolution table ready");
        Ok(())
    }

    fn bulk_insert(&self, table: &str, group: &str, window: &Window) -> Result<()> {
        self.insert_rows(table, None, group, window)
    }

    fn upsert_current(&self, table: &str, tag: &str, window: &Window) -> Result<()> {
        self.insert_rows(table, Some(tag), tag, window)
    }

    fn archive_raw(&self, table: &str, tickers: &[RawTicker]) -> Result<()> {
        validate_table_name(table)?;
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(&insert_sql(table, &RAW_COLUMNS))?;
            for t in tickers {
                stmt.execute(params![
                    t.id,
                    t.name,
                    t.symbol,
                    t.rank,
                    t.price_usd,
                    t.price_btc,
                    t.volume_usd_24h,
                    t.market_cap_usd,
                    t.available_supply,
                    t.total_supply,
                    t.percent_change_1h,
                    t.percent_change_24h,
                    t.percent_change_7d,
                    t.last_updated,
                    t.price_cny,
                    t.volume_cny_24h,
                    t.market_cap_cny,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn delete_older_than(&self, table: &str, cutoff: i64) -> Result<usize> {
        validate_table_name(table)?;
        let removed = self.lock()?.execute(&expired_raw_sql(table), [cutoff])?;
        Ok(removed)
    }
}

fn read_band(row: &Row<'_>, offset: usize) -> rusqlite::Result<NarrowBand> {
    Ok(NarrowBand {
        first: row.get(offset)?,
        last: row.get(offset + 1)?,
        low: row.get(offset + 2)?,
        high: row.get(offset + 3)?,
    })
}

fn read_window_row(row: &Row<'_>) -> rusqlite::Result<WindowRow> {
    Ok(WindowRow {
        asset_id: row.get(0)?,
        name: row.get(1)?,
        symbol: row.get(2)?,
        rank: row.get(3)?,
        usd: read_band(row, 4)?,
        btc: read_band(row, 8)?,
        cny: read_band(row, 12)?,
        last_updated: row.get(16)?,
        timestamp: row.get(17)?,
        group: row.get(18)?,
    })
}

fn read_raw_row(row: &Row<'_>) -> rusqlite::Result<RawTicker> {
    Ok(RawTicker {
        id: row.get::<_, Option<String>>(0)?.unwrap_or_default(),
        name: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
        symbol: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
        rank: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
        price_usd: row.get(4)?,
        price_btc: row.get(5)?,
        volume_usd_24h: row.get(6)?,
        market_cap_usd: row.get(7)?,
        available_supply: row.get(8)?,
        total_supply: row.get(9)?,
        percent_change_1h: row.get(10)?,
        percent_change_24h: row.get(11)?,
        percent_change_7d: row.get(12)?,
        last_updated: row.get(13)?,
        price_cny: row.get(14)?,
        volume_cny_24h: row.get(15)?,
        market_cap_cny: row.get(16)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use kline_types::{PriceBand, TickerRecord};
    use rust_decimal::Decimal;
    use tempfile::tempdir;

    fn record(symbol: &str, usd: i64) -> TickerRecord {
        TickerRecord {
            asset_id: symbol.to_lowercase(),
            name: symbol.to_string(),
            symbol: symbol.to_string(),
            rank: 1,
            usd: PriceBand {
                first: Decimal::from(usd),
                last: Decimal::from(usd + 20),
                low: Decimal::from(usd - 5),
                high: Decimal::from(usd + 30),
            },
            btc: PriceBand::flat(Decimal::ONE),
            cny: PriceBand::flat(Decimal::from(usd * 7)),
            last_updated: 1_705_320_000,
        }
    }

    fn window(timestamp: i64, symbols: &[(&str, i64)]) -> Window {
        symbols
            .iter()
            .map(|(s, usd)| record(s, *usd))
            .collect::<Window>()
            .with_timestamp(timestamp)
    }

    fn raw(symbol: &str, last_updated: Option<&str>) -> RawTicker {
        RawTicker {
            id: symbol.to_lowercase(),
            name: symbol.to_string(),
            symbol: symbol.to_string(),
            rank: "1".to_string(),
            price_usd: Some("100.123456789".to_string()),
            last_updated: last_updated.map(str::to_string),
            ..RawTicker::default()
        }
    }

    #[test]
    fn test_provisioning_is_idempotent() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.create_resolution_table("coinmarketcapmin").unwrap();
        store.create_resolution_table("coinmarketcapmin").unwrap();
        store.create_raw_table("pricecoinmarketcap").unwrap();
        store.create_raw_table("pricecoinmarketcap").unwrap();
    }

    #[test]
    fn test_rejects_bad_table_name() {
        let store = SqliteStore::open_in_memory().unwrap();
        let err = store.create_resolution_table("x; DROP TABLE y").unwrap_err();
        assert!(matches!(err, StoreError::InvalidTableName(_)));
    }

    #[test]
    fn test_bulk_insert_round_trip() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.create_resolution_table("coinmarketcapmin").unwrap();
        store
            .bulk_insert("coinmarketcapmin", "", &window(60, &[("BTC", 100), ("ETH", 50)]))
            .unwrap();

        let rows = store.window_rows("coinmarketcapmin").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].symbol, "BTC");
        assert_eq!(rows[0].timestamp, 60);
        assert_eq!(rows[0].group, "");
        assert_relative_eq!(rows[0].usd.first, 100.0);
        assert_relative_eq!(rows[0].usd.last, 120.0);
        assert_relative_eq!(rows[0].usd.low, 95.0);
        assert_relative_eq!(rows[0].usd.high, 130.0);
        assert_relative_eq!(rows[1].cny.high, 350.0);
    }

    #[test]
    fn test_bulk_insert_missing_table_rolls_back() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert!(store.bulk_insert("nope", "", &window(60, &[("BTC", 1)])).is_err());
    }

    #[test]
    fn test_upsert_current_replaces_only_tag() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.create_resolution_table("coinmarketcapcurrent").unwrap();

        store
            .upsert_current("coinmarketcapcurrent", "other", &window(1, &[("XRP", 1)]))
            .unwrap();
        store
            .upsert_current("coinmarketcapcurrent", "live", &window(1, &[("BTC", 100), ("ETH", 50)]))
            .unwrap();
        store
            .upsert_current("coinmarketcapcurrent", "live", &window(2, &[("BTC", 110)]))
            .unwrap();

        let rows = store.window_rows("coinmarketcapcurrent").unwrap();
        let live: Vec<_> = rows.iter().filter(|r| r.group == "live").collect();
        assert_eq!(live.len(), 1);
        assert_eq!(live[0].symbol, "BTC");
        assert_eq!(live[0].timestamp, 2);
        assert!(rows.iter().any(|r| r.group == "other" && r.symbol == "XRP"));
    }

    #[test]
    fn test_archive_and_retention() {
        let dir = tempdir().unwrap();
        let store = SqliteStore::open(dir.path().join("kline.db")).unwrap();
        store.create_raw_table("pricecoinmarketcap").unwrap();
        store
            .archive_raw(
                "pricecoinmarketcap",
                &[
                    raw("OLD", Some("1000")),
                    raw("NEW", Some("5000")),
                    raw("NUL", None),
                ],
            )
            .unwrap();

        let rows = store.raw_rows("pricecoinmarketcap").unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].price_usd.as_deref(), Some("100.123456789"));
        assert_eq!(rows[2].last_updated, None);

        let removed = store.delete_older_than("pricecoinmarketcap", 2000).unwrap();
        assert_eq!(removed, 1);
        let left: Vec<_> = store
            .raw_rows("pricecoinmarketcap")
            .unwrap()
            .into_iter()
            .map(|t| t.symbol)
            .collect();
        assert_eq!(left, vec!["NEW", "NUL"]);
    }

    #[test]
    fn test_retention_skips_non_integer_timestamps() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.create_raw_table("pricecoinmarketcap").unwrap();
        store
            .archive_raw(
                "pricecoinmarketcap",
                &[
                    raw("FRAC", Some("1000.5")),
                    raw("JUNK", Some("12abc")),
                    raw("NEG", Some("-5")),
                    raw("EMPTY", Some("")),
                    raw("OLD", Some("1000")),
                ],
            )
            .unwrap();

        assert_eq!(store.delete_older_than("pricecoinmarketcap", 2000).unwrap(), 1);
        let left: Vec<_> = store
            .raw_rows("pricecoinmarketcap")
            .unwrap()
            .into_iter()
            .map(|t| t.symbol)
            .collect();
        assert_eq!(left, vec!["FRAC", "JUNK", "NEG", "EMPTY"]);
    }

    #[test]
    fn test_reopen_keeps_rows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("kline.db");
        {
            let store = SqliteStore::open(&path).unwrap();
            store.create_resolution_table("coinmarketcapday").unwrap();
            store
                .bulk_insert("coinmarketcapday", "", &window(86_400, &[("BTC", 100)]))
                .unwrap();
        }
        let store = SqliteStore::open(&path).unwrap();
        store.create_resolution_table("coinmarketcapday").unwrap();
        assert_eq!(store.window_rows("coinmarketcapday").unwrap().len(), 1);
    }
}
