//! In-memory [`WindowStore`].

use kline_types::{RawTicker, Window};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::row::{WindowRow, narrow_window};
use crate::schema::{archived_epoch, validate_table_name};
use crate::{Result, StoreError, WindowStore};

#[derive(Debug)]
enum Table {
    Raw(Vec<RawTicker>),
    Window(Vec<WindowRow>),
}

/// A [`WindowStore`] that keeps every table in memory.
///
/// Used for dry runs and tests. Writes are all-or-nothing like the SQL
/// store: rows are narrowed before any of them is appended.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<HashMap<String, Table>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, Table>>> {
        self.tables.lock().map_err(|_| StoreError::Poisoned)
    }

    /// Returns a copy of every row of a resolution table.
    ///
    /// # Errors
    ///
    /// Returns an error if the table was not created as a resolution table.
    pub fn window_rows(&self, table: &str) -> Result<Vec<WindowRow>> {
        match self.lock()?.get(table) {
            Some(Table::Window(rows)) => Ok(rows.clone()),
            _ => Err(StoreError::NoSuchTable(table.to_string())),
        }
    }

    /// Returns a copy of every row of a raw archive table.
    ///
    /// # Errors
    ///
    /// Returns an error if the table was not created as a raw table.
    pub fn raw_rows(&self, table: &str) -> Result<Vec<RawTicker>> {
        match self.lock()?.get(table) {
            Some(Table::Raw(rows)) => Ok(rows.clone()),
            _ => Err(StoreError::NoSuchTable(table.to_string())),
        }
    }

    /// Returns the names of every created table, sorted.
    ///
    /// # Errors
    ///
    /// Returns an error if the store lock is poisoned.
    pub fn table_names(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self.lock()?.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    fn with_window_table<T>(
        &self,
        table: &str,
        f: impl FnOnce(&mut Vec<WindowRow>) -> T,
    ) -> Result<T> {
        match self.lock()?.get_mut(table) {
            Some(Table::Window(rows)) => Ok(f(rows)),
            _ => Err(StoreError::NoSuchTable(table.to_string())),
        }
    }

    fn with_raw_table<T>(
        &self,
        table: &str,
        f: impl FnOnce(&mut Vec<RawTicker>) -> T,
    ) -> Result<T> {
        match self.lock()?.get_mut(table) {
            Some(Table::Raw(rows)) => Ok(f(rows)),
            _ => Err(StoreError::NoSuchTable(table.to_string())),
        }
    }
}

impl WindowStore for MemoryStore {
    fn create_raw_table(&self, name: &str) -> Result<()> {
        validate_table_name(name)?;
        self.lock()?
            .entry(name.to_string())
            .or_insert_with(|| Table::Raw(Vec::new()));
        Ok(())
    }

    fn create_resolution_table(&self, name: &str) -> Result<()> {
        validate_table_name(name)?;
        self.lock()?
            .entry(name.to_string())
            .or_insert_with(|| Table::Window(Vec::new()));
        Ok(())
    }

    fn bulk_insert(&self, table: &str, group: &str, window: &Window) -> Result<()> {
        let rows = narrow_window(window, group)?;
        self.with_window_table(table, |stored| stored.extend(rows))
    }

    fn upsert_current(&self, table: &str, tag: &str, window: &Window) -> Result<()> {
        let rows = narrow_window(window, tag)?;
        self.with_window_table(table, |stored| {
            stored.retain(|row| row.group != tag);
            stored.extend(rows);
        })
    }

    fn archive_raw(&self, table: &str, tickers: &[RawTicker]) -> Result<()> {
        self.with_raw_table(table, |stored| stored.extend_from_slice(tickers))
    }

    fn delete_older_than(&self, table: &str, cutoff: i64) -> Result<usize> {
        self.with_raw_table(table, |stored| {
            let before = stored.len();
            stored.retain(|t| {
                !t.last_updated
                    .as_deref()
                    .and_then(archived_epoch)
                    .is_some_and(|v| v < cutoff)
            });
            before - stored.len()
        })
    }
}
