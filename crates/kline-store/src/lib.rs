//! Relational persistence for kline windows.
//!
//! - [`WindowStore`] - Operations the pipeline performs against storage
//! - [`SqliteStore`] - SQLite-backed store
//! - [`MemoryStore`] - In-memory store for dry runs and tests
//! - [`WindowRow`] - One stored symbol row with prices narrowed to `f64`

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/kline/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod memory;
mod row;
mod schema;
mod sqlite;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use row::{NarrowBand, WindowRow};
pub use schema::validate_table_name;
pub use sqlite::SqliteStore;

use kline_types::{RawTicker, Window};

/// Storage operations consumed by the pipeline.
///
/// Every method is synchronous; async callers run them on the blocking pool.
/// Each write happens in a single transaction and is all-or-nothing.
pub trait WindowStore: Send + Sync + std::fmt::Debug {
    /// Creates the raw archive table if it does not exist.
    fn create_raw_table(&self, name: &str) -> Result<()>;

    /// Creates a resolution (or current-view) table and its indexes if they
    /// do not exist.
    fn create_resolution_table(&self, name: &str) -> Result<()>;

    /// Appends every symbol row of `window`, labelled with `group`.
    fn bulk_insert(&self, table: &str, group: &str, window: &Window) -> Result<()>;

    /// Replaces every row labelled `tag` in `table` with the rows of `window`.
    ///
    /// Readers never observe a partially replaced tag.
    fn upsert_current(&self, table: &str, tag: &str, window: &Window) -> Result<()>;

    /// Appends raw poll rows with their text fields unmodified.
    fn archive_raw(&self, table: &str, tickers: &[RawTicker]) -> Result<()>;

    /// Deletes raw rows whose source last-update is before `cutoff` (epoch
    /// seconds) and returns how many were removed.
    fn delete_older_than(&self, table: &str, cutoff: i64) -> Result<usize>;
}

impl<S: WindowStore + ?Sized> WindowStore for std::sync::Arc<S> {
    fn create_raw_table(&self, name: &str) -> Result<()> {
        (**self).create_raw_table(name)
    }

    fn create_resolution_table(&self, name: &str) -> Result<()> {
        (**self).create_resolution_table(name)
    }

    fn bulk_insert(&self, table: &str, group: &str, window: &Window) -> Result<()> {
        (**self).bulk_insert(table, group, window)
    }

    fn upsert_current(&self, table: &str, tag: &str, window: &Window) -> Result<()> {
        (**self).upsert_current(table, tag, window)
    }

    fn archive_raw(&self, table: &str, tickers: &[RawTicker]) -> Result<()> {
        (**self).archive_raw(table, tickers)
    }

    fn delete_older_than(&self, table: &str, cutoff: i64) -> Result<usize> {
        (**self).delete_older_than(table, cutoff)
    }
}
