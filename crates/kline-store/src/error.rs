//! Error types for storage operations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading or writing the store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to open the database file.
    #[error("Failed to open database '{path}': {source}")]
    Open {
        /// The database path.
        path: PathBuf,
        /// The underlying SQLite error.
        source: rusqlite::Error,
    },

    /// A statement or transaction failed.
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A decimal price could not be represented as `f64`.
    #[error("Cannot store {field} of '{symbol}' as a float: {value}")]
    Narrowing {
        /// Symbol of the offending row.
        symbol: String,
        /// Column that failed to narrow.
        field: &'static str,
        /// The decimal value.
        value: String,
    },

    /// A table name is not a plain SQL identifier.
    #[error("Invalid table name: '{0}'")]
    InvalidTableName(String),

    /// The table has not been created.
    #[error("No such table: '{0}'")]
    NoSuchTable(String),

    /// Another thread panicked while holding the store lock.
    #[error("Store lock poisoned")]
    Poisoned,
}

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;
