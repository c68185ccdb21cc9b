//! Multi-resolution OHLC aggregation of cryptocurrency ticker snapshots.
//!
//! This is a facade crate that re-exports functionality from the kline
//! workspace crates for convenient access.
//!
//! # Quick Start
//!
//! ```ignore
//! use kline_lib::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store: SharedStore = Arc::new(SqliteStore::open("kline.db")?);
//!     let config = PipelineConfig::default();
//!     let handle = Dispatcher::start(&config, store, Arc::new(SystemClock))?;
//!
//!     let poller = handle.poller(TickerClient::with_defaults()?);
//!     poller.run().await;
//!     Ok(())
//! }
//! ```

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/kline/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export core types
pub use kline_types::*;

// Re-export the aggregation core
pub use kline_aggregate::{
    AggregatorState, Clock, GRACE_PERIOD, ManualClock, RealtimeView, ResolutionAggregator,
    SystemClock, TICK_INTERVAL, TickOutcome, end_of_day, end_of_week, first_boundary, merge_into,
    merged,
};

// Re-export the snapshot source
#[cfg(feature = "fetch")]
pub use kline_fetch::{
    ClientConfig, FetchError, TickerClient, build_window, decode_tickers, url::DEFAULT_BASE_URL,
};

// Re-export persistence
#[cfg(feature = "store")]
pub use kline_store::{MemoryStore, SqliteStore, StoreError, WindowRow, WindowStore};

// Re-export the runtime
#[cfg(feature = "pipeline")]
pub use kline_pipeline::{
    Dispatcher, PipelineConfig, PipelineError, PipelineHandle, PollOutcome, Poller, SharedStore,
    TickerSource,
};

/// Prelude module for convenient imports.
///
/// ```
/// use kline_lib::prelude::*;
/// ```
pub mod prelude {
    pub use kline_types::{Currency, PriceBand, RawTicker, Resolution, Snapshot, TickerRecord, Window};

    pub use kline_aggregate::{Clock, SystemClock, merge_into, merged};

    #[cfg(feature = "fetch")]
    pub use kline_fetch::{ClientConfig, TickerClient, build_window};

    #[cfg(feature = "store")]
    pub use kline_store::{MemoryStore, SqliteStore, WindowStore};

    #[cfg(feature = "pipeline")]
    pub use kline_pipeline::{Dispatcher, PipelineConfig, PipelineHandle, SharedStore};
}
