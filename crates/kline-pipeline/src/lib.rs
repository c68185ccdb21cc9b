//! Tokio runtime for the kline aggregation pipeline.
//!
//! - [`Dispatcher`] - Provisions tables and spawns every task
//! - [`AggregatorRunner`] - One resolution's accumulate/finalize loop
//! - [`RealtimeUpdater`] - Live current-period view
//! - [`RetentionSweep`] - Deletes expired raw rows
//! - [`ArchiveWorker`] - Appends raw polls to the archive
//! - [`Poller`] - Fetches snapshots and feeds the pipeline

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/kline/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod archive;
mod blocking;
mod config;
mod dispatcher;
mod error;
mod poller;
mod realtime;
mod retention;
mod runner;
mod source;

pub use archive::ArchiveWorker;
pub use blocking::SharedStore;
pub use config::PipelineConfig;
pub use dispatcher::{Dispatcher, PipelineHandle};
pub use error::{PipelineError, Result};
pub use poller::{PollOutcome, Poller};
pub use realtime::RealtimeUpdater;
pub use retention::RetentionSweep;
pub use runner::AggregatorRunner;
pub use source::TickerSource;

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::{DateTime, TimeZone, Utc};
    use kline_types::{PriceBand, TickerRecord, Window};
    use rust_decimal::Decimal;
    use std::time::Duration;

    /// 2024-01-17 12:01:00 UTC, a minute boundary that is not a five-minute one.
    pub(crate) fn minute_boundary() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 17, 12, 1, 0).unwrap()
    }

    pub(crate) fn btc(usd: i64) -> Window {
        let mut window = Window::new(0);
        window.insert(TickerRecord {
            asset_id: "bitcoin".to_string(),
            name: "Bitcoin".to_string(),
            symbol: "BTC".to_string(),
            rank: 1,
            usd: PriceBand::flat(Decimal::from(usd)),
            btc: PriceBand::flat(Decimal::ONE),
            cny: PriceBand::flat(Decimal::from(usd * 7)),
            last_updated: 1_705_320_000,
        });
        window
    }

    /// Spins until `done` holds, letting blocking-pool store calls finish.
    pub(crate) async fn wait_for(mut done: impl FnMut() -> bool) {
        for _ in 0..2_000 {
            if done() {
                return;
            }
            std::thread::sleep(Duration::from_millis(1));
            tokio::task::yield_now().await;
        }
        panic!("condition not reached");
    }
}
