//! Where polls come from.

use chrono::{DateTime, Utc};
use kline_fetch::{FetchError, TickerClient};
use kline_types::RawTicker;
use std::future::Future;

/// A source of full ticker lists, one call per poll.
pub trait TickerSource: Send + Sync + 'static {
    /// Fetches every ticker for a poll taken at `at`.
    fn fetch(
        &self,
        at: DateTime<Utc>,
    ) -> impl Future<Output = Result<Vec<RawTicker>, FetchError>> + Send;
}

impl TickerSource for TickerClient {
    fn fetch(
        &self,
        at: DateTime<Utc>,
    ) -> impl Future<Output = Result<Vec<RawTicker>, FetchError>> + Send {
        Self::fetch(self, at)
    }
}
