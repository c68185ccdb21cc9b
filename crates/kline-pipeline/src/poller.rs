//! The poll loop.

use kline_aggregate::Clock;
use kline_fetch::build_window;
use kline_types::{RawTicker, Window};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, error, info, warn};

use crate::TickerSource;

/// Outcome of one poll cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// The poll produced a window and it was sent on.
    Sent {
        /// Symbols in the window.
        symbols: usize,
        /// Raw rows handed to the archive.
        raw: usize,
    },
    /// The fetch failed; nothing entered the pipeline.
    FetchFailed,
    /// The poll decoded but no ticker converted; only the raw rows were kept.
    Empty,
    /// A downstream channel is closed.
    Closed,
}

/// Polls a [`TickerSource`] and feeds the pipeline.
///
/// Each successful poll becomes one window sent to the base aggregator and
/// the real-time updater, and one raw batch for the archive worker.
#[derive(Debug)]
pub struct Poller<S> {
    source: S,
    base: mpsc::Sender<Window>,
    realtime: mpsc::Sender<Window>,
    archive: mpsc::Sender<Vec<RawTicker>>,
    every: Duration,
    clock: Arc<dyn Clock>,
}

impl<S: TickerSource> Poller<S> {
    /// Creates a poller feeding the given channels every `every`.
    #[must_use]
    pub const fn new(
        source: S,
        base: mpsc::Sender<Window>,
        realtime: mpsc::Sender<Window>,
        archive: mpsc::Sender<Vec<RawTicker>>,
        every: Duration,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            source,
            base,
            realtime,
            archive,
            every,
            clock,
        }
    }

    /// Runs one poll cycle.
    pub async fn poll_once(&self) -> PollOutcome {
        let now = self.clock.now();
        let started = std::time::Instant::now();
        let tickers = match self.source.fetch(now).await {
            Ok(tickers) => tickers,
            Err(e) => {
                error!(error = %e, "poll failed, skipping cycle");
                return PollOutcome::FetchFailed;
            }
        };
        debug!(
            rows = tickers.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "poll fetched"
        );

        let window = build_window(&tickers, now.timestamp());
        let symbols = window.len();
        let raw = tickers.len();

        let outcome = if window.is_empty() {
            warn!(rows = raw, "poll produced no usable tickers");
            PollOutcome::Empty
        } else if self.base.send(window.clone()).await.is_err()
            || self.realtime.send(window).await.is_err()
        {
            warn!("pipeline channel closed, dropping poll");
            return PollOutcome::Closed;
        } else {
            PollOutcome::Sent { symbols, raw }
        };

        if self.archive.send(tickers).await.is_err() {
            warn!("archive channel closed, dropping raw poll");
            return PollOutcome::Closed;
        }
        outcome
    }

    /// Polls forever, or until a downstream channel closes.
    pub async fn run(self) {
        info!(every_secs = self.every.as_secs(), "poller started");
        let mut ticker = interval(self.every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            if self.poll_once().await == PollOutcome::Closed {
                break;
            }
        }
        info!("poller stopping");
    }
}
