//! Real-time view updater task.

use kline_aggregate::{Clock, RealtimeView, TICK_INTERVAL};
use kline_types::Window;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, error, info};

use crate::blocking::{SharedStore, with_store};

/// Keeps the current-view table in sync with a [`RealtimeView`].
///
/// Every inbound window updates the view and the whole aggregate is written
/// back under the view's tag. A one-second timer drives the view's rollover
/// and reset clocks.
#[derive(Debug)]
pub struct RealtimeUpdater {
    view: RealtimeView,
    inbound: mpsc::Receiver<Window>,
    store: SharedStore,
    table: String,
    tag: String,
    clock: Arc<dyn Clock>,
}

impl RealtimeUpdater {
    /// Creates an updater writing rows tagged `tag` into `table`.
    #[must_use]
    pub const fn new(
        view: RealtimeView,
        inbound: mpsc::Receiver<Window>,
        store: SharedStore,
        table: String,
        tag: String,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            view,
            inbound,
            store,
            table,
            tag,
            clock,
        }
    }

    /// Runs until the inbound channel closes.
    pub async fn run(mut self) {
        info!(table = %self.table, tag = %self.tag, "real-time updater started");

        let mut ticker = interval(TICK_INTERVAL);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let outcome = self.view.tick(self.clock.timestamp());
                    if outcome.rolled_over {
                        debug!(tag = %self.tag, "real-time view rolled over");
                    }
                    if outcome.reset {
                        info!(tag = %self.tag, next_reset = self.view.reset_at(), "real-time view reset");
                    }
                }
                received = self.inbound.recv() => match received {
                    Some(window) => self.update(window).await,
                    None => break,
                },
            }
        }

        info!(tag = %self.tag, "real-time inbound closed, stopping");
    }

    async fn update(&mut self, window: Window) {
        let current = self.view.ingest(window).clone();
        let rows = current.len();
        let (table, tag) = (self.table.clone(), self.tag.clone());
        let result = with_store(&self.store, move |store| {
            store.upsert_current(&table, &tag, &current)
        })
        .await;
        match result {
            Ok(()) => debug!(tag = %self.tag, rows, "real-time view stored"),
            Err(e) => error!(table = %self.table, tag = %self.tag, error = %e, "failed to store real-time view"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{btc, minute_boundary, wait_for};
    use chrono::TimeDelta;
    use kline_aggregate::ManualClock;
    use kline_store::{MemoryStore, WindowStore};
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_rollover_then_lower_price() {
        let start = minute_boundary();
        let clock = ManualClock::new(start);
        let store = Arc::new(MemoryStore::new());
        store.create_resolution_table("coinmarketcapcurrent").unwrap();

        let (tx, rx) = mpsc::channel(8);
        let updater = RealtimeUpdater::new(
            RealtimeView::new(start, 10),
            rx,
            store.clone(),
            "coinmarketcapcurrent".to_string(),
            "pricecoinmarketcap".to_string(),
            Arc::new(clock.clone()),
        );
        tokio::spawn(updater.run());

        tx.send(btc(100)).await.unwrap();
        let rows_store = store.clone();
        wait_for(move || {
            rows_store
                .window_rows("coinmarketcapcurrent")
                .is_ok_and(|rows| rows.len() == 1)
        })
        .await;

        // Let the sub-period boundary pass.
        clock.advance(TimeDelta::seconds(11));
        tokio::time::sleep(Duration::from_secs(2)).await;

        tx.send(btc(90)).await.unwrap();
        let rows_store = store.clone();
        wait_for(move || {
            rows_store
                .window_rows("coinmarketcapcurrent")
                .is_ok_and(|rows| rows.first().is_some_and(|r| r.usd.last == 90.0))
        })
        .await;

        let rows = store.window_rows("coinmarketcapcurrent").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].group, "pricecoinmarketcap");
        assert_eq!(rows[0].usd.low, 90.0);
        assert_eq!(rows[0].usd.high, 100.0);
    }
}
