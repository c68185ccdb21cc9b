//! Resolution aggregator task.

use futures::future::join_all;
use kline_aggregate::{Clock, GRACE_PERIOD, ResolutionAggregator, TICK_INTERVAL};
use kline_types::{Resolution, Window};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::{MissedTickBehavior, interval, timeout};
use tracing::{debug, error, info, warn};

use crate::blocking::{SharedStore, with_store};

/// Drives one [`ResolutionAggregator`] from a timer and an inbound channel.
///
/// On every boundary the finalized window is first sent (as an independent
/// copy) to each downstream target and then persisted.
#[derive(Debug)]
pub struct AggregatorRunner {
    aggregator: ResolutionAggregator,
    inbound: mpsc::Receiver<Window>,
    targets: Vec<mpsc::Sender<Window>>,
    store: SharedStore,
    table: String,
    clock: Arc<dyn Clock>,
}

impl AggregatorRunner {
    /// Creates a runner that persists into `table`.
    #[must_use]
    pub const fn new(
        aggregator: ResolutionAggregator,
        inbound: mpsc::Receiver<Window>,
        store: SharedStore,
        table: String,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            aggregator,
            inbound,
            targets: Vec::new(),
            store,
            table,
            clock,
        }
    }

    /// Adds downstream targets for finalized windows.
    #[must_use]
    pub fn with_targets(mut self, targets: Vec<mpsc::Sender<Window>>) -> Self {
        self.targets = targets;
        self
    }

    /// Returns the resolution this runner aggregates.
    #[must_use]
    pub const fn resolution(&self) -> Resolution {
        self.aggregator.resolution()
    }

    /// Runs until the inbound channel closes.
    pub async fn run(mut self) {
        let resolution = self.aggregator.resolution();
        info!(
            %resolution,
            table = %self.table,
            next_boundary = self.aggregator.next_boundary(),
            targets = self.targets.len(),
            "aggregator started"
        );

        let mut ticker = interval(TICK_INTERVAL);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => self.on_tick().await,
                received = self.inbound.recv() => match received {
                    Some(window) => self.aggregator.ingest(window),
                    None => break,
                },
            }
        }

        info!(%resolution, "aggregator inbound closed, stopping");
    }

    async fn on_tick(&mut self) {
        let Some(crossed) = self.aggregator.poll_boundary(self.clock.timestamp()) else {
            return;
        };

        // One bounded read so a poll racing the boundary still lands.
        if let Ok(Some(window)) = timeout(GRACE_PERIOD, self.inbound.recv()).await {
            self.aggregator.ingest(window);
        }

        let resolution = self.aggregator.resolution();
        let Some(window) = self.aggregator.finalize(crossed) else {
            debug!(%resolution, boundary = crossed, "empty slot, nothing to emit");
            return;
        };

        info!(
            %resolution,
            timestamp = window.timestamp,
            rows = window.len(),
            "window finalized"
        );
        self.fan_out(&window).await;
        self.persist(window).await;
    }

    async fn fan_out(&self, window: &Window) {
        if self.targets.is_empty() {
            return;
        }
        let sends = self
            .targets
            .iter()
            .map(|target| target.send(window.clone()));
        let closed = join_all(sends)
            .await
            .into_iter()
            .filter(Result::is_err)
            .count();
        if closed > 0 {
            warn!(resolution = %self.aggregator.resolution(), closed, "downstream channel closed");
        }
    }

    async fn persist(&self, window: Window) {
        let resolution = self.aggregator.resolution();
        let table = self.table.clone();
        let rows = window.len();
        let started = std::time::Instant::now();
        let result = with_store(&self.store, move |store| {
            store.bulk_insert(&table, "", &window)
        })
        .await;
        match result {
            Ok(()) => debug!(
                %resolution,
                table = %self.table,
                rows,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "window persisted"
            ),
            Err(e) => error!(%resolution, table = %self.table, error = %e, "failed to persist window"),
        }
    }
}
