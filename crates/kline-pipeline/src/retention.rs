//! Raw-archive retention sweep.

use kline_aggregate::Clock;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{error, info};

use crate::blocking::{SharedStore, with_store};

/// Periodically deletes raw rows older than the retention window.
///
/// Only the raw archive table is swept; resolution tables are kept.
#[derive(Debug)]
pub struct RetentionSweep {
    store: SharedStore,
    table: String,
    retention: Duration,
    every: Duration,
    clock: Arc<dyn Clock>,
}

impl RetentionSweep {
    /// Creates a sweep over `table`, first running one `every` from now.
    #[must_use]
    pub const fn new(
        store: SharedStore,
        table: String,
        retention: Duration,
        every: Duration,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            table,
            retention,
            every,
            clock,
        }
    }

    /// Deletes expired rows once and returns how many were removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub async fn sweep(&self) -> crate::Result<usize> {
        let retention = i64::try_from(self.retention.as_secs()).unwrap_or(i64::MAX);
        let cutoff = self.clock.timestamp().saturating_sub(retention);
        let table = self.table.clone();
        with_store(&self.store, move |store| {
            store.delete_older_than(&table, cutoff)
        })
        .await
    }

    /// Runs forever.
    pub async fn run(self) {
        info!(
            table = %self.table,
            retention_secs = self.retention.as_secs(),
            every_secs = self.every.as_secs(),
            "retention sweep started"
        );
        let mut ticker = interval_at(Instant::now() + self.every, self.every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            match self.sweep().await {
                Ok(removed) => info!(table = %self.table, removed, "retention sweep done"),
                Err(e) => error!(table = %self.table, error = %e, "retention sweep failed"),
            }
        }
    }
}
