//! Raw-archive writer task.

use kline_types::RawTicker;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::blocking::{SharedStore, with_store};

/// Appends each polled batch to the raw archive table, one batch at a time.
///
/// The queue in front of the worker is bounded, so when storage is slow the
/// poll loop waits instead of piling up writes.
#[derive(Debug)]
pub struct ArchiveWorker {
    inbound: mpsc::Receiver<Vec<RawTicker>>,
    store: SharedStore,
    table: String,
}

impl ArchiveWorker {
    /// Creates a worker writing into `table`.
    #[must_use]
    pub const fn new(
        inbound: mpsc::Receiver<Vec<RawTicker>>,
        store: SharedStore,
        table: String,
    ) -> Self {
        Self {
            inbound,
            store,
            table,
        }
    }

    /// Runs until the inbound channel closes.
    pub async fn run(mut self) {
        info!(table = %self.table, "raw archive worker started");
        while let Some(batch) = self.inbound.recv().await {
            let rows = batch.len();
            let table = self.table.clone();
            let result = with_store(&self.store, move |store| {
                store.archive_raw(&table, &batch)
            })
            .await;
            match result {
                Ok(()) => debug!(table = %self.table, rows, "raw poll archived"),
                Err(e) => error!(table = %self.table, rows, error = %e, "failed to archive raw poll"),
            }
        }
        info!(table = %self.table, "raw archive inbound closed, stopping");
    }
}
