//! Pipeline wiring.

use kline_aggregate::{Clock, RealtimeView, ResolutionAggregator, first_boundary};
use kline_types::{RawTicker, Resolution, Window};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::info;

use crate::{
    AggregatorRunner, ArchiveWorker, PipelineConfig, PipelineError, Poller, RealtimeUpdater,
    Result, RetentionSweep, SharedStore, TickerSource,
};

/// Starts the pipeline's long-running tasks.
#[derive(Debug)]
pub struct Dispatcher;

impl Dispatcher {
    /// Provisions every table and spawns the aggregators, the real-time
    /// updater, the retention sweep and the raw-archive worker.
    ///
    /// Only the base aggregator is fed directly; it fans each finalized
    /// window out to every coarser aggregator, so all of them resample the
    /// same base windows. Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid configuration or if any table cannot
    /// be created. Both are fatal.
    pub fn start(
        config: &PipelineConfig,
        store: SharedStore,
        clock: Arc<dyn Clock>,
    ) -> Result<PipelineHandle> {
        config.validate()?;
        provision(config, &store)?;

        let now = clock.now();
        let capacity = config.channel_capacity;
        let mut tasks = Vec::new();

        let mut targets = Vec::with_capacity(Resolution::derived().len());
        for &resolution in Resolution::derived() {
            let (tx, rx) = mpsc::channel(capacity);
            targets.push(tx);
            let runner = AggregatorRunner::new(
                ResolutionAggregator::new(resolution, first_boundary(resolution, now)),
                rx,
                Arc::clone(&store),
                config.resolution_table(resolution),
                Arc::clone(&clock),
            );
            tasks.push(tokio::spawn(runner.run()));
        }

        let (base, base_rx) = mpsc::channel(capacity);
        let base_runner = AggregatorRunner::new(
            ResolutionAggregator::new(Resolution::BASE, first_boundary(Resolution::BASE, now)),
            base_rx,
            Arc::clone(&store),
            config.resolution_table(Resolution::BASE),
            Arc::clone(&clock),
        )
        .with_targets(targets);
        tasks.push(tokio::spawn(base_runner.run()));

        let (realtime, realtime_rx) = mpsc::channel(capacity);
        let view_interval = i64::try_from(config.poll_interval.as_secs()).unwrap_or(i64::MAX);
        let updater = RealtimeUpdater::new(
            RealtimeView::new(now, view_interval),
            realtime_rx,
            Arc::clone(&store),
            config.current_table(),
            config.realtime_tag().to_string(),
            Arc::clone(&clock),
        );
        tasks.push(tokio::spawn(updater.run()));

        let (archive, archive_rx) = mpsc::channel(config.archive_capacity);
        let worker = ArchiveWorker::new(archive_rx, Arc::clone(&store), config.raw_table.clone());
        tasks.push(tokio::spawn(worker.run()));

        let sweep = RetentionSweep::new(
            Arc::clone(&store),
            config.raw_table.clone(),
            config.retention,
            config.retention_interval,
            Arc::clone(&clock),
        );
        tasks.push(tokio::spawn(sweep.run()));

        info!(
            aggregators = Resolution::all().len(),
            prefix = %config.table_prefix,
            raw_table = %config.raw_table,
            "pipeline started"
        );

        Ok(PipelineHandle {
            base,
            realtime,
            archive,
            config: config.clone(),
            clock,
            tasks,
        })
    }
}

fn provision(config: &PipelineConfig, store: &SharedStore) -> Result<()> {
    let failed = |table: String| move |source| PipelineError::Provision { table, source };

    store
        .create_raw_table(&config.raw_table)
        .map_err(failed(config.raw_table.clone()))?;
    for &resolution in Resolution::all() {
        let table = config.resolution_table(resolution);
        store
            .create_resolution_table(&table)
            .map_err(failed(table.clone()))?;
    }
    let current = config.current_table();
    store
        .create_resolution_table(&current)
        .map_err(failed(current.clone()))?;
    Ok(())
}

/// Handle to a running pipeline.
#[derive(Debug)]
pub struct PipelineHandle {
    base: mpsc::Sender<Window>,
    realtime: mpsc::Sender<Window>,
    archive: mpsc::Sender<Vec<RawTicker>>,
    config: PipelineConfig,
    clock: Arc<dyn Clock>,
    tasks: Vec<JoinHandle<()>>,
}

impl PipelineHandle {
    /// Sender feeding the base aggregator.
    #[must_use]
    pub const fn base_sender(&self) -> &mpsc::Sender<Window> {
        &self.base
    }

    /// Sender feeding the real-time updater.
    #[must_use]
    pub const fn realtime_sender(&self) -> &mpsc::Sender<Window> {
        &self.realtime
    }

    /// Sender feeding the raw-archive worker.
    #[must_use]
    pub const fn archive_sender(&self) -> &mpsc::Sender<Vec<RawTicker>> {
        &self.archive
    }

    /// Builds a poller over `source` wired to this pipeline.
    #[must_use]
    pub fn poller<S: TickerSource>(&self, source: S) -> Poller<S> {
        Poller::new(
            source,
            self.base.clone(),
            self.realtime.clone(),
            self.archive.clone(),
            self.config.poll_interval,
            Arc::clone(&self.clock),
        )
    }

    /// Number of spawned tasks.
    #[must_use]
    pub const fn task_count(&self) -> usize {
        self.tasks.len()
    }

    /// Aborts every task.
    pub fn abort(&self) {
        for task in &self.tasks {
            task.abort();
        }
    }

    /// Waits for every task to finish.
    ///
    /// Tasks only finish on their own once their inbound channels close;
    /// the retention sweep never does, so this is the service's lifetime.
    ///
    /// # Errors
    ///
    /// Returns the first task panic or cancellation.
    pub async fn join(self) -> Result<()> {
        let Self { tasks, .. } = self;
        for task in tasks {
            task.await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{minute_boundary, wait_for};
    use chrono::{DateTime, TimeDelta, Utc};
    use kline_aggregate::ManualClock;
    use kline_fetch::FetchError;
    use kline_store::MemoryStore;
    use std::time::Duration;

    #[derive(Debug)]
    struct FixedSource;

    impl TickerSource for FixedSource {
        async fn fetch(&self, _at: DateTime<Utc>) -> std::result::Result<Vec<RawTicker>, FetchError> {
            Ok(vec![RawTicker {
                id: "bitcoin".to_string(),
                name: "Bitcoin".to_string(),
                symbol: "BTC".to_string(),
                rank: "1".to_string(),
                price_usd: Some("100".to_string()),
                price_btc: Some("1".to_string()),
                price_cny: Some("700".to_string()),
                last_updated: Some("1705320000".to_string()),
                ..RawTicker::default()
            }])
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_provisions_all_tables() {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::new(minute_boundary()));
        let handle = Dispatcher::start(&PipelineConfig::default(), store.clone(), clock).unwrap();
        assert_eq!(handle.task_count(), 11);

        let names = store.table_names().unwrap();
        assert_eq!(names.len(), 10);
        for table in [
            "pricecoinmarketcap",
            "coinmarketcapmin",
            "coinmarketcap5min",
            "coinmarketcap10min",
            "coinmarketcap15min",
            "coinmarketcap30min",
            "coinmarketcaphour",
            "coinmarketcapday",
            "coinmarketcapweek",
            "coinmarketcapcurrent",
        ] {
            assert!(names.iter().any(|n| n == table), "{table}");
        }
        handle.abort();
    }

    #[tokio::test]
    async fn test_provision_failure_is_fatal() {
        let config = PipelineConfig {
            table_prefix: "bad prefix".to_string(),
            ..PipelineConfig::default()
        };
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let err = Dispatcher::start(&config, Arc::new(MemoryStore::new()), clock).unwrap_err();
        assert!(matches!(err, PipelineError::Provision { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_flows_to_every_resolution_table() {
        let boundary = minute_boundary();
        let store = Arc::new(MemoryStore::new());
        let clock = ManualClock::new(boundary - TimeDelta::seconds(30));
        let handle =
            Dispatcher::start(&PipelineConfig::default(), store.clone(), Arc::new(clock.clone()))
                .unwrap();
        let poller = handle.poller(FixedSource);

        assert!(matches!(poller.poll_once().await, crate::PollOutcome::Sent { .. }));
        tokio::time::sleep(Duration::from_millis(10)).await;

        let raw_store = store.clone();
        wait_for(move || raw_store.raw_rows("pricecoinmarketcap").unwrap().len() == 1).await;
        let current_store = store.clone();
        wait_for(move || {
            current_store
                .window_rows("coinmarketcapcurrent")
                .unwrap()
                .len()
                == 1
        })
        .await;

        // Close the base minute.
        clock.set(boundary);
        tokio::time::sleep(Duration::from_secs(5)).await;
        let min_store = store.clone();
        wait_for(move || min_store.window_rows("coinmarketcapmin").unwrap().len() == 1).await;
        let rows = store.window_rows("coinmarketcapmin").unwrap();
        assert_eq!(rows[0].timestamp, boundary.timestamp() - 60);
        assert_eq!(rows[0].usd.high, 100.0);

        // Coarser resolutions have received the base window but not closed yet.
        assert!(store.window_rows("coinmarketcaphour").unwrap().is_empty());
        handle.abort();
    }
}
