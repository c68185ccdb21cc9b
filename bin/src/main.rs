//! kline - poll a cryptocurrency pricing API and keep OHLC tables at eight
//! resolutions plus a live current-period view.

use anyhow::{Context, Result};
use clap::Parser;
use kline_lib::{
    ClientConfig, DEFAULT_BASE_URL, Dispatcher, MemoryStore, PipelineConfig, SharedStore,
    SqliteStore, SystemClock, TickerClient,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

mod logging;

#[derive(Parser, Debug)]
#[command(name = "kline")]
#[command(about = "Multi-resolution OHLC aggregation of cryptocurrency ticker polls", long_about = None)]
#[command(version)]
struct Cli {
    /// SQLite database file. Defaults to kline.db in the platform data directory.
    #[arg(long)]
    database: Option<PathBuf>,

    /// Raw archive table
    #[arg(long, default_value = PipelineConfig::DEFAULT_RAW_TABLE)]
    table: String,

    /// Prefix of the resolution and current-view tables
    #[arg(long, default_value = PipelineConfig::DEFAULT_TABLE_PREFIX)]
    table_prefix: String,

    /// Poll interval in seconds
    #[arg(long, default_value_t = 10)]
    interval: u64,

    /// Ticker endpoint
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    url: String,

    /// Capacity of the window channels between tasks
    #[arg(long, default_value_t = 100)]
    channel_capacity: usize,

    /// Keep everything in memory instead of writing to the database
    #[arg(long)]
    dry_run: bool,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            table_prefix: self.table_prefix.clone(),
            raw_table: self.table.clone(),
            poll_interval: Duration::from_secs(self.interval),
            channel_capacity: self.channel_capacity,
            ..PipelineConfig::default()
        }
    }

    fn database_path(&self) -> PathBuf {
        self.database.clone().unwrap_or_else(|| {
            directories::ProjectDirs::from("", "", "kline").map_or_else(
                || PathBuf::from("kline.db"),
                |dirs| dirs.data_dir().join("kline.db"),
            )
        })
    }

    fn open_store(&self) -> Result<SharedStore> {
        if self.dry_run {
            info!("dry run, using in-memory store");
            return Ok(Arc::new(MemoryStore::new()));
        }
        let path = self.database_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory '{}'", parent.display()))?;
        }
        let store = SqliteStore::open(&path)
            .with_context(|| format!("Failed to open database '{}'", path.display()))?;
        Ok(Arc::new(store))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let config = cli.pipeline_config();
    let store = cli.open_store()?;
    let client = TickerClient::new(ClientConfig {
        base_url: cli.url.clone(),
        ..ClientConfig::default()
    })
    .context("Failed to create HTTP client")?;

    let handle = Dispatcher::start(&config, store, Arc::new(SystemClock))
        .context("Failed to start pipeline")?;
    let poller = handle.poller(client);

    tokio::select! {
        () = poller.run() => warn!("poller stopped"),
        signal = tokio::signal::ctrl_c() => {
            signal.context("Failed to listen for interrupt")?;
            info!("interrupt received, shutting down");
        }
    }

    handle.abort();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::filter::LevelFilter;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["kline"]).unwrap();
        let config = cli.pipeline_config();
        assert_eq!(config, PipelineConfig::default());
        assert_eq!(cli.url, DEFAULT_BASE_URL);
        assert!(!cli.dry_run);
        assert!(cli.database_path().ends_with("kline.db"));
    }

    #[test]
    fn test_options() {
        let cli = Cli::try_parse_from([
            "kline",
            "--database",
            "/tmp/prices.db",
            "--table",
            "rawprices",
            "--table-prefix",
            "cmc",
            "--interval",
            "30",
            "--channel-capacity",
            "8",
            "--dry-run",
            "-vv",
        ])
        .unwrap();
        let config = cli.pipeline_config();
        assert_eq!(config.raw_table, "rawprices");
        assert_eq!(config.current_table(), "cmccurrent");
        assert_eq!(config.poll_interval, Duration::from_secs(30));
        assert_eq!(config.channel_capacity, 8);
        assert_eq!(cli.database_path(), PathBuf::from("/tmp/prices.db"));
        assert!(cli.dry_run);
        assert_eq!(logging::level_for(cli.verbose), LevelFilter::DEBUG);
    }

    #[test]
    fn test_dry_run_store_is_in_memory() {
        let cli = Cli::try_parse_from(["kline", "--dry-run"]).unwrap();
        let store = cli.open_store().unwrap();
        assert!(format!("{store:?}").contains("MemoryStore"));
    }
}
