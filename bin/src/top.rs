//! kline-top - print the top assets by USD market cap from one poll.

use anyhow::{Context, Result};
use clap::Parser;
use kline_lib::{ClientConfig, Clock, DEFAULT_BASE_URL, RawTicker, SystemClock, TickerClient};
use rust_decimal::Decimal;
use std::cmp::Ordering;
use std::io::{self, Write};
use std::str::FromStr;

mod logging;

#[derive(Parser, Debug)]
#[command(name = "kline-top")]
#[command(about = "Print the top assets by USD market cap", long_about = None)]
#[command(version)]
struct Cli {
    /// Number of assets to print
    #[arg(long, default_value_t = 100)]
    size: usize,

    /// Ticker endpoint
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    url: String,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// One line of the report.
#[derive(Debug, Clone, PartialEq, Eq)]
struct TopEntry {
    symbol: String,
    market_cap_usd: Option<Decimal>,
    price_usd: Option<Decimal>,
}

fn parse_decimal(value: Option<&str>) -> Option<Decimal> {
    let value = value?;
    Decimal::from_str(value)
        .or_else(|_| Decimal::from_scientific(value))
        .ok()
}

/// Ranks tickers by market cap, largest first; assets without one go last.
fn top_n(tickers: &[RawTicker], n: usize) -> Vec<TopEntry> {
    let mut entries: Vec<TopEntry> = tickers
        .iter()
        .map(|t| TopEntry {
            symbol: t.symbol.clone(),
            market_cap_usd: parse_decimal(t.market_cap_usd.as_deref()),
            price_usd: parse_decimal(t.price_usd.as_deref()),
        })
        .collect();
    entries.sort_by(|a, b| match (a.market_cap_usd, b.market_cap_usd) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    entries.truncate(n);
    entries
}

fn format_line(rank: usize, entry: &TopEntry) -> String {
    let show = |v: Option<Decimal>| v.map(|d| d.to_string()).unwrap_or_default();
    format!(
        "{rank},{},{},{}",
        entry.symbol,
        show(entry.market_cap_usd),
        show(entry.price_usd)
    )
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let client = TickerClient::new(ClientConfig {
        base_url: cli.url.clone(),
        ..ClientConfig::default()
    })
    .context("Failed to create HTTP client")?;
    let tickers = client
        .fetch(SystemClock.now())
        .await
        .context("Failed to fetch tickers")?;

    let mut out = io::stdout().lock();
    for (i, entry) in top_n(&tickers, cli.size).iter().enumerate() {
        writeln!(out, "{}", format_line(i + 1, entry))?;
    }
    Ok(())
}
