//! Fixtures for kline benchmarks.

use kline_types::{PriceBand, TickerRecord, Window};
use rust_decimal::Decimal;

/// Builds a window of `symbols` assets, each priced `base + i` in USD.
pub fn synthetic_window(symbols: usize, base: i64, timestamp: i64) -> Window {
    (0..symbols)
        .map(|i| {
            let usd = Decimal::from(base + i as i64);
            TickerRecord {
                asset_id: format!("asset-{i}"),
                name: format!("Asset {i}"),
                symbol: format!("SYM{i}"),
                rank: i as u32 + 1,
                usd: PriceBand::flat(usd),
                btc: PriceBand::flat(usd / Decimal::from(40_000)),
                cny: PriceBand::flat(usd * Decimal::from(7)),
                last_updated: timestamp,
            }
        })
        .collect::<Window>()
        .with_timestamp(timestamp)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthetic_window() {
        let window = synthetic_window(3, 100, 60);
        assert_eq!(window.len(), 3);
        assert_eq!(window.timestamp, 60);
        assert_eq!(window.get("SYM2").unwrap().usd.first, Decimal::from(102));
    }
}
