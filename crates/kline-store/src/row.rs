//! Narrowing of in-memory records into stored rows.

use kline_types::{Currency, PriceBand, TickerRecord, Window};
use rust_decimal::{Decimal, prelude::ToPrimitive};

use crate::{Result, StoreError};

/// A [`PriceBand`] narrowed to `f64`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NarrowBand {
    /// Opening price.
    pub first: f64,
    /// Closing price.
    pub last: f64,
    /// Lowest price.
    pub low: f64,
    /// Highest price.
    pub high: f64,
}

/// One stored row of a resolution or current-view table.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowRow {
    /// Asset identifier.
    pub asset_id: String,
    /// Asset display name.
    pub name: String,
    /// Ticker symbol.
    pub symbol: String,
    /// Market-cap rank.
    pub rank: i64,
    /// USD prices.
    pub usd: NarrowBand,
    /// BTC prices.
    pub btc: NarrowBand,
    /// CNY prices.
    pub cny: NarrowBand,
    /// Source last-update, epoch seconds.
    pub last_updated: i64,
    /// Window timestamp, epoch seconds.
    pub timestamp: i64,
    /// Free-text label scoping current-view upserts.
    pub group: String,
}

impl WindowRow {
    /// Narrows one record of a window stamped `timestamp`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Narrowing`] if any price has no finite `f64`
    /// representation.
    pub fn from_record(record: &TickerRecord, timestamp: i64, group: &str) -> Result<Self> {
        Ok(Self {
            asset_id: record.asset_id.clone(),
            name: record.name.clone(),
            symbol: record.symbol.clone(),
            rank: i64::from(record.rank),
            usd: narrow_band(record, Currency::Usd)?,
            btc: narrow_band(record, Currency::Btc)?,
            cny: narrow_band(record, Currency::Cny)?,
            last_updated: record.last_updated,
            timestamp,
            group: group.to_string(),
        })
    }

    /// Returns the narrowed band for `currency`.
    #[must_use]
    pub const fn band(&self, currency: Currency) -> &NarrowBand {
        match currency {
            Currency::Usd => &self.usd,
            Currency::Btc => &self.btc,
            Currency::Cny => &self.cny,
        }
    }
}

/// Narrows every record of `window`, failing on the first bad value.
pub(crate) fn narrow_window(window: &Window, group: &str) -> Result<Vec<WindowRow>> {
    window
        .records()
        .map(|record| WindowRow::from_record(record, window.timestamp, group))
        .collect()
}

fn narrow_band(record: &TickerRecord, currency: Currency) -> Result<NarrowBand> {
    let band: &PriceBand = record.band(currency);
    let narrow = |value: Decimal, column: &'static str| -> Result<f64> {
        value
            .to_f64()
            .filter(|v| v.is_finite())
            .ok_or_else(|| StoreError::Narrowing {
                symbol: record.symbol.clone(),
                field: column,
                value: value.to_string(),
            })
    };
    let (first, last, low, high) = match currency {
        Currency::Usd => (
            "price_usd_first",
            "price_usd_last",
            "price_usd_low",
            "price_usd_high",
        ),
        Currency::Btc => (
            "price_btc_first",
            "price_btc_last",
            "price_btc_low",
            "price_btc_high",
        ),
        Currency::Cny => (
            "price_cny_first",
            "price_cny_last",
            "price_cny_low",
            "price_cny_high",
        ),
    };
    Ok(NarrowBand {
        first: narrow(band.first, first)?,
        last: narrow(band.last, last)?,
        low: narrow(band.low, low)?,
        high: narrow(band.high, high)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::str::FromStr;

    fn record(usd: &str) -> TickerRecord {
        let usd = Decimal::from_str(usd).unwrap();
        TickerRecord {
            asset_id: "bitcoin".to_string(),
            name: "Bitcoin".to_string(),
            symbol: "BTC".to_string(),
            rank: 1,
            usd: PriceBand::flat(usd),
            btc: PriceBand::flat(Decimal::ONE),
            cny: PriceBand::flat(usd * Decimal::from(7)),
            last_updated: 1_705_320_000,
        }
    }

    #[test]
    fn test_narrow_record() {
        let row = WindowRow::from_record(&record("42123.456789"), 60, "").unwrap();
        assert_eq!(row.rank, 1);
        assert_eq!(row.timestamp, 60);
        assert_eq!(row.group, "");
        assert_relative_eq!(row.usd.first, 42_123.456_789, epsilon = 1e-9);
        assert_relative_eq!(row.band(Currency::Cny).high, 294_864.197_523, epsilon = 1e-6);
        assert_relative_eq!(row.btc.low, 1.0);
    }

    #[test]
    fn test_narrow_window_keeps_order() {
        let mut window = Window::new(120);
        window.insert(record("1.5"));
        let mut eth = record("2.5");
        eth.symbol = "ETH".to_string();
        window.insert(eth);

        let rows = narrow_window(&window, "tag").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].symbol, "BTC");
        assert_eq!(rows[1].symbol, "ETH");
        assert!(rows.iter().all(|r| r.group == "tag" && r.timestamp == 120));
    }
}
