//! Per-symbol OHLC state.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::Snapshot;

/// Quote currency of a price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    /// US dollar.
    Usd,
    /// Bitcoin.
    Btc,
    /// Chinese yuan.
    Cny,
}

impl Currency {
    /// Returns all quote currencies in storage column order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Usd, Self::Btc, Self::Cny]
    }

    /// Returns the currency as a lowercase identifier.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Usd => "usd",
            Self::Btc => "btc",
            Self::Cny => "cny",
        }
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// First/last/low/high prices in one currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PriceBand {
    /// First price seen in the window.
    pub first: Decimal,
    /// Most recent price.
    pub last: Decimal,
    /// Lowest price seen.
    pub low: Decimal,
    /// Highest price seen.
    pub high: Decimal,
}

impl PriceBand {
    /// Creates a band where all four prices equal `price`.
    #[must_use]
    pub const fn flat(price: Decimal) -> Self {
        Self {
            first: price,
            last: price,
            low: price,
            high: price,
        }
    }

    /// Returns true when `low <= first <= high` and `low <= last <= high`.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.low <= self.first
            && self.first <= self.high
            && self.low <= self.last
            && self.last <= self.high
    }
}

/// Aggregated state for one symbol inside a window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickerRecord {
    /// Asset identifier.
    pub asset_id: String,
    /// Display name.
    pub name: String,
    /// Ticker symbol, unique within a window.
    pub symbol: String,
    /// Latest market-cap rank seen.
    pub rank: u32,
    /// Prices in US dollars.
    pub usd: PriceBand,
    /// Prices in bitcoin.
    pub btc: PriceBand,
    /// Prices in Chinese yuan.
    pub cny: PriceBand,
    /// Latest source-reported update, epoch seconds.
    pub last_updated: i64,
}

impl TickerRecord {
    /// Returns the price band for the given currency.
    #[must_use]
    pub const fn band(&self, currency: Currency) -> &PriceBand {
        match currency {
            Currency::Usd => &self.usd,
            Currency::Btc => &self.btc,
            Currency::Cny => &self.cny,
        }
    }

    /// Returns the mutable price band for the given currency.
    pub const fn band_mut(&mut self, currency: Currency) -> &mut PriceBand {
        match currency {
            Currency::Usd => &mut self.usd,
            Currency::Btc => &mut self.btc,
            Currency::Cny => &mut self.cny,
        }
    }
}

impl From<&Snapshot> for TickerRecord {
    fn from(snapshot: &Snapshot) -> Self {
        Self {
            asset_id: snapshot.asset_id.clone(),
            name: snapshot.name.clone(),
            symbol: snapshot.symbol.clone(),
            rank: snapshot.rank,
            usd: PriceBand::flat(snapshot.price_usd),
            btc: PriceBand::flat(snapshot.price_btc),
            cny: PriceBand::flat(snapshot.price_cny),
            last_updated: snapshot.last_updated,
        }
    }
}
