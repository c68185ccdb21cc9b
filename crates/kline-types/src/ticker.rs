//! Ticker rows as delivered by the pricing API, and their parsed form.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::{ConversionError, Currency};

/// One asset row of the pricing API's JSON array.
///
/// Every field is kept as the text the source sent so the raw archive can
/// store it unmodified. Fields the source may report as `null` are optional.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RawTicker {
    /// Asset identifier (e.g. `bitcoin`).
    pub id: String,
    /// Display name.
    pub name: String,
    /// Ticker symbol (e.g. `BTC`).
    pub symbol: String,
    /// Market-cap rank.
    pub rank: String,
    /// Price in US dollars.
    pub price_usd: Option<String>,
    /// Price in bitcoin.
    pub price_btc: Option<String>,
    /// Trailing 24h volume in US dollars.
    #[serde(rename = "24h_volume_usd")]
    pub volume_usd_24h: Option<String>,
    /// Market capitalisation in US dollars.
    pub market_cap_usd: Option<String>,
    /// Circulating supply.
    pub available_supply: Option<String>,
    /// Total supply.
    pub total_supply: Option<String>,
    /// Price change over the last hour, in percent.
    pub percent_change_1h: Option<String>,
    /// Price change over the last day, in percent.
    pub percent_change_24h: Option<String>,
    /// Price change over the last week, in percent.
    pub percent_change_7d: Option<String>,
    /// Source-reported last update, epoch seconds.
    pub last_updated: Option<String>,
    /// Price in Chinese yuan.
    pub price_cny: Option<String>,
    /// Trailing 24h volume in Chinese yuan.
    #[serde(rename = "24h_volume_cny")]
    pub volume_cny_24h: Option<String>,
    /// Market capitalisation in Chinese yuan.
    pub market_cap_cny: Option<String>,
}

impl RawTicker {
    /// Returns the raw price text for the given currency.
    #[must_use]
    pub fn price(&self, currency: Currency) -> Option<&str> {
        match currency {
            Currency::Usd => self.price_usd.as_deref(),
            Currency::Btc => self.price_btc.as_deref(),
            Currency::Cny => self.price_cny.as_deref(),
        }
    }

    /// Parses the row into a [`Snapshot`] taken at `polled_at` (epoch seconds).
    ///
    /// # Errors
    ///
    /// Returns an error naming the first field that is missing or cannot be
    /// parsed as a number.
    pub fn parse(&self, polled_at: i64) -> Result<Snapshot, ConversionError> {
        let rank = parse_field::<u32>(&self.symbol, "rank", Some(&self.rank))?;
        let last_updated =
            parse_field::<i64>(&self.symbol, "last_updated", self.last_updated.as_deref())?;

        Ok(Snapshot {
            asset_id: self.id.clone(),
            name: self.name.clone(),
            symbol: self.symbol.clone(),
            rank,
            price_usd: parse_decimal(&self.symbol, "price_usd", self.price(Currency::Usd))?,
            price_btc: parse_decimal(&self.symbol, "price_btc", self.price(Currency::Btc))?,
            price_cny: parse_decimal(&self.symbol, "price_cny", self.price(Currency::Cny))?,
            last_updated,
            polled_at,
        })
    }
}

/// A single asset's price reading at one poll instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Asset identifier.
    pub asset_id: String,
    /// Display name.
    pub name: String,
    /// Ticker symbol.
    pub symbol: String,
    /// Market-cap rank.
    pub rank: u32,
    /// Price in US dollars.
    pub price_usd: Decimal,
    /// Price in bitcoin.
    pub price_btc: Decimal,
    /// Price in Chinese yuan.
    pub price_cny: Decimal,
    /// Source-reported last update, epoch seconds.
    pub last_updated: i64,
    /// Wall-clock time of the poll, epoch seconds.
    pub polled_at: i64,
}

impl Snapshot {
    /// Returns the price in the given currency.
    #[must_use]
    pub const fn price(&self, currency: Currency) -> Decimal {
        match currency {
            Currency::Usd => self.price_usd,
            Currency::Btc => self.price_btc,
            Currency::Cny => self.price_cny,
        }
    }
}

fn parse_field<T: FromStr>(
    symbol: &str,
    field: &'static str,
    value: Option<&str>,
) -> Result<T, ConversionError> {
    value
        .and_then(|v| v.trim().parse::<T>().ok())
        .ok_or_else(|| ConversionError::new(symbol, field, value))
}

/// Prices arrive as plain decimals, very small ones occasionally in
/// scientific notation.
fn parse_decimal(
    symbol: &str,
    field: &'static str,
    value: Option<&str>,
) -> Result<Decimal, ConversionError> {
    value
        .map(str::trim)
        .and_then(|v| {
            Decimal::from_str(v)
                .or_else(|_| Decimal::from_scientific(v))
                .ok()
        })
        .ok_or_else(|| ConversionError::new(symbol, field, value))
}
