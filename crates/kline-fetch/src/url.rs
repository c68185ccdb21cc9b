//! Ticker endpoint URL construction.

use chrono::{DateTime, Utc};

/// Default ticker endpoint (CoinMarketCap public API v1).
pub const DEFAULT_BASE_URL: &str = "https://api.coinmarketcap.com/v1/ticker/";

/// Third quote currency requested alongside USD and BTC.
pub const CONVERT: &str = "CNY";

/// Builds the URL for one poll.
///
/// The poll time is sent as a cache-busting `timestamp` parameter.
///
/// # Example
///
/// ```
/// use kline_fetch::url::ticker_url;
/// use chrono::{TimeZone, Utc};
///
/// let at = Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap();
/// let url = ticker_url("https://api.coinmarketcap.com/v1/ticker/", at);
/// assert_eq!(url, "https://api.coinmarketcap.com/v1/ticker/?convert=CNY&timestamp=1705320000");
/// ```
#[must_use]
pub fn ticker_url(base_url: &str, at: DateTime<Utc>) -> String {
    let separator = if base_url.contains('?') { '&' } else { '?' };
    format!(
        "{base_url}{separator}convert={CONVERT}&timestamp={}",
        at.timestamp()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_ticker_url_default() {
        let at = Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap();
        assert_eq!(
            ticker_url(DEFAULT_BASE_URL, at),
            "https://api.coinmarketcap.com/v1/ticker/?convert=CNY&timestamp=1705320000"
        );
    }

    #[test]
    fn test_ticker_url_existing_query() {
        let at = Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap();
        let url = ticker_url("http://localhost:8080/ticker?limit=0", at);
        assert_eq!(
            url,
            "http://localhost:8080/ticker?limit=0&convert=CNY&timestamp=1705320000"
        );
    }
}
