//! Ticker decoding and seed-window construction.

use kline_types::{RawTicker, TickerRecord, Window};
use tracing::warn;

/// Decodes a response body into ticker rows.
///
/// # Errors
///
/// Returns an error if the body is not a JSON array of ticker objects.
pub fn decode_tickers(body: &[u8]) -> Result<Vec<RawTicker>, serde_json::Error> {
    serde_json::from_slice(body)
}

/// Builds the seed window for one poll taken at `polled_at` (epoch seconds).
///
/// Rows whose numeric fields fail to convert are logged and left out; a
/// repeated symbol keeps its first occurrence.
#[must_use]
pub fn build_window(tickers: &[RawTicker], polled_at: i64) -> Window {
    let mut window = Window::new(polled_at);
    for ticker in tickers {
        match ticker.parse(polled_at) {
            Ok(snapshot) => {
                if !window.insert(TickerRecord::from(&snapshot)) {
                    warn!(symbol = %snapshot.symbol, "duplicate symbol in poll, keeping first");
                }
            }
            Err(e) => warn!(error = %e, "skipping ticker"),
        }
    }
    window
}
