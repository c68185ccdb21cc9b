//! Asymmetric OHLC window merge.
//!
//! The merge folds a newer window into an older one. Only symbols the target
//! already tracks are updated: a symbol that appears only in the source is
//! ignored, so a window's symbol set is fixed by whatever seeded it. Assets
//! listed mid-window therefore stay invisible until a window is re-seeded
//! from a fresh snapshot.

use kline_types::{Currency, TickerRecord, Window};

/// Merges `source` into `target` in place.
///
/// For every symbol present in both windows the target adopts the source's
/// last prices, rank and last-update time, and widens its low/high bounds
/// per currency. `first` prices and the window timestamp are never touched.
pub fn merge_into(target: &mut Window, source: &Window) {
    for record in target.records_mut() {
        if let Some(newer) = source.get(&record.symbol) {
            merge_record(record, newer);
        }
    }
}

/// Returns the result of merging `source` into a copy of `target`.
#[must_use]
pub fn merged(target: &Window, source: &Window) -> Window {
    let mut out = target.clone();
    merge_into(&mut out, source);
    out
}

fn merge_record(record: &mut TickerRecord, newer: &TickerRecord) {
    record.rank = newer.rank;
    record.last_updated = newer.last_updated;

    for &currency in Currency::all() {
        let from = *newer.band(currency);
        let band = record.band_mut(currency);
        band.last = from.last;
        if from.low < band.low {
            band.low = from.low;
        }
        if from.high > band.high {
            band.high = from.high;
        }
    }
}
