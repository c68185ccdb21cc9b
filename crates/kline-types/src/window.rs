//! Timestamped collections of per-symbol OHLC records.

use indexmap::IndexMap;
use indexmap::map::Entry;
use serde::{Deserialize, Serialize};

use crate::TickerRecord;

/// One resolution's OHLC state for a time slot.
///
/// Records are keyed by symbol and keep the order in which they were first
/// inserted, which is the order the pricing API listed them.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Window {
    /// Nominal start of the window, epoch seconds.
    pub timestamp: i64,
    records: IndexMap<String, TickerRecord>,
}

impl Window {
    /// Creates an empty window.
    #[must_use]
    pub fn new(timestamp: i64) -> Self {
        Self {
            timestamp,
            records: IndexMap::new(),
        }
    }

    /// Returns the window restamped at `timestamp`.
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Inserts a record unless its symbol is already present.
    ///
    /// Returns false (and leaves the window unchanged) for a duplicate symbol.
    pub fn insert(&mut self, record: TickerRecord) -> bool {
        match self.records.entry(record.symbol.clone()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(record);
                true
            }
        }
    }

    /// Returns the record for `symbol`.
    #[must_use]
    pub fn get(&self, symbol: &str) -> Option<&TickerRecord> {
        self.records.get(symbol)
    }

    /// Returns the mutable record for `symbol`.
    pub fn get_mut(&mut self, symbol: &str) -> Option<&mut TickerRecord> {
        self.records.get_mut(symbol)
    }

    /// Returns true if the window tracks `symbol`.
    #[must_use]
    pub fn contains(&self, symbol: &str) -> bool {
        self.records.contains_key(symbol)
    }

    /// Iterates over the records in insertion order.
    pub fn records(&self) -> impl Iterator<Item = &TickerRecord> {
        self.records.values()
    }

    /// Iterates mutably over the records in insertion order.
    pub fn records_mut(&mut self) -> impl Iterator<Item = &mut TickerRecord> {
        self.records.values_mut()
    }

    /// Iterates over the tracked symbols in insertion order.
    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }

    /// Returns the number of symbols tracked.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the window tracks no symbols.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FromIterator<TickerRecord> for Window {
    fn from_iter<I: IntoIterator<Item = TickerRecord>>(iter: I) -> Self {
        let mut window = Self::default();
        for record in iter {
            window.insert(record);
        }
        window
    }
}
