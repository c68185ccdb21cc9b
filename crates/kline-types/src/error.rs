//! Error types for kline.

use thiserror::Error;

/// A text field from the pricing API could not be converted to its numeric type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid {field} '{value}' for {symbol}")]
pub struct ConversionError {
    /// Symbol of the ticker that carried the value.
    pub symbol: String,
    /// Name of the offending field.
    pub field: &'static str,
    /// The raw text that failed to parse (`<null>` when absent).
    pub value: String,
}

impl ConversionError {
    /// Creates a new conversion error.
    #[must_use]
    pub fn new(symbol: &str, field: &'static str, value: Option<&str>) -> Self {
        Self {
            symbol: symbol.to_string(),
            field,
            value: value.unwrap_or("<null>").to_string(),
        }
    }
}

/// Error returned when parsing an invalid resolution string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid resolution '{0}', expected one of: 1m, 5m, 10m, 15m, 30m, 1h, 1d, 1w")]
pub struct ResolutionParseError(pub(crate) String);
