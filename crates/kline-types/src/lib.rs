//! Core types for the kline OHLC aggregation service.
//!
//! This crate provides the data structures shared by every kline crate:
//!
//! - [`RawTicker`] - One asset row exactly as the pricing API sends it
//! - [`Snapshot`] - A parsed ticker reading taken at one poll instant
//! - [`TickerRecord`] - Per-symbol first/last/low/high state in three currencies
//! - [`Window`] - A timestamped collection of ticker records
//! - [`Resolution`] - One of the eight aggregation granularities

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/kline/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod record;
mod resolution;
mod ticker;
mod window;

pub use error::{ConversionError, ResolutionParseError};
pub use record::{Currency, PriceBand, TickerRecord};
pub use resolution::Resolution;
pub use ticker::{RawTicker, Snapshot};
pub use window::Window;
