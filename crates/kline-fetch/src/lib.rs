//! Snapshot source for kline.
//!
//! Fetches the full ticker list from the pricing API and turns one poll into
//! a seed [`Window`](kline_types::Window):
//!
//! - [`TickerClient`] - HTTP client, one request per poll
//! - [`decode_tickers`] - JSON body to [`RawTicker`](kline_types::RawTicker) rows
//! - [`build_window`] - Parse rows into a single-snapshot window

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/kline/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod client;
mod decode;
pub mod url;

pub use client::{ClientConfig, FetchError, TickerClient};
pub use decode::{build_window, decode_tickers};
