//! Window merge, boundary scheduling and aggregation state machines for kline.
//!
//! This crate provides the synchronous aggregation core:
//!
//! - [`merge_into`] / [`merged`] - Asymmetric OHLC window merge
//! - [`first_boundary`] - Wall-clock aligned first boundary per resolution
//! - [`ResolutionAggregator`] - Per-resolution accumulate/finalize state machine
//! - [`RealtimeView`] - Live "current period so far" state
//! - [`Clock`] - Injectable wall-clock source

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/kline/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

use std::time::Duration;

mod aggregator;
mod boundary;
mod clock;
mod merge;
mod realtime;

pub use aggregator::{AggregatorState, ResolutionAggregator};
pub use boundary::{end_of_day, end_of_week, first_boundary};
pub use clock::{Clock, ManualClock, SystemClock};
pub use merge::{merge_into, merged};
pub use realtime::{RealtimeView, TickOutcome};

/// Cadence of the boundary timer. Bounds how late a window can close.
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// How long a closing aggregator waits for one straggling update.
pub const GRACE_PERIOD: Duration = Duration::from_secs(3);
