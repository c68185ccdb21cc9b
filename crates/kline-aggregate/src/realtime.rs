//! Continuously updated "current period so far" view.

use chrono::{DateTime, Utc};
use kline_types::{Resolution, Window};

use crate::{boundary::end_of_day, merge_into, merged};

/// What a timer tick did to the real-time view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickOutcome {
    /// The sub-period boundary passed and the view was re-based.
    pub rolled_over: bool,
    /// The full-reset boundary passed and the view was cleared.
    pub reset: bool,
}

/// State behind the real-time view.
///
/// Every raw window is folded into `current` as it arrives. A sub-period
/// clock re-bases `current` onto the latest snapshot, and a second clock
/// clears it at least once per day so the live view never silently spans
/// more than a day of data.
#[derive(Debug)]
pub struct RealtimeView {
    interval: i64,
    rollover_at: i64,
    reset_interval: i64,
    reset_at: i64,
    previous: Option<Window>,
    current: Option<Window>,
}

impl RealtimeView {
    /// Creates an empty view started at `start` with a sub-period of
    /// `interval` seconds.
    ///
    /// Intervals shorter than a day reset at every UTC midnight; longer ones
    /// reset once per interval.
    #[must_use]
    pub fn new(start: DateTime<Utc>, interval: i64) -> Self {
        let interval = interval.max(1);
        let (reset_at, reset_interval) = if interval < Resolution::DAY {
            (end_of_day(start), Resolution::DAY)
        } else {
            (start.timestamp() + interval, interval)
        };
        Self {
            interval,
            rollover_at: start.timestamp(),
            reset_interval,
            reset_at,
            previous: None,
            current: None,
        }
    }

    /// Returns the running aggregate.
    #[must_use]
    pub const fn current(&self) -> Option<&Window> {
        self.current.as_ref()
    }

    /// Returns the latest raw window seen.
    #[must_use]
    pub const fn previous(&self) -> Option<&Window> {
        self.previous.as_ref()
    }

    /// Returns the next full-reset instant, epoch seconds.
    #[must_use]
    pub const fn reset_at(&self) -> i64 {
        self.reset_at
    }

    /// Folds a raw window into the view and returns the updated aggregate.
    pub fn ingest(&mut self, window: Window) -> &Window {
        self.previous = Some(window.clone());
        let current = match self.current.take() {
            Some(mut current) => {
                merge_into(&mut current, &window);
                current
            }
            None => window,
        };
        self.current.insert(current)
    }

    /// Advances both reset clocks against `now` (epoch seconds).
    ///
    /// A tick before any data has arrived, or after a full reset and before
    /// the next arrival, does nothing.
    pub fn tick(&mut self, now: i64) -> TickOutcome {
        let mut outcome = TickOutcome::default();
        let (Some(previous), Some(current)) = (self.previous.as_ref(), self.current.as_ref())
        else {
            return outcome;
        };

        if now >= self.rollover_at {
            self.rollover_at += self.interval;
            self.current = Some(merged(previous, current));
            outcome.rolled_over = true;
        }

        if now >= self.reset_at {
            self.reset_at += self.reset_interval;
            self.current = None;
            outcome.reset = true;
        }

        outcome
    }
}
