//! Per-resolution window aggregation state machine.

use kline_types::{Resolution, Window};
use tracing::debug;

use crate::merge_into;

/// Whether an aggregator currently holds data for its slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregatorState {
    /// Nothing has arrived since the last boundary.
    Idle,
    /// A pending window is being accumulated.
    Accumulating,
}

/// Accumulates windows for one resolution and closes them at boundaries.
///
/// The aggregator is driven from outside: [`ingest`](Self::ingest) for every
/// inbound window, [`poll_boundary`](Self::poll_boundary) on every timer tick
/// and [`finalize`](Self::finalize) once the post-boundary grace read is done.
#[derive(Debug)]
pub struct ResolutionAggregator {
    resolution: Resolution,
    next_boundary: i64,
    pending: Option<Window>,
}

impl ResolutionAggregator {
    /// Creates an idle aggregator whose first slot closes at `first_boundary`.
    #[must_use]
    pub const fn new(resolution: Resolution, first_boundary: i64) -> Self {
        Self {
            resolution,
            next_boundary: first_boundary,
            pending: None,
        }
    }

    /// Returns the resolution being aggregated.
    #[must_use]
    pub const fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// Returns the next scheduled boundary, epoch seconds.
    #[must_use]
    pub const fn next_boundary(&self) -> i64 {
        self.next_boundary
    }

    /// Returns the window accumulated so far.
    #[must_use]
    pub const fn pending(&self) -> Option<&Window> {
        self.pending.as_ref()
    }

    /// Returns the current state.
    #[must_use]
    pub const fn state(&self) -> AggregatorState {
        match self.pending {
            Some(_) => AggregatorState::Accumulating,
            None => AggregatorState::Idle,
        }
    }

    /// Folds an inbound window into the pending one.
    ///
    /// The first window of a slot is adopted as-is and fixes the slot's
    /// symbol set; later ones are merged into it.
    pub fn ingest(&mut self, window: Window) {
        match self.pending.as_mut() {
            Some(pending) => {
                merge_into(pending, &window);
                debug!(resolution = %self.resolution, symbols = pending.len(), "merged window");
            }
            None => {
                debug!(resolution = %self.resolution, symbols = window.len(), "opened window");
                self.pending = Some(window);
            }
        }
    }

    /// Checks the clock against the scheduled boundary.
    ///
    /// When `now` has reached the boundary, advances it by one interval and
    /// returns the boundary that was crossed. Returns `None` otherwise.
    pub const fn poll_boundary(&mut self, now: i64) -> Option<i64> {
        if now < self.next_boundary {
            return None;
        }
        let crossed = self.next_boundary;
        self.next_boundary += self.resolution.seconds();
        Some(crossed)
    }

    /// Closes the slot that ended at `crossed`, returning its window.
    ///
    /// The window is stamped with the slot's open time. Returns `None` (and
    /// emits nothing) when no data arrived during the slot or the pending
    /// window holds no symbols. The aggregator is
    /// idle afterwards either way.
    pub fn finalize(&mut self, crossed: i64) -> Option<Window> {
        let mut window = self.pending.take().filter(|w| !w.is_empty())?;
        window.timestamp = crossed - self.resolution.seconds();
        Some(window)
    }
}
