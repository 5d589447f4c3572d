//! Latching elapsed-time timers.
//!
//! A [`LatchTimer`] remembers the instant it was latched and reports the time
//! elapsed since. The engine uses two of them: one for the control cycle and
//! one for the 100 ms heartbeat.
//!
//! Elapsed time is computed with [`Instant::checked_duration_since`], so a time
//! source that steps backwards shows up as `None` instead of a negative
//! interval. [`LatchTimer::advance`] re-latches on that; the heartbeat uses
//! [`LatchTimer::advance_or_zero`], which only zeroes the elapsed time.

use std::time::{Duration, Instant};

/// Elapsed-time timer with a latch origin and a one-shot pulse flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LatchTimer {
    origin: Option<Instant>,
    elapsed: Duration,
    pulse: bool,
}

impl LatchTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Time since the origin as of the last [`advance`](Self::advance).
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }

    pub fn is_zero(&self) -> bool {
        self.elapsed.is_zero()
    }

    pub fn origin(&self) -> Option<Instant> {
        self.origin
    }

    /// Whether the one-shot flag is currently set.
    pub fn pulse(&self) -> bool {
        self.pulse
    }

    pub fn set_pulse(&mut self, pulse: bool) {
        self.pulse = pulse;
    }

    /// Start measuring from `now`.
    pub fn latch(&mut self, now: Instant) {
        self.origin = Some(now);
        self.elapsed = Duration::ZERO;
    }

    /// Recompute elapsed time at `now`.
    ///
    /// If `now` precedes the origin (or the timer was never latched) the origin
    /// is re-latched at `now`, elapsed becomes zero and `false` is returned.
    pub fn advance(&mut self, now: Instant) -> bool {
        match self.origin.and_then(|o| now.checked_duration_since(o)) {
            Some(elapsed) => {
                self.elapsed = elapsed;
                true
            }
            None => {
                self.latch(now);
                false
            }
        }
    }

    /// Like [`advance`](Self::advance), but a `now` before the origin only
    /// zeroes the elapsed time and leaves the origin in place.
    pub fn advance_or_zero(&mut self, now: Instant) -> bool {
        let Some(origin) = self.origin else {
            self.latch(now);
            return false;
        };
        match now.checked_duration_since(origin) {
            Some(elapsed) => {
                self.elapsed = elapsed;
                true
            }
            None => {
                self.reset();
                false
            }
        }
    }

    /// Zero the elapsed time, keeping the origin.
    pub fn reset(&mut self) {
        self.elapsed = Duration::ZERO;
    }
}
