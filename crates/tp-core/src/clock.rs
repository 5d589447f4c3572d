//! Monotonic time sources.
//!
//! The control loop never reads wall-clock time directly; it asks a [`Clock`].
//! [`SystemClock`] is backed by [`Instant`] and a real thread sleep, while
//! [`ManualClock`] only moves when told to, which makes timing-dependent
//! behavior reproducible in tests and host-side simulation.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Source of monotonic time for the control loop.
pub trait Clock {
    /// Current instant.
    fn now(&self) -> Instant;

    /// Block (or pretend to block) for `duration`.
    fn sleep(&self, duration: Duration);
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Instant {
        (**self).now()
    }

    fn sleep(&self, duration: Duration) {
        (**self).sleep(duration)
    }
}

/// Real monotonic clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Virtual clock advanced explicitly or by `sleep`.
///
/// Clones share the same time line, so a test can keep a handle while the
/// loop owns another.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Rc<Cell<Instant>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    /// Create a clock frozen at the current instant.
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    /// Create a clock frozen at `start`.
    pub fn starting_at(start: Instant) -> Self {
        Self {
            now: Rc::new(Cell::new(start)),
        }
    }

    /// Move time forward.
    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    /// Move time backward, simulating a misbehaving time source.
    ///
    /// Returns `false` (and leaves the clock untouched) if the result is not
    /// representable.
    pub fn rewind(&self, by: Duration) -> bool {
        match self.now.get().checked_sub(by) {
            Some(t) => {
                self.now.set(t);
                true
            }
            None => false,
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }

    fn sleep(&self, duration: Duration) {
        self.advance(duration);
    }
}
