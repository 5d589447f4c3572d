//! Relay output seam.
//!
//! The controller drives two binary outputs, "increase" and "decrease". The
//! hardware binding lives behind [`RelayPair`]; [`MemoryRelays`] is the
//! in-memory implementation used by tests and the host simulation.

use serde::{Deserialize, Serialize};

/// Two independent binary outputs.
///
/// Implementations must be idempotent. Callers never request both outputs on
/// at the same time.
pub trait RelayPair {
    fn set_increase(&mut self, on: bool);

    fn set_decrease(&mut self, on: bool);

    /// De-assert both outputs.
    fn all_off(&mut self) {
        self.set_increase(false);
        self.set_decrease(false);
    }
}

impl<R: RelayPair + ?Sized> RelayPair for &mut R {
    fn set_increase(&mut self, on: bool) {
        (**self).set_increase(on)
    }

    fn set_decrease(&mut self, on: bool) {
        (**self).set_decrease(on)
    }
}

impl<R: RelayPair + ?Sized> RelayPair for Box<R> {
    fn set_increase(&mut self, on: bool) {
        (**self).set_increase(on)
    }

    fn set_decrease(&mut self, on: bool) {
        (**self).set_decrease(on)
    }
}

/// Commanded state of both outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RelayState {
    pub increase: bool,
    pub decrease: bool,
}

impl RelayState {
    pub const OFF: Self = Self {
        increase: false,
        decrease: false,
    };

    pub fn any(&self) -> bool {
        self.increase || self.decrease
    }
}

/// Relay pair that only remembers what it was told.
#[derive(Debug, Clone, Default)]
pub struct MemoryRelays {
    state: RelayState,
    writes: usize,
    overlapped: bool,
}

impl MemoryRelays {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> RelayState {
        self.state
    }

    /// Number of `set_*` calls received.
    pub fn writes(&self) -> usize {
        self.writes
    }

    /// Whether both outputs were ever on at the same time.
    pub fn overlapped(&self) -> bool {
        self.overlapped
    }

    fn record(&mut self) {
        self.writes += 1;
        if self.state.increase && self.state.decrease {
            self.overlapped = true;
        }
    }
}

impl RelayPair for MemoryRelays {
    fn set_increase(&mut self, on: bool) {
        self.state.increase = on;
        self.record();
    }

    fn set_decrease(&mut self, on: bool) {
        self.state.decrease = on;
        self.record();
    }
}
