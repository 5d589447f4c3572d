//! Temperature source seam.
//!
//! A source returns the latest process-variable reading. `Ok(None)` and `Err`
//! both mean "no reading this iteration"; the controller then keeps the last
//! good value and switches both relays off.

use std::collections::VecDeque;
use std::time::Duration;

use tp_core::Real;

use crate::error::{ControlError, ControlResult};

/// Default bound on a single read.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(1);

/// Provider of the process variable.
pub trait TemperatureSource {
    /// Read the current temperature.
    ///
    /// Must return within [`timeout`](Self::timeout).
    fn read(&mut self) -> ControlResult<Option<Real>>;

    /// Upper bound on how long [`read`](Self::read) may block.
    fn timeout(&self) -> Duration {
        DEFAULT_READ_TIMEOUT
    }
}

impl<S: TemperatureSource + ?Sized> TemperatureSource for &mut S {
    fn read(&mut self) -> ControlResult<Option<Real>> {
        (**self).read()
    }

    fn timeout(&self) -> Duration {
        (**self).timeout()
    }
}

impl<S: TemperatureSource + ?Sized> TemperatureSource for Box<S> {
    fn read(&mut self) -> ControlResult<Option<Real>> {
        (**self).read()
    }

    fn timeout(&self) -> Duration {
        (**self).timeout()
    }
}

/// Source returning the same answer until changed.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedSource {
    value: Option<Real>,
    failure: Option<String>,
}

impl FixedSource {
    pub fn new(value: Real) -> Self {
        Self {
            value: Some(value),
            failure: None,
        }
    }

    /// A source with no sensor attached.
    pub fn unavailable() -> Self {
        Self {
            value: None,
            failure: None,
        }
    }

    /// A source whose every read fails with `what`.
    pub fn failing(what: impl Into<String>) -> Self {
        Self {
            value: None,
            failure: Some(what.into()),
        }
    }

    pub fn set(&mut self, value: Option<Real>) {
        self.value = value;
        self.failure = None;
    }
}

impl TemperatureSource for FixedSource {
    fn read(&mut self) -> ControlResult<Option<Real>> {
        match &self.failure {
            Some(what) => Err(ControlError::SourceFailed { what: what.clone() }),
            None => Ok(self.value),
        }
    }
}

/// Source playing back a list of readings.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptedSource {
    pending: VecDeque<Option<Real>>,
    script: Vec<Option<Real>>,
    repeat: bool,
}

impl ScriptedSource {
    /// Play `readings` once, then report unavailable.
    pub fn once(readings: impl IntoIterator<Item = Option<Real>>) -> Self {
        let script: Vec<_> = readings.into_iter().collect();
        Self {
            pending: script.iter().copied().collect(),
            script,
            repeat: false,
        }
    }

    /// Play `readings` in a loop.
    pub fn repeating(readings: impl IntoIterator<Item = Option<Real>>) -> ControlResult<Self> {
        let mut source = Self::once(readings);
        if source.script.is_empty() {
            return Err(ControlError::InvalidArg {
                what: "repeating script must not be empty",
            });
        }
        source.repeat = true;
        Ok(source)
    }

    /// Readings left before the script ends or wraps.
    pub fn remaining(&self) -> usize {
        self.pending.len()
    }
}

impl TemperatureSource for ScriptedSource {
    fn read(&mut self) -> ControlResult<Option<Real>> {
        if self.pending.is_empty() && self.repeat {
            self.pending.extend(self.script.iter().copied());
        }
        Ok(self.pending.pop_front().flatten())
    }
}
