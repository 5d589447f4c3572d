//! Live-tunable controller parameters.
//!
//! Operators may change any field at any time, so ranges are enforced every
//! time the engine evaluates, not only at construction. Out-of-range values
//! are never an error: they are clamped and the clamped value is written back.

use serde::{Deserialize, Serialize};
use tp_core::{Real, constrain};

/// Inclusive range a tunable is clamped into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamRange {
    pub min: Real,
    pub max: Real,
}

impl ParamRange {
    pub const fn new(min: Real, max: Real) -> Self {
        Self { min, max }
    }

    pub fn clamp(&self, v: Real) -> Real {
        constrain(v, self.min, self.max)
    }

    pub fn contains(&self, v: Real) -> bool {
        v >= self.min && v <= self.max
    }
}

/// When the relay driver adds travel time to an accumulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccrualMode {
    /// Every poll tick with an active relay adds one quantum.
    #[default]
    PerPoll,
    /// Only poll ticks on which the 100 ms heartbeat fired add a quantum.
    SubTick,
}

/// Setpoint, gains, timing limits and mode flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlParameters {
    /// Target process value (degrees).
    pub setpoint: Real,
    /// Proportional gain.
    pub k_p: Real,
    /// Integral divisor; 0 disables integral action.
    pub k_i: Real,
    /// Derivative gain.
    pub k_d: Real,
    /// Control cycle length (seconds).
    pub cycle: Real,
    /// Full valve travel time (seconds).
    pub valve: Real,
    /// Error band around the setpoint with no control action.
    pub dead_zone: Real,
    /// Master enable.
    pub on_off: bool,
    /// `true` = automatic (PID), `false` = manual.
    pub auto_hand: bool,
    /// Manual "increase" request.
    pub hand_up: bool,
    /// Manual "decrease" request.
    pub hand_down: bool,
    #[serde(default)]
    pub accrual: AccrualMode,
}

impl ControlParameters {
    pub const K_P: ParamRange = ParamRange::new(-99.0, 99.0);
    pub const K_I: ParamRange = ParamRange::new(1.0, 9999.0);
    pub const K_D: ParamRange = ParamRange::new(0.0, 9999.0);
    pub const CYCLE: ParamRange = ParamRange::new(1.0, 25.0);
    pub const VALVE: ParamRange = ParamRange::new(15.0, 250.0);
    pub const DEAD_ZONE: ParamRange = ParamRange::new(0.0, 9999.0);

    /// `k_i` value substituted for zero: integral action becomes negligible.
    pub const K_I_DISABLED: Real = 9999.0;

    /// Clamp every numeric field into its range in place.
    ///
    /// Returns `true` if any field changed.
    pub fn clamp(&mut self) -> bool {
        let before = self.clone();

        if !self.setpoint.is_finite() {
            self.setpoint = 0.0;
        }
        if self.k_i == 0.0 {
            self.k_i = Self::K_I_DISABLED;
        }
        self.k_p = Self::K_P.clamp(self.k_p);
        self.k_i = Self::K_I.clamp(self.k_i);
        self.k_d = Self::K_D.clamp(self.k_d);
        self.cycle = Self::CYCLE.clamp(self.cycle);
        self.valve = Self::VALVE.clamp(self.valve);
        self.dead_zone = Self::DEAD_ZONE.clamp(self.dead_zone);

        // NaN != NaN, so compare bit patterns for the float fields
        !same_bits(&before, self)
    }

    /// Copy with every field clamped.
    pub fn clamped(&self) -> Self {
        let mut p = self.clone();
        p.clamp();
        p
    }

    /// Whether the PID loop is in charge (enabled and automatic).
    pub fn is_automatic(&self) -> bool {
        self.on_off && self.auto_hand
    }

    /// Whether every numeric field already lies in its range.
    pub fn in_range(&self) -> bool {
        self.setpoint.is_finite()
            && Self::K_P.contains(self.k_p)
            && Self::K_I.contains(self.k_i)
            && Self::K_D.contains(self.k_d)
            && Self::CYCLE.contains(self.cycle)
            && Self::VALVE.contains(self.valve)
            && Self::DEAD_ZONE.contains(self.dead_zone)
    }
}

fn same_bits(a: &ControlParameters, b: &ControlParameters) -> bool {
    a.setpoint.to_bits() == b.setpoint.to_bits()
        && a.k_p.to_bits() == b.k_p.to_bits()
        && a.k_i.to_bits() == b.k_i.to_bits()
        && a.k_d.to_bits() == b.k_d.to_bits()
        && a.cycle.to_bits() == b.cycle.to_bits()
        && a.valve.to_bits() == b.valve.to_bits()
        && a.dead_zone.to_bits() == b.dead_zone.to_bits()
}

impl Default for ControlParameters {
    fn default() -> Self {
        Self {
            setpoint: 25.0,
            k_p: 0.5,
            k_i: 1.0,
            k_d: 0.1,
            cycle: 10.0,
            valve: 30.0,
            dead_zone: 5.0,
            on_off: true,
            auto_hand: true,
            hand_up: false,
            hand_down: false,
            accrual: AccrualMode::PerPoll,
        }
    }
}
