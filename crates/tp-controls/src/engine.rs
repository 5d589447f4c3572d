//! PID cycle engine.
//!
//! Computes a velocity-form PID increment once per control cycle and keeps the
//! timing state the relay driver needs:
//!
//! - **Cycle timer**: latched when a pulse fires, ends after `cycle` seconds
//! - **Accumulated effort** (`sum_d_t`): carried across cycles until it
//!   saturates at ±0.5, cleared inside the dead zone
//! - **Travel window**: seconds of actuator travel already spent per direction
//! - **Heartbeat**: an independent 100 ms sub-tick
//!
//! Outside automatic mode (disabled, or manual) the engine collapses to a
//! neutral state on every update.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tp_core::Real;
use tracing::{debug, trace};

use crate::params::ControlParameters;
use crate::timer::LatchTimer;

/// Accumulated effort at which a direction counts as demanded.
pub const SATURATION: Real = 0.5;

/// Heartbeat period.
pub const SUB_TICK: Duration = Duration::from_millis(100);

/// Phase of the control cycle as of the last update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CyclePhase {
    /// Timer at zero, next update fires a pulse.
    #[default]
    IdleWaitingForCycle,
    /// This update computed a new PID increment.
    PulseFired,
    /// Pulse already fired, waiting for the cycle to elapse.
    CycleRunning,
}

/// Actuator travel (seconds) consumed in each direction in the current window.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TravelWindow {
    pub up: Real,
    pub down: Real,
}

impl TravelWindow {
    pub fn reset(&mut self) {
        self.up = 0.0;
        self.down = 0.0;
    }
}

/// What happened during one [`CycleEngine::update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UpdateOutcome {
    /// A PID increment was computed (automatic mode only).
    pub pulse_fired: bool,
    /// The cycle timer reached `cycle` and was reset.
    pub cycle_ended: bool,
    /// At least one parameter had to be clamped.
    pub clamped: bool,
    /// The time source went backwards and a timer was re-latched.
    pub clock_anomaly: bool,
}

/// PID pulse computation and cycle timing state.
#[derive(Debug, Clone, Default)]
pub struct CycleEngine {
    e1: Real,
    e2: Real,
    e3: Real,
    d_t: Real,
    sum_d_t: Real,
    travel: TravelWindow,
    cycle: LatchTimer,
    sub_tick: LatchTimer,
    fired_now: bool,
}

impl CycleEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the engine with the latest process value.
    ///
    /// `params` is clamped in place before use.
    pub fn update(
        &mut self,
        params: &mut ControlParameters,
        process_value: Real,
        now: Instant,
    ) -> UpdateOutcome {
        let mut outcome = UpdateOutcome::default();
        self.fired_now = false;

        if params.clamp() {
            outcome.clamped = true;
            debug!(
                k_p = params.k_p,
                k_i = params.k_i,
                k_d = params.k_d,
                cycle = params.cycle,
                valve = params.valve,
                dead_zone = params.dead_zone,
                "control parameters clamped into range"
            );
        }
        self.e1 = params.setpoint - process_value;

        if self.cycle.is_zero() && !self.cycle.pulse() {
            self.fire_pulse(params, now);
            outcome.pulse_fired = true;
        }

        if !self.cycle.advance(now) {
            outcome.clock_anomaly = true;
            debug!("cycle timer re-latched after clock anomaly");
        }

        if params.is_automatic() {
            if self.cycle.elapsed_secs() >= params.cycle {
                self.cycle.set_pulse(false);
                self.cycle.reset();
                outcome.cycle_ended = true;
                if self.is_saturated() {
                    self.sum_d_t = 0.0;
                }
            }
        } else {
            self.neutralize();
            outcome.pulse_fired = false;
        }

        self.advance_sub_tick(now, &mut outcome);
        outcome
    }

    fn fire_pulse(&mut self, p: &ControlParameters, now: Instant) {
        self.cycle.set_pulse(true);
        self.cycle.latch(now);
        self.fired_now = true;

        self.d_t = p.k_p
            * ((self.e1 - self.e2)
                + p.cycle * self.e2 / p.k_i
                + p.k_d * (self.e1 - 2.0 * self.e2 + self.e3) / p.cycle)
            * p.valve
            / 100.0;

        // History shifts even when the dead zone zeroes the pulse below.
        self.e3 = self.e2;
        self.e2 = self.e1;

        self.sum_d_t += self.d_t;
        if self.sum_d_t >= SATURATION {
            self.travel.down = 0.0;
        }
        if self.sum_d_t <= -SATURATION {
            self.travel.up = 0.0;
        }

        if -p.dead_zone < self.e1 && self.e1 < p.dead_zone {
            self.d_t = 0.0;
            self.sum_d_t = 0.0;
        }

        trace!(
            e1 = self.e1,
            d_t = self.d_t,
            sum_d_t = self.sum_d_t,
            "pid pulse"
        );
    }

    fn neutralize(&mut self) {
        self.fired_now = false;
        self.d_t = 0.0;
        self.sum_d_t = 0.0;
        self.cycle.set_pulse(false);
        self.cycle.reset();
        self.e3 = self.e1;
        self.e2 = self.e1;
        self.travel.reset();
    }

    fn advance_sub_tick(&mut self, now: Instant, outcome: &mut UpdateOutcome) {
        if self.sub_tick.is_zero() && !self.sub_tick.pulse() {
            self.sub_tick.set_pulse(true);
            self.sub_tick.latch(now);
        } else {
            self.sub_tick.set_pulse(false);
        }

        if !self.sub_tick.advance_or_zero(now) {
            outcome.clock_anomaly = true;
        } else if self.sub_tick.elapsed() >= SUB_TICK {
            self.sub_tick.reset();
        }
    }

    fn is_saturated(&self) -> bool {
        self.sum_d_t >= SATURATION || self.sum_d_t <= -SATURATION
    }

    /// Current error (setpoint minus process value).
    pub fn e1(&self) -> Real {
        self.e1
    }

    /// Error at the previous pulse.
    pub fn e2(&self) -> Real {
        self.e2
    }

    /// Error two pulses back.
    pub fn e3(&self) -> Real {
        self.e3
    }

    /// Increment computed at the last pulse (travel seconds).
    pub fn d_t(&self) -> Real {
        self.d_t
    }

    /// Effort accumulated over cycles (travel seconds).
    pub fn sum_d_t(&self) -> Real {
        self.sum_d_t
    }

    pub fn travel(&self) -> &TravelWindow {
        &self.travel
    }

    pub fn travel_mut(&mut self) -> &mut TravelWindow {
        &mut self.travel
    }

    /// Seconds elapsed in the current cycle.
    pub fn cycle_timer(&self) -> Real {
        self.cycle.elapsed_secs()
    }

    /// Whether the 100 ms heartbeat fired on the last update.
    pub fn heartbeat(&self) -> bool {
        self.sub_tick.pulse()
    }

    pub fn phase(&self) -> CyclePhase {
        if self.fired_now {
            CyclePhase::PulseFired
        } else if self.cycle.pulse() {
            CyclePhase::CycleRunning
        } else {
            CyclePhase::IdleWaitingForCycle
        }
    }
}
