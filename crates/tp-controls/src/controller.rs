//! Single-owner controller aggregate.
//!
//! [`Controller`] bundles the parameters, engine and driver so that one
//! control step is a single call with exclusive access to all state.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tp_core::{Real, ensure_finite};
use tracing::warn;

use crate::driver::RelayDriver;
use crate::engine::{CycleEngine, CyclePhase, UpdateOutcome};
use crate::params::ControlParameters;
use crate::relay::{RelayPair, RelayState};

/// Controller state after one step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Process value used for this step (last good reading).
    pub process_value: Real,
    pub e1: Real,
    pub d_t: Real,
    pub sum_d_t: Real,
    pub travel_up: Real,
    pub travel_down: Real,
    /// Seconds elapsed in the current cycle.
    pub cycle_timer: Real,
    pub phase: CyclePhase,
    pub up: bool,
    pub down: bool,
    pub outputs: RelayState,
    pub sensor_available: bool,
    pub pulse_fired: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Controller {
    params: ControlParameters,
    engine: CycleEngine,
    driver: RelayDriver,
    process_value: Real,
}

impl Controller {
    pub fn new(params: ControlParameters) -> Self {
        Self {
            params,
            engine: CycleEngine::new(),
            driver: RelayDriver::new(),
            process_value: 0.0,
        }
    }

    pub fn params(&self) -> &ControlParameters {
        &self.params
    }

    /// Live tuning access. Values are clamped on the next step.
    pub fn params_mut(&mut self) -> &mut ControlParameters {
        &mut self.params
    }

    pub fn engine(&self) -> &CycleEngine {
        &self.engine
    }

    pub fn driver(&self) -> &RelayDriver {
        &self.driver
    }

    /// Last good process value (0 until the first reading).
    pub fn process_value(&self) -> Real {
        self.process_value
    }

    /// Run one control step.
    ///
    /// `reading` is the sensor value for this iteration; `None` or a
    /// non-finite value marks the sensor unavailable, which keeps the last
    /// process value and switches both relays off.
    pub fn step<R: RelayPair + ?Sized>(
        &mut self,
        reading: Option<Real>,
        now: Instant,
        relays: &mut R,
    ) -> Snapshot {
        let sensor_available = match reading.map(|v| ensure_finite(v, "temperature reading")) {
            Some(Ok(v)) => {
                self.process_value = v;
                true
            }
            Some(Err(e)) => {
                warn!(error = %e, "discarding temperature reading");
                false
            }
            None => false,
        };

        let outcome = self.engine.update(&mut self.params, self.process_value, now);
        self.driver
            .control(&mut self.engine, &self.params, sensor_available, relays);
        self.snapshot(sensor_available, outcome)
    }

    fn snapshot(&self, sensor_available: bool, outcome: UpdateOutcome) -> Snapshot {
        let travel = self.engine.travel();
        Snapshot {
            process_value: self.process_value,
            e1: self.engine.e1(),
            d_t: self.engine.d_t(),
            sum_d_t: self.engine.sum_d_t(),
            travel_up: travel.up,
            travel_down: travel.down,
            cycle_timer: self.engine.cycle_timer(),
            phase: self.engine.phase(),
            up: self.driver.up(),
            down: self.driver.down(),
            outputs: self.driver.outputs(),
            sensor_available,
            pulse_fired: outcome.pulse_fired,
        }
    }
}
