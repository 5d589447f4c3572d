//! Fixed-rate control loop: read, step, report, sleep.

use std::time::{Duration, Instant};

use serde::Serialize;
use tp_controls::{
    ControlError, ControlParameters, ControlResult, Controller, RelayPair, Snapshot,
    TemperatureSource,
};
use tp_core::Clock;
use tracing::{debug, warn};

use crate::status::{StatusReport, StatusSink};

/// Loop pacing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopSettings {
    pub poll_interval: Duration,
    /// Report status every this many iterations.
    pub status_every: u32,
}

impl Default for LoopSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(10),
            status_every: 1,
        }
    }
}

/// Counters over a bounded run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LoopSummary {
    pub iterations: u64,
    pub increase_ticks: u64,
    pub decrease_ticks: u64,
    pub unavailable_ticks: u64,
    pub pulses_fired: u64,
    pub last: Option<Snapshot>,
}

impl LoopSummary {
    fn record(&mut self, snapshot: &Snapshot) {
        self.iterations += 1;
        self.increase_ticks += u64::from(snapshot.outputs.increase);
        self.decrease_ticks += u64::from(snapshot.outputs.decrease);
        self.unavailable_ticks += u64::from(!snapshot.sensor_available);
        self.pulses_fired += u64::from(snapshot.pulse_fired);
        self.last = Some(*snapshot);
    }
}

/// Single-threaded control loop owning the controller and its collaborators.
pub struct ControlLoop<C, S, R, K> {
    clock: C,
    source: S,
    relays: R,
    status: K,
    controller: Controller,
    settings: LoopSettings,
    started: Instant,
    iterations: u64,
}

impl<C, S, R, K> ControlLoop<C, S, R, K>
where
    C: Clock,
    S: TemperatureSource,
    R: RelayPair,
    K: StatusSink,
{
    /// Build a loop and switch both relays off.
    pub fn new(
        clock: C,
        source: S,
        mut relays: R,
        status: K,
        params: ControlParameters,
        settings: LoopSettings,
    ) -> ControlResult<Self> {
        if settings.poll_interval.is_zero() {
            return Err(ControlError::InvalidArg {
                what: "poll interval must be positive",
            });
        }
        if settings.status_every == 0 {
            return Err(ControlError::InvalidArg {
                what: "status interval must be positive",
            });
        }

        relays.all_off();
        let started = clock.now();
        Ok(Self {
            clock,
            source,
            relays,
            status,
            controller: Controller::new(params),
            settings,
            started,
            iterations: 0,
        })
    }

    /// Run one iteration and return the resulting controller state.
    pub fn run_once(&mut self) -> Snapshot {
        let reading = self.read_sensor();
        let now = self.clock.now();
        let snapshot = self.controller.step(reading, now, &mut self.relays);
        self.iterations += 1;

        if self.iterations % u64::from(self.settings.status_every) == 0 {
            let elapsed = now
                .checked_duration_since(self.started)
                .unwrap_or_default()
                .as_secs_f64();
            self.status
                .report(&StatusReport::from_snapshot(&snapshot, elapsed));
        }

        self.clock.sleep(self.settings.poll_interval);
        snapshot
    }

    pub fn run_for(&mut self, iterations: u64) -> LoopSummary {
        let mut summary = LoopSummary::default();
        for _ in 0..iterations {
            let snapshot = self.run_once();
            summary.record(&snapshot);
        }
        summary
    }

    pub fn run_forever(&mut self) -> ! {
        loop {
            self.run_once();
        }
    }

    fn read_sensor(&mut self) -> Option<f64> {
        let timeout = self.source.timeout();
        let before = self.clock.now();
        let reading = match self.source.read() {
            Ok(reading) => reading,
            Err(e) => {
                warn!(error = %e, "error reading temperature");
                return None;
            }
        };

        let took = self
            .clock
            .now()
            .checked_duration_since(before)
            .unwrap_or_default();
        if took > timeout {
            warn!(
                took_ms = took.as_millis() as u64,
                timeout_ms = timeout.as_millis() as u64,
                "temperature read exceeded its timeout"
            );
            return None;
        }
        if reading.is_none() {
            debug!("temperature unavailable");
        }
        reading
    }

    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    /// Live tuning access.
    pub fn controller_mut(&mut self) -> &mut Controller {
        &mut self.controller
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn relays(&self) -> &R {
        &self.relays
    }

    pub fn status(&self) -> &K {
        &self.status
    }

    pub fn iterations(&self) -> u64 {
        self.iterations
    }
}
