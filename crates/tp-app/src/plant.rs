//! Host-side plant: a motorized valve feeding a first-order thermal lag.
//!
//! [`SimPlant`] hands out a [`PlantSensor`] and a [`PlantValve`] that share one
//! state. Every access first integrates the state up to the clock's current
//! instant using the relay command that was in force, so the plant follows
//! whatever time line the loop runs on.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use tp_controls::{ControlResult, RelayPair, TemperatureSource};
use tp_core::Clock;
use tracing::trace;

use crate::error::{AppError, AppResult};

/// Plant constants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlantSettings {
    /// Temperature with the valve fully closed.
    pub ambient: f64,
    /// Temperature rise with the valve fully open.
    pub gain: f64,
    /// Thermal time constant.
    pub tau: Duration,
    /// Time for the valve to travel from closed to open.
    pub valve_time: Duration,
    pub initial_temperature: f64,
    /// Reported bound on a sensor read.
    pub sensor_timeout: Duration,
    /// Start with the sensor unavailable.
    pub dropout: bool,
}

impl Default for PlantSettings {
    fn default() -> Self {
        Self {
            ambient: 15.0,
            gain: 20.0,
            tau: Duration::from_secs(30),
            valve_time: Duration::from_secs(30),
            initial_temperature: 15.0,
            sensor_timeout: Duration::from_secs(1),
            dropout: false,
        }
    }
}

#[derive(Debug)]
struct PlantState {
    settings: PlantSettings,
    temperature: f64,
    /// Valve opening in [0, 1].
    position: f64,
    increase: bool,
    decrease: bool,
    dropout: bool,
    last: Instant,
}

impl PlantState {
    fn advance(&mut self, now: Instant) {
        let Some(dt) = now.checked_duration_since(self.last) else {
            self.last = now;
            return;
        };
        self.last = now;
        let dt = dt.as_secs_f64();
        if dt == 0.0 {
            return;
        }

        let drive = f64::from(u8::from(self.increase)) - f64::from(u8::from(self.decrease));
        let rate = 1.0 / self.settings.valve_time.as_secs_f64();
        self.position = (self.position + drive * rate * dt).clamp(0.0, 1.0);

        let target = self.settings.ambient + self.settings.gain * self.position;
        let decay = (-dt / self.settings.tau.as_secs_f64()).exp();
        self.temperature = target + (self.temperature - target) * decay;
        trace!(
            temperature = self.temperature,
            position = self.position,
            "plant advanced"
        );
    }
}

/// Simulated plant driven by a clock.
#[derive(Debug, Clone)]
pub struct SimPlant<C> {
    state: Rc<RefCell<PlantState>>,
    clock: C,
}

impl<C: Clock + Clone> SimPlant<C> {
    pub fn new(settings: PlantSettings, clock: C) -> AppResult<Self> {
        if settings.tau.is_zero() {
            return Err(AppError::InvalidInput(
                "plant time constant must be positive".to_string(),
            ));
        }
        if settings.valve_time.is_zero() {
            return Err(AppError::InvalidInput(
                "valve travel time must be positive".to_string(),
            ));
        }
        if !(settings.ambient.is_finite()
            && settings.gain.is_finite()
            && settings.initial_temperature.is_finite())
        {
            return Err(AppError::InvalidInput(
                "plant temperatures must be finite".to_string(),
            ));
        }

        let state = PlantState {
            settings,
            temperature: settings.initial_temperature,
            position: 0.0,
            increase: false,
            decrease: false,
            dropout: settings.dropout,
            last: clock.now(),
        };
        Ok(Self {
            state: Rc::new(RefCell::new(state)),
            clock,
        })
    }

    pub fn sensor(&self) -> PlantSensor<C> {
        PlantSensor {
            state: Rc::clone(&self.state),
            clock: self.clock.clone(),
        }
    }

    pub fn valve(&self) -> PlantValve<C> {
        PlantValve {
            state: Rc::clone(&self.state),
            clock: self.clock.clone(),
        }
    }

    /// Make the sensor report "unavailable" until cleared.
    pub fn set_dropout(&self, dropout: bool) {
        self.state.borrow_mut().dropout = dropout;
    }

    pub fn temperature(&self) -> f64 {
        let mut state = self.state.borrow_mut();
        state.advance(self.clock.now());
        state.temperature
    }

    pub fn position(&self) -> f64 {
        let mut state = self.state.borrow_mut();
        state.advance(self.clock.now());
        state.position
    }
}

/// Temperature sensor on the simulated plant.
#[derive(Debug, Clone)]
pub struct PlantSensor<C> {
    state: Rc<RefCell<PlantState>>,
    clock: C,
}

impl<C: Clock> TemperatureSource for PlantSensor<C> {
    fn read(&mut self) -> ControlResult<Option<f64>> {
        let mut state = self.state.borrow_mut();
        state.advance(self.clock.now());
        if state.dropout {
            return Ok(None);
        }
        Ok(Some(state.temperature))
    }

    fn timeout(&self) -> Duration {
        self.state.borrow().settings.sensor_timeout
    }
}

/// Valve motor relays on the simulated plant.
#[derive(Debug, Clone)]
pub struct PlantValve<C> {
    state: Rc<RefCell<PlantState>>,
    clock: C,
}

impl<C: Clock> RelayPair for PlantValve<C> {
    fn set_increase(&mut self, on: bool) {
        let mut state = self.state.borrow_mut();
        state.advance(self.clock.now());
        state.increase = on;
    }

    fn set_decrease(&mut self, on: bool) {
        let mut state = self.state.borrow_mut();
        state.advance(self.clock.now());
        state.decrease = on;
    }
}
