//! Time-proportioning PID control for a two-relay actuator.
//!
//! This crate holds the control core of thermopulse: a discrete PID term
//! computed once per control cycle, converted into "increase" / "decrease"
//! relay pulses whose total on-time per dead-zone window is bounded by the
//! valve travel time.
//!
//! # Architecture
//!
//! - [`ControlParameters`]: live-tunable setpoint, gains, timing and mode flags,
//!   clamped into range on every evaluation
//! - [`CycleEngine`]: PID pulse computation and the cycle / 100 ms timers
//! - [`RelayDriver`]: up/down decisions with mutual exclusion and travel limits
//! - [`Controller`]: single-owner aggregate that runs one control step
//! - [`TemperatureSource`] / [`RelayPair`]: hardware seams, with in-memory
//!   implementations for tests and simulation
//!
//! # Design Principles
//!
//! - **Single Owner**: all mutable state lives in one [`Controller`]
//! - **Monotonic Time**: timers are driven by [`std::time::Instant`] values
//!   supplied by the caller, never read internally
//! - **Hardware Free**: nothing here touches a bus or a pin

pub mod controller;
pub mod driver;
pub mod engine;
pub mod error;
pub mod params;
pub mod relay;
pub mod source;
pub mod timer;

pub use controller::{Controller, Snapshot};
pub use driver::{RelayDriver, TRAVEL_QUANTUM};
pub use engine::{CycleEngine, CyclePhase, TravelWindow, UpdateOutcome};
pub use error::{ControlError, ControlResult};
pub use params::{AccrualMode, ControlParameters, ParamRange};
pub use relay::{MemoryRelays, RelayPair, RelayState};
pub use source::{FixedSource, ScriptedSource, TemperatureSource};
pub use timer::LatchTimer;
