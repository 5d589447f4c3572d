//! Closed-loop simulation against the host plant.

use std::convert::Infallible;

use serde::Serialize;
use tp_core::{Clock, ManualClock, SystemClock};
use tracing::info;

use crate::control_loop::{ControlLoop, LoopSummary};
use crate::error::AppResult;
use crate::network::{OfflineLink, bootstrap};
use crate::plant::{PlantSensor, PlantSettings, PlantValve, SimPlant};
use crate::runtime_compile::ControllerRuntime;
use crate::status::StatusSink;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulateOptions {
    pub iterations: u64,
    /// Sleep for real between iterations instead of advancing virtual time.
    pub realtime: bool,
}

impl Default for SimulateOptions {
    fn default() -> Self {
        Self {
            iterations: 1_000,
            realtime: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationReport {
    pub summary: LoopSummary,
    pub final_temperature: f64,
    pub final_position: f64,
    pub network_address: Option<String>,
}

/// Run the configured controller against the simulated plant.
///
/// Uses the configured plant, or the default one when none is configured.
pub fn simulate<K: StatusSink>(
    runtime: &ControllerRuntime,
    options: SimulateOptions,
    status: K,
) -> AppResult<SimulationReport> {
    if options.realtime {
        run_with_clock(runtime, options, status, SystemClock)
    } else {
        run_with_clock(runtime, options, status, ManualClock::new())
    }
}

/// Run the configured controller against the simulated plant on the wall
/// clock until the process is stopped.
pub fn run<K: StatusSink>(runtime: &ControllerRuntime, status: K) -> AppResult<Infallible> {
    run_forever_with_clock(runtime, status, SystemClock)
}

fn run_forever_with_clock<C, K>(
    runtime: &ControllerRuntime,
    status: K,
    clock: C,
) -> AppResult<Infallible>
where
    C: Clock + Clone,
    K: StatusSink,
{
    let (mut control, _plant, _address) = prepare(runtime, status, clock)?;
    info!(name = %runtime.name, "running until stopped");
    control.run_forever()
}

fn run_with_clock<C, K>(
    runtime: &ControllerRuntime,
    options: SimulateOptions,
    status: K,
    clock: C,
) -> AppResult<SimulationReport>
where
    C: Clock + Clone,
    K: StatusSink,
{
    let (mut control, plant, network_address) = prepare(runtime, status, clock)?;
    info!(iterations = options.iterations, "starting simulation");
    let summary = control.run_for(options.iterations);

    Ok(SimulationReport {
        summary,
        final_temperature: plant.temperature(),
        final_position: plant.position(),
        network_address,
    })
}

type PlantLoop<C, K> = ControlLoop<C, PlantSensor<C>, PlantValve<C>, K>;

/// Network bootstrap, plant and loop construction shared by both run modes.
fn prepare<C, K>(
    runtime: &ControllerRuntime,
    status: K,
    clock: C,
) -> AppResult<(PlantLoop<C, K>, SimPlant<C>, Option<String>)>
where
    C: Clock + Clone,
    K: StatusSink,
{
    let network_address = runtime
        .network
        .as_ref()
        .and_then(|settings| bootstrap(&mut OfflineLink, settings, &clock));

    let plant_settings = runtime.plant.unwrap_or_else(|| PlantSettings {
        valve_time: std::time::Duration::from_secs_f64(runtime.params.clamped().valve),
        sensor_timeout: runtime.sensor_timeout,
        ..PlantSettings::default()
    });
    let plant = SimPlant::new(plant_settings, clock.clone())?;

    info!(
        name = %runtime.name,
        increase = %runtime.pins.increase,
        decrease = %runtime.pins.decrease,
        sensor = %runtime.pins.sensor,
        dropout = plant_settings.dropout,
        "controller wired to simulated plant"
    );

    let control = ControlLoop::new(
        clock,
        plant.sensor(),
        plant.valve(),
        status,
        runtime.params.clone(),
        runtime.settings,
    )?;
    Ok((control, plant, network_address))
}
