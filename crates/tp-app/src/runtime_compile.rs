//! Conversion of the on-disk configuration into runtime settings.

use std::time::Duration;

use tp_controls::{AccrualMode, ControlParameters};
use tp_core::PinId;
use tp_project::schema::{AccrualDef, ControlDef, ControllerConfig, LoopDef, NetworkDef, PlantDef};

use crate::control_loop::LoopSettings;
use crate::error::{AppError, AppResult};
use crate::network::NetworkSettings;
use crate::plant::PlantSettings;

/// Everything needed to start a control loop.
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerRuntime {
    pub name: String,
    pub params: ControlParameters,
    pub settings: LoopSettings,
    pub sensor_timeout: Duration,
    pub pins: PinAssignment,
    pub network: Option<NetworkSettings>,
    pub plant: Option<PlantSettings>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinAssignment {
    pub increase: PinId,
    pub decrease: PinId,
    pub sensor: PinId,
}

pub fn compile_controller(config: &ControllerConfig) -> AppResult<ControllerRuntime> {
    tp_project::validate_config(config)
        .map_err(|e| AppError::Config(format!("Validation failed: {}", e)))?;

    let params = control_parameters(&config.control);
    let sensor_timeout = Duration::from_millis(config.timing.sensor_timeout_ms);
    let plant = config
        .plant
        .as_ref()
        .map(|p| plant_settings(p, &params, sensor_timeout))
        .transpose()?;

    Ok(ControllerRuntime {
        name: config.name.clone(),
        settings: loop_settings(&config.timing),
        sensor_timeout,
        pins: PinAssignment {
            increase: config.pins.increase,
            decrease: config.pins.decrease,
            sensor: config.pins.sensor,
        },
        network: config.network.as_ref().map(network_settings),
        plant,
        params,
    })
}

/// Tunables are passed through unclamped; the controller clamps on use.
pub fn control_parameters(def: &ControlDef) -> ControlParameters {
    ControlParameters {
        setpoint: def.setpoint,
        k_p: def.k_p,
        k_i: def.k_i,
        k_d: def.k_d,
        cycle: def.cycle_time,
        valve: def.valve_time,
        dead_zone: def.dead_zone,
        on_off: def.on_off,
        auto_hand: def.auto_hand,
        hand_up: def.hand_up,
        hand_down: def.hand_down,
        accrual: match def.accrual {
            AccrualDef::PerPoll => AccrualMode::PerPoll,
            AccrualDef::SubTick => AccrualMode::SubTick,
        },
    }
}

pub fn loop_settings(def: &LoopDef) -> LoopSettings {
    LoopSettings {
        poll_interval: Duration::from_millis(def.poll_interval_ms),
        status_every: def.status_every,
    }
}

pub fn network_settings(def: &NetworkDef) -> NetworkSettings {
    NetworkSettings {
        ssid: def.ssid.clone(),
        password: def.password.clone(),
        timeout: Duration::from_secs(def.timeout_s),
    }
}

/// The simulated valve travels at the clamped valve time.
pub fn plant_settings(
    def: &PlantDef,
    params: &ControlParameters,
    sensor_timeout: Duration,
) -> AppResult<PlantSettings> {
    let tau = Duration::try_from_secs_f64(def.tau_s)
        .map_err(|e| AppError::Config(format!("plant.tau_s = {}: {}", def.tau_s, e)))?;
    Ok(PlantSettings {
        ambient: def.ambient,
        gain: def.gain,
        tau,
        valve_time: Duration::from_secs_f64(params.clamped().valve),
        initial_temperature: def.initial_temperature,
        sensor_timeout,
        dropout: def.dropout,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_compile() {
        let runtime = compile_controller(&ControllerConfig::default()).unwrap();
        assert_eq!(runtime.params, ControlParameters::default());
        assert_eq!(runtime.settings.poll_interval, Duration::from_millis(10));
        assert_eq!(runtime.sensor_timeout, Duration::from_secs(1));
        assert_eq!(runtime.pins.sensor, PinId::new(21));
        assert!(runtime.network.is_none());
        assert!(runtime.plant.is_none());
    }

    #[test]
    fn plant_valve_time_is_clamped() {
        let mut config = ControllerConfig::default();
        config.control.valve_time = 5.0;
        config.plant = Some(PlantDef::default());
        let runtime = compile_controller(&config).unwrap();

        assert_eq!(runtime.params.valve, 5.0);
        let plant = runtime.plant.unwrap();
        assert_eq!(plant.valve_time, Duration::from_secs(15));
        assert_eq!(plant.tau, Duration::from_secs(30));
    }

    #[test]
    fn plant_dropout_is_carried() {
        let config = ControllerConfig {
            plant: Some(PlantDef {
                dropout: true,
                ..PlantDef::default()
            }),
            ..ControllerConfig::default()
        };
        let runtime = compile_controller(&config).unwrap();
        assert!(runtime.plant.unwrap().dropout);
    }

    #[test]
    fn huge_time_constant_is_an_error() {
        let def = PlantDef {
            tau_s: 1.0e20,
            ..PlantDef::default()
        };
        let config = ControllerConfig {
            plant: Some(def.clone()),
            ..ControllerConfig::default()
        };
        match compile_controller(&config) {
            Err(AppError::Config(msg)) => assert!(msg.contains("tau_s")),
            other => panic!("expected config error, got {other:?}"),
        }

        let result = plant_settings(&def, &ControlParameters::default(), Duration::from_secs(1));
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn invalid_config_fails() {
        let mut config = ControllerConfig::default();
        config.timing.poll_interval_ms = 0;
        assert!(matches!(
            compile_controller(&config),
            Err(AppError::Config(_))
        ));
    }
}
