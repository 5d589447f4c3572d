//! Configuration schema definitions.

use serde::{Deserialize, Serialize};
use tp_core::PinId;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ControllerConfig {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default)]
    pub control: ControlDef,
    #[serde(default)]
    pub pins: PinsDef,
    #[serde(default)]
    pub timing: LoopDef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<NetworkDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plant: Option<PlantDef>,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            name: default_name(),
            control: ControlDef::default(),
            pins: PinsDef::default(),
            timing: LoopDef::default(),
            network: None,
            plant: None,
        }
    }
}

fn default_version() -> u32 {
    crate::LATEST_VERSION
}

fn default_name() -> String {
    "thermopulse".to_string()
}

/// Controller tunables as they appear on disk.
///
/// Out-of-range values are accepted here; the controller clamps them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ControlDef {
    pub setpoint: f64,
    pub k_p: f64,
    pub k_i: f64,
    pub k_d: f64,
    pub cycle_time: f64,
    pub valve_time: f64,
    pub dead_zone: f64,
    pub on_off: bool,
    pub auto_hand: bool,
    pub hand_up: bool,
    pub hand_down: bool,
    pub accrual: AccrualDef,
}

impl Default for ControlDef {
    fn default() -> Self {
        Self {
            setpoint: 25.0,
            k_p: 0.5,
            k_i: 1.0,
            k_d: 0.1,
            cycle_time: 10.0,
            valve_time: 30.0,
            dead_zone: 5.0,
            on_off: true,
            auto_hand: true,
            hand_up: false,
            hand_down: false,
            accrual: AccrualDef::PerPoll,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum AccrualDef {
    #[default]
    PerPoll,
    SubTick,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PinsDef {
    pub increase: PinId,
    pub decrease: PinId,
    pub sensor: PinId,
}

impl Default for PinsDef {
    fn default() -> Self {
        Self {
            increase: PinId::new(3),
            decrease: PinId::new(4),
            sensor: PinId::new(21),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoopDef {
    pub poll_interval_ms: u64,
    pub sensor_timeout_ms: u64,
    /// Emit a status line every this many iterations.
    pub status_every: u32,
}

impl Default for LoopDef {
    fn default() -> Self {
        Self {
            poll_interval_ms: 10,
            sensor_timeout_ms: 1000,
            status_every: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NetworkDef {
    pub ssid: String,
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_network_timeout")]
    pub timeout_s: u64,
}

fn default_network_timeout() -> u64 {
    10
}

/// Host-side plant used by `simulate`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlantDef {
    /// Temperature with the valve fully closed.
    pub ambient: f64,
    /// Temperature rise with the valve fully open.
    pub gain: f64,
    /// First-order time constant (seconds).
    pub tau_s: f64,
    pub initial_temperature: f64,
    /// Start with the sensor unavailable.
    pub dropout: bool,
}

impl Default for PlantDef {
    fn default() -> Self {
        Self {
            ambient: 15.0,
            gain: 20.0,
            tau_s: 30.0,
            initial_temperature: 15.0,
            dropout: false,
        }
    }
}
