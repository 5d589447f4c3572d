//! Configuration validation logic.

use std::collections::HashMap;

use tp_core::PinId;

use crate::schema::{ControllerConfig, LoopDef, NetworkDef, PinsDef, PlantDef};

/// Longest accepted plant time constant, in seconds.
pub const MAX_TAU_S: f64 = 1.0e6;

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Pin {pin} assigned to both {first} and {second}")]
    DuplicatePin {
        pin: PinId,
        first: &'static str,
        second: &'static str,
    },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

pub fn validate_config(config: &ControllerConfig) -> Result<(), ValidationError> {
    if config.version > crate::LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: config.version,
        });
    }

    validate_pins(&config.pins)?;
    validate_loop(&config.timing)?;
    if let Some(network) = &config.network {
        validate_network(network)?;
    }
    if let Some(plant) = &config.plant {
        validate_plant(plant)?;
    }
    Ok(())
}

fn validate_pins(pins: &PinsDef) -> Result<(), ValidationError> {
    let mut seen: HashMap<PinId, &'static str> = HashMap::new();
    for (role, pin) in [
        ("increase", pins.increase),
        ("decrease", pins.decrease),
        ("sensor", pins.sensor),
    ] {
        if let Some(first) = seen.insert(pin, role) {
            return Err(ValidationError::DuplicatePin {
                pin,
                first,
                second: role,
            });
        }
    }
    Ok(())
}

fn validate_loop(timing: &LoopDef) -> Result<(), ValidationError> {
    if timing.poll_interval_ms == 0 {
        return Err(invalid("timing.poll_interval_ms", 0, "must be positive"));
    }
    if timing.sensor_timeout_ms == 0 {
        return Err(invalid("timing.sensor_timeout_ms", 0, "must be positive"));
    }
    if timing.status_every == 0 {
        return Err(invalid("timing.status_every", 0, "must be positive"));
    }
    Ok(())
}

fn validate_network(network: &NetworkDef) -> Result<(), ValidationError> {
    if network.ssid.trim().is_empty() {
        return Err(invalid("network.ssid", "\"\"", "must not be empty"));
    }
    if network.timeout_s == 0 {
        return Err(invalid("network.timeout_s", 0, "must be positive"));
    }
    Ok(())
}

fn validate_plant(plant: &PlantDef) -> Result<(), ValidationError> {
    for (field, value) in [
        ("plant.ambient", plant.ambient),
        ("plant.gain", plant.gain),
        ("plant.initial_temperature", plant.initial_temperature),
    ] {
        if !value.is_finite() {
            return Err(invalid(field, value, "must be finite"));
        }
    }
    if !(plant.gain > 0.0) {
        return Err(invalid("plant.gain", plant.gain, "must be positive"));
    }
    if !(plant.tau_s.is_finite() && plant.tau_s > 0.0) {
        return Err(invalid("plant.tau_s", plant.tau_s, "must be positive"));
    }
    if plant.tau_s > MAX_TAU_S {
        return Err(invalid("plant.tau_s", plant.tau_s, "exceeds 1e6 s"));
    }
    Ok(())
}

fn invalid(field: &str, value: impl ToString, reason: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
