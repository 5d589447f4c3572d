//! Application layer for thermopulse.
//!
//! Wires the controller to its collaborators: a clock, a temperature source,
//! a relay pair and a status sink. Also holds the host-side plant simulation,
//! the network bootstrap and the configuration-to-runtime compilation shared
//! by the CLI.

pub mod control_loop;
pub mod error;
pub mod network;
pub mod plant;
pub mod runtime_compile;
pub mod simulate;
pub mod status;

pub use control_loop::{ControlLoop, LoopSettings, LoopSummary};
pub use error::{AppError, AppResult};
pub use network::{NetworkLink, NetworkSettings, OfflineLink, bootstrap};
pub use plant::{PlantSensor, PlantSettings, PlantValve, SimPlant};
pub use runtime_compile::{ControllerRuntime, PinAssignment, compile_controller};
pub use simulate::{SimulateOptions, SimulationReport, run, simulate};
pub use status::{MemoryStatus, StatusReport, StatusSink, TracingStatus};

use std::path::Path;

/// Load, validate and compile a configuration file.
pub fn load_runtime(path: &Path) -> AppResult<ControllerRuntime> {
    let config = tp_project::load(path)?;
    compile_controller(&config)
}
