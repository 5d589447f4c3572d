//! tp-core: shared foundation for thermopulse.
//!
//! Contains:
//! - numeric (Real + tolerances + clamping helpers)
//! - clock (monotonic time source, real and manual)
//! - ids (relay/sensor pin identifiers)
//! - error (shared error types)

pub mod clock;
pub mod error;
pub mod ids;
pub mod numeric;

// Re-exports: nice ergonomics for downstream crates
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{TpError, TpResult};
pub use ids::*;
pub use numeric::*;
