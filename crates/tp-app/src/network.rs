//! Best-effort network bootstrap.
//!
//! The controller never needs the network; [`bootstrap`] tries to join once at
//! startup and gives up quietly after the configured timeout.

use std::time::Duration;

use tp_core::Clock;
use tracing::{info, warn};

use crate::error::{AppError, AppResult};

/// Interval between connection checks.
pub const POLL_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkSettings {
    pub ssid: String,
    pub password: String,
    pub timeout: Duration,
}

impl NetworkSettings {
    pub fn new(ssid: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            ssid: ssid.into(),
            password: password.into(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Station-mode network interface.
pub trait NetworkLink {
    fn is_connected(&self) -> bool;

    /// Start joining `ssid`. Completion is observed through
    /// [`is_connected`](Self::is_connected).
    fn begin_connect(&mut self, ssid: &str, password: &str) -> AppResult<()>;

    /// Address assigned to the interface, if connected.
    fn address(&self) -> Option<String>;
}

impl<L: NetworkLink + ?Sized> NetworkLink for &mut L {
    fn is_connected(&self) -> bool {
        (**self).is_connected()
    }

    fn begin_connect(&mut self, ssid: &str, password: &str) -> AppResult<()> {
        (**self).begin_connect(ssid, password)
    }

    fn address(&self) -> Option<String> {
        (**self).address()
    }
}

/// Host link with no radio.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineLink;

impl NetworkLink for OfflineLink {
    fn is_connected(&self) -> bool {
        false
    }

    fn begin_connect(&mut self, _ssid: &str, _password: &str) -> AppResult<()> {
        Err(AppError::Network("no network interface".to_string()))
    }

    fn address(&self) -> Option<String> {
        None
    }
}

/// Join the configured network, polling once per second up to the timeout.
///
/// Returns the assigned address, or `None` on failure.
pub fn bootstrap<L, C>(link: &mut L, settings: &NetworkSettings, clock: &C) -> Option<String>
where
    L: NetworkLink + ?Sized,
    C: Clock + ?Sized,
{
    if link.is_connected() {
        info!(address = ?link.address(), "already connected");
        return link.address();
    }

    info!(ssid = %settings.ssid, "connecting");
    if let Err(e) = link.begin_connect(&settings.ssid, &settings.password) {
        warn!(error = %e, ssid = %settings.ssid, "failed to start network connection");
        return None;
    }

    let start = clock.now();
    while !link.is_connected() {
        let waited = clock
            .now()
            .checked_duration_since(start)
            .unwrap_or_default();
        if waited >= settings.timeout {
            warn!(
                ssid = %settings.ssid,
                timeout_s = settings.timeout.as_secs(),
                "failed to connect"
            );
            return None;
        }
        clock.sleep(POLL_INTERVAL);
    }

    let address = link.address();
    info!(address = ?address, "connected");
    address
}

#[cfg(test)]
mod tests {
    use super::*;
    use tp_core::ManualClock;

    #[test]
    fn offline_link_gives_up_immediately() {
        let clock = ManualClock::new();
        let t0 = clock.now();
        let got = bootstrap(
            &mut OfflineLink,
            &NetworkSettings::new("shop", "pw"),
            &clock,
        );
        assert_eq!(got, None);
        assert_eq!(clock.now(), t0);
    }
}
