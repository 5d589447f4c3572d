use std::cell::Cell;
use std::time::Duration;

use tp_app::{AppResult, NetworkLink, NetworkSettings, bootstrap};
use tp_core::{Clock, ManualClock};

/// Link that reports connected after a number of status polls.
struct SlowLink {
    connect_after: Option<u32>,
    polls: Cell<u32>,
    started: bool,
    connected: bool,
}

impl SlowLink {
    fn new(connect_after: Option<u32>) -> Self {
        Self {
            connect_after,
            polls: Cell::new(0),
            started: false,
            connected: false,
        }
    }

    fn already_connected() -> Self {
        Self {
            connected: true,
            ..Self::new(None)
        }
    }
}

impl NetworkLink for SlowLink {
    fn is_connected(&self) -> bool {
        if self.connected {
            return true;
        }
        let polls = self.polls.get() + 1;
        self.polls.set(polls);
        self.started && self.connect_after.is_some_and(|n| polls > n)
    }

    fn begin_connect(&mut self, _ssid: &str, _password: &str) -> AppResult<()> {
        self.started = true;
        Ok(())
    }

    fn address(&self) -> Option<String> {
        if self.connected || self.started {
            Some("192.168.1.50".to_string())
        } else {
            None
        }
    }
}

fn settings() -> NetworkSettings {
    NetworkSettings::new("plant-floor", "secret")
}

#[test]
fn connects_within_timeout() {
    let clock = ManualClock::new();
    let t0 = clock.now();
    let mut link = SlowLink::new(Some(3));

    let address = bootstrap(&mut link, &settings(), &clock);

    assert_eq!(address.as_deref(), Some("192.168.1.50"));
    // The pre-connect check is poll 1; polls 2 and 3 each cost a one-second wait.
    assert_eq!(clock.now() - t0, Duration::from_secs(2));
}

#[test]
fn gives_up_after_timeout() {
    let clock = ManualClock::new();
    let t0 = clock.now();
    let mut link = SlowLink::new(None);

    let address = bootstrap(&mut link, &settings(), &clock);

    assert_eq!(address, None);
    assert_eq!(clock.now() - t0, Duration::from_secs(10));
}

#[test]
fn custom_timeout_is_respected() {
    let clock = ManualClock::new();
    let t0 = clock.now();
    let mut link = SlowLink::new(None);
    let settings = NetworkSettings {
        timeout: Duration::from_secs(3),
        ..settings()
    };

    assert_eq!(bootstrap(&mut link, &settings, &clock), None);
    assert_eq!(clock.now() - t0, Duration::from_secs(3));
}

#[test]
fn already_connected_returns_immediately() {
    let clock = ManualClock::new();
    let t0 = clock.now();
    let mut link = SlowLink::already_connected();

    let address = bootstrap(&mut link, &settings(), &clock);

    assert_eq!(address.as_deref(), Some("192.168.1.50"));
    assert!(!link.started);
    assert_eq!(clock.now(), t0);
}
