//! End-to-end control scenarios driven through the `Controller` aggregate.

use std::time::{Duration, Instant};

use tp_controls::{ControlParameters, Controller, CyclePhase, MemoryRelays, RelayState, Snapshot};

const POLL: Duration = Duration::from_millis(100);

/// Step `n` times at a fixed poll interval with the same reading.
fn run(
    c: &mut Controller,
    relays: &mut MemoryRelays,
    start: Instant,
    first_tick: u32,
    n: u32,
    reading: Option<f64>,
) -> Vec<Snapshot> {
    (first_tick..first_tick + n)
        .map(|i| c.step(reading, start + POLL * i, relays))
        .collect()
}

#[test]
fn error_at_dead_zone_edge_drives_up() {
    let mut c = Controller::new(ControlParameters::default());
    let mut relays = MemoryRelays::new();
    let t0 = Instant::now();

    let first = run(&mut c, &mut relays, t0, 0, 100, Some(20.0));
    assert_eq!(first[0].e1, 5.0);
    assert!(first[0].d_t > 0.0, "E1 on the boundary is not inside the dead zone");
    assert_eq!(first[0].phase, CyclePhase::PulseFired);
    assert_eq!(first[1].phase, CyclePhase::CycleRunning);

    let first_up = first.iter().filter(|s| s.outputs.increase).count();
    assert!(first_up > 0, "up should be asserted in the first cycle");
    assert!(first.iter().all(|s| !s.outputs.decrease));

    let second = run(&mut c, &mut relays, t0, 100, 100, Some(20.0));
    let second_up = second.iter().filter(|s| s.outputs.increase).count();
    assert!(
        second_up > first_up,
        "integral demand should lengthen the pulse ({second_up} <= {first_up})"
    );
    assert!(!relays.overlapped());
}

#[test]
fn at_setpoint_stays_idle() {
    let mut c = Controller::new(ControlParameters::default());
    let mut relays = MemoryRelays::new();

    // Five full cycles.
    let snaps = run(&mut c, &mut relays, Instant::now(), 0, 500, Some(25.0));
    for s in &snaps {
        assert_eq!(s.d_t, 0.0);
        assert_eq!(s.sum_d_t, 0.0);
        assert!(!s.up && !s.down);
        assert_eq!(s.outputs, RelayState::OFF);
    }
    assert_eq!(snaps.iter().filter(|s| s.pulse_fired).count(), 5);
}

#[test]
fn manual_hand_up_ignores_pid() {
    let params = ControlParameters {
        auto_hand: false,
        hand_up: true,
        ..ControlParameters::default()
    };
    let mut c = Controller::new(params);
    let mut relays = MemoryRelays::new();

    // Process value above setpoint: the PID would want to decrease.
    for s in run(&mut c, &mut relays, Instant::now(), 0, 50, Some(40.0)) {
        assert!(s.up);
        assert!(!s.down);
        assert!(s.outputs.increase);
        assert_eq!(s.d_t, 0.0);
        assert_eq!(s.sum_d_t, 0.0);
        assert!(s.travel_up <= 0.1 + 1e-12);
        assert!(!s.pulse_fired);
    }
}

#[test]
fn manual_hand_down() {
    let params = ControlParameters {
        auto_hand: false,
        hand_down: true,
        ..ControlParameters::default()
    };
    let mut c = Controller::new(params);
    let mut relays = MemoryRelays::new();

    for s in run(&mut c, &mut relays, Instant::now(), 0, 20, Some(10.0)) {
        assert!(!s.up);
        assert!(s.down);
        assert!(s.outputs.decrease);
        assert!(!s.outputs.increase);
    }
}

#[test]
fn sensor_unavailable_from_start() {
    let mut c = Controller::new(ControlParameters::default());
    let mut relays = MemoryRelays::new();

    for s in run(&mut c, &mut relays, Instant::now(), 0, 300, None) {
        assert!(!s.sensor_available);
        assert_eq!(s.outputs, RelayState::OFF);
        assert!(!s.up && !s.down);
        assert_eq!(s.travel_up, 0.0);
        assert_eq!(s.travel_down, 0.0);
    }
    assert_eq!(relays.state(), RelayState::OFF);
}

#[test]
fn switching_off_neutralizes_within_one_step() {
    let mut c = Controller::new(ControlParameters::default());
    let mut relays = MemoryRelays::new();
    let t0 = Instant::now();

    let before = run(&mut c, &mut relays, t0, 0, 3, Some(10.0));
    assert!(before.last().is_some_and(|s| s.outputs.increase));

    c.params_mut().on_off = false;
    let s = c.step(Some(10.0), t0 + POLL * 3, &mut relays);
    assert_eq!(s.d_t, 0.0);
    assert_eq!(s.sum_d_t, 0.0);
    assert_eq!(s.travel_up, 0.0);
    assert_eq!(s.travel_down, 0.0);
    assert_eq!(s.outputs, RelayState::OFF);
    assert_eq!(s.phase, CyclePhase::IdleWaitingForCycle);
    assert_eq!(relays.state(), RelayState::OFF);
}

#[test]
fn cooling_demand_drives_down() {
    let mut c = Controller::new(ControlParameters::default());
    let mut relays = MemoryRelays::new();

    let snaps = run(&mut c, &mut relays, Instant::now(), 0, 10, Some(35.0));
    assert!(snaps[0].d_t < 0.0);
    assert!(snaps[0].outputs.decrease);
    assert!(snaps.iter().all(|s| !s.outputs.increase));
}

#[test]
fn travel_window_caps_long_demand() {
    // Constant large error keeps demanding up; the travel window must stop it.
    let params = ControlParameters {
        valve: 15.0,
        ..ControlParameters::default()
    };
    let mut c = Controller::new(params);
    let mut relays = MemoryRelays::new();

    let snaps = run(&mut c, &mut relays, Instant::now(), 0, 600, Some(0.0));
    let mut last = 0.0;
    for s in &snaps {
        assert!(s.travel_up >= last, "accumulator must not decrease");
        assert!(s.travel_up <= 15.0);
        last = s.travel_up;
    }
    let end = snaps.last().map(|s| (s.travel_up, s.up, s.outputs.increase));
    assert_eq!(end, Some((15.0, true, false)));
}
