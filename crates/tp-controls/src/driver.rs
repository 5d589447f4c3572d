//! Relay driver: turns engine state into up/down actuation.
//!
//! Three independent triggers command motion in automatic mode:
//! - accumulated effort still ahead of the running cycle timer
//! - a single increment close to a whole cycle
//! - the travel window already exhausted (keeps the direction latched)
//!
//! Each active tick spends [`TRAVEL_QUANTUM`] of the travel window. Once the
//! window reaches `valve` the relay is released, bounding actuator over-travel.

use tp_core::Real;

use crate::engine::{CycleEngine, SATURATION};
use crate::params::{AccrualMode, ControlParameters};
use crate::relay::{RelayPair, RelayState};

/// Travel seconds charged per active tick.
pub const TRAVEL_QUANTUM: Real = 0.1;

/// Up/down decision state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RelayDriver {
    up: bool,
    down: bool,
    outputs: RelayState,
}

impl RelayDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decide both directions and write the relay outputs.
    ///
    /// "increase" is always written before "decrease", so an output is
    /// switched off before the opposite one can be switched on.
    pub fn control<R: RelayPair + ?Sized>(
        &mut self,
        engine: &mut CycleEngine,
        params: &ControlParameters,
        sensor_available: bool,
        relays: &mut R,
    ) -> RelayState {
        if !sensor_available {
            self.up = false;
            self.down = false;
            self.outputs = RelayState::OFF;
            relays.all_off();
            return self.outputs;
        }

        let accrue = match params.accrual {
            AccrualMode::PerPoll => true,
            AccrualMode::SubTick => engine.heartbeat(),
        };
        let sum = engine.sum_d_t();
        let d_t = engine.d_t();
        let timer = engine.cycle_timer();
        let near_full_cycle = params.cycle - 0.5;

        let auto_up = (sum >= timer && sum >= SATURATION)
            || d_t >= near_full_cycle
            || engine.travel().up >= params.valve;
        self.up = params.on_off
            && !self.down
            && ((params.auto_hand && auto_up) || (!params.auto_hand && params.hand_up));

        let increase = self.up && engine.travel().up < params.valve;
        if increase && accrue {
            spend(&mut engine.travel_mut().up, params.valve);
        }
        relays.set_increase(increase);

        let auto_down = (sum <= -timer && sum <= -SATURATION)
            || d_t <= -near_full_cycle
            || engine.travel().down >= params.valve;
        self.down = params.on_off
            && !self.up
            && ((params.auto_hand && auto_down) || (!params.auto_hand && params.hand_down));

        let decrease = self.down && engine.travel().down < params.valve;
        if decrease && accrue {
            spend(&mut engine.travel_mut().down, params.valve);
        }
        relays.set_decrease(decrease);

        self.outputs = RelayState { increase, decrease };
        self.outputs
    }

    /// Whether "up" is commanded (may be latched with the output released).
    pub fn up(&self) -> bool {
        self.up
    }

    pub fn down(&self) -> bool {
        self.down
    }

    /// Outputs written on the last tick.
    pub fn outputs(&self) -> RelayState {
        self.outputs
    }
}

fn spend(acc: &mut Real, valve: Real) {
    *acc = (*acc + TRAVEL_QUANTUM).min(valve);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relay::MemoryRelays;
    use std::time::{Duration, Instant};

    fn tick(
        engine: &mut CycleEngine,
        driver: &mut RelayDriver,
        params: &mut ControlParameters,
        pv: Real,
        now: Instant,
        relays: &mut MemoryRelays,
    ) -> RelayState {
        engine.update(params, pv, now);
        driver.control(engine, params, true, relays)
    }

    #[test]
    fn upward_demand_asserts_increase() {
        let mut p = ControlParameters::default();
        let mut e = CycleEngine::new();
        let mut d = RelayDriver::new();
        let mut r = MemoryRelays::new();

        let out = tick(&mut e, &mut d, &mut p, 20.0, Instant::now(), &mut r);
        assert!(out.increase);
        assert!(!out.decrease);
        assert!(d.up());
        assert!((e.travel().up - TRAVEL_QUANTUM).abs() < 1e-12);
    }

    #[test]
    fn pulse_width_tracks_accumulated_effort() {
        let mut p = ControlParameters::default();
        let mut e = CycleEngine::new();
        let mut d = RelayDriver::new();
        let mut r = MemoryRelays::new();
        let t0 = Instant::now();

        // sum_d_t = 0.7575 after the first pulse: on while timer <= 0.7575 s
        let mut on_ticks = 0;
        for i in 0..50 {
            let out = tick(&mut e, &mut d, &mut p, 20.0, t0 + Duration::from_millis(i * 100), &mut r);
            if out.increase {
                on_ticks += 1;
            }
        }
        assert_eq!(on_ticks, 8);
    }

    #[test]
    fn downward_demand_asserts_decrease() {
        let mut p = ControlParameters::default();
        let mut e = CycleEngine::new();
        let mut d = RelayDriver::new();
        let mut r = MemoryRelays::new();

        let out = tick(&mut e, &mut d, &mut p, 31.0, Instant::now(), &mut r);
        assert!(out.decrease);
        assert!(!out.increase);
        assert!(d.down());
    }

    #[test]
    fn dead_zone_keeps_relays_off() {
        let mut p = ControlParameters::default();
        let mut e = CycleEngine::new();
        let mut d = RelayDriver::new();
        let mut r = MemoryRelays::new();
        let t0 = Instant::now();
        for i in 0..300 {
            let out = tick(&mut e, &mut d, &mut p, 25.0, t0 + Duration::from_millis(i * 100), &mut r);
            assert_eq!(out, RelayState::OFF);
        }
        assert!(!d.up() && !d.down());
    }

    #[test]
    fn sensor_unavailable_forces_off_without_accrual() {
        let mut p = ControlParameters::default();
        let mut e = CycleEngine::new();
        let mut d = RelayDriver::new();
        let mut r = MemoryRelays::new();
        let t0 = Instant::now();

        tick(&mut e, &mut d, &mut p, 20.0, t0, &mut r);
        let before = *e.travel();
        e.update(&mut p, 20.0, t0 + Duration::from_millis(100));
        let out = d.control(&mut e, &p, false, &mut r);
        assert_eq!(out, RelayState::OFF);
        assert_eq!(r.state(), RelayState::OFF);
        assert_eq!(*e.travel(), before);
        assert!(!d.up() && !d.down());
    }

    #[test]
    fn disabled_forces_off() {
        let mut p = ControlParameters {
            on_off: false,
            hand_up: true,
            ..Default::default()
        };
        let mut e = CycleEngine::new();
        let mut d = RelayDriver::new();
        let mut r = MemoryRelays::new();
        let out = tick(&mut e, &mut d, &mut p, 0.0, Instant::now(), &mut r);
        assert_eq!(out, RelayState::OFF);
        assert_eq!(e.travel().up, 0.0);
    }

    #[test]
    fn manual_up_ignores_pid_state() {
        let mut p = ControlParameters {
            auto_hand: false,
            hand_up: true,
            ..Default::default()
        };
        let mut e = CycleEngine::new();
        let mut d = RelayDriver::new();
        let mut r = MemoryRelays::new();
        let t0 = Instant::now();
        // Process value above setpoint would mean "decrease" in automatic mode.
        for i in 0..100 {
            let out = tick(&mut e, &mut d, &mut p, 40.0, t0 + Duration::from_millis(i * 100), &mut r);
            assert!(out.increase);
            assert!(!out.decrease);
            assert!(e.travel().up <= p.valve);
        }
    }

    #[test]
    fn manual_both_requests_up_wins() {
        let mut p = ControlParameters {
            auto_hand: false,
            hand_up: true,
            hand_down: true,
            ..Default::default()
        };
        let mut e = CycleEngine::new();
        let mut d = RelayDriver::new();
        let mut r = MemoryRelays::new();
        let out = tick(&mut e, &mut d, &mut p, 25.0, Instant::now(), &mut r);
        assert!(out.increase && !out.decrease);
        assert!(!r.overlapped());
    }

    #[test]
    fn travel_saturates_at_valve_and_latches() {
        let mut p = ControlParameters::default();
        let mut e = CycleEngine::new();
        let mut d = RelayDriver::new();
        let mut r = MemoryRelays::new();
        let now = Instant::now();

        e.update(&mut p, 20.0, now);
        e.travel_mut().up = p.valve - 0.05;
        let out = d.control(&mut e, &p, true, &mut r);
        assert!(out.increase);
        assert_eq!(e.travel().up, p.valve);

        // Window exhausted: still "up", relay released, down blocked.
        let out = d.control(&mut e, &p, true, &mut r);
        assert!(!out.increase);
        assert!(d.up());
        assert!(!d.down());
        assert_eq!(e.travel().up, p.valve);
    }

    #[test]
    fn near_full_cycle_increment_triggers() {
        let mut p = ControlParameters {
            k_p: 99.0,
            ..Default::default()
        };
        let mut e = CycleEngine::new();
        let mut d = RelayDriver::new();
        let mut r = MemoryRelays::new();
        let t0 = Instant::now();
        tick(&mut e, &mut d, &mut p, 20.0, t0, &mut r);
        assert!(e.d_t() >= p.cycle - 0.5);

        // Cycle end clears the saturated sum; the last increment alone still drives.
        let out = tick(&mut e, &mut d, &mut p, 20.0, t0 + Duration::from_millis(10_000), &mut r);
        assert_eq!(e.sum_d_t(), 0.0);
        assert!(out.increase);
    }

    #[test]
    fn sub_tick_accrual_only_on_heartbeat() {
        let mut p = ControlParameters {
            auto_hand: false,
            hand_up: true,
            accrual: AccrualMode::SubTick,
            ..Default::default()
        };
        let mut e = CycleEngine::new();
        let mut d = RelayDriver::new();
        let mut r = MemoryRelays::new();
        let t0 = Instant::now();

        tick(&mut e, &mut d, &mut p, 25.0, t0, &mut r);
        assert!(e.heartbeat());
        assert!((e.travel().up - TRAVEL_QUANTUM).abs() < 1e-12);

        let out = tick(&mut e, &mut d, &mut p, 25.0, t0 + Duration::from_millis(10), &mut r);
        assert!(!e.heartbeat());
        assert!(out.increase);
        assert_eq!(e.travel().up, 0.0);
    }
}
