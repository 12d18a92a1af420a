//! Integration tests for the BmsMaster watchdog → arbitration pipeline.

use super::mock_ports::{ManualClock, RecordingSink};

use bms_master::adapters::log_sink::LogEventSink;
use bms_master::app::commands::ControlUpdate;
use bms_master::app::events::BmsEvent;
use bms_master::bms::BmsMaster;
use bms_master::bms::watchdog::LinkState;
use bms_master::charger::ChargerState;
use bms_master::config::{BatteryConfig, BmsConfig};

const TIMEOUT: u32 = 5;

fn make_master(enabled: bool, sink: &mut RecordingSink) -> BmsMaster {
    let config = BmsConfig {
        node_id: 0x00B5,
        timeout_secs: TIMEOUT,
        master_enabled: enabled,
    };
    let battery = BatteryConfig {
        absolute_max_voltage: 48.0,
        charge_current_max: 20.0,
    };
    let mut master = BmsMaster::new(config, battery, ChargerState::default());
    master.init(sink);
    master
}

/// Send a full set of limits and tick once so the link is healthy.
fn healthy_with(
    master: &mut BmsMaster,
    clock: &ManualClock,
    sink: &mut RecordingSink,
    voltage: f32,
    current: f32,
    enable: bool,
) {
    master.control_updated(ControlUpdate::TargetVoltage(voltage), clock, sink);
    master.control_updated(ControlUpdate::MaxChargeCurrent(current), clock, sink);
    master.control_updated(ControlUpdate::ChargeEnable(enable), clock, sink);
    master.update(clock, sink);
    assert_eq!(master.link_state(), LinkState::Healthy);
}

// ── Initialisation ───────────────────────────────────────────

#[test]
fn init_emits_active_configuration() {
    let mut sink = RecordingSink::new();
    let master = make_master(true, &mut sink);

    assert_eq!(
        sink.events,
        vec![BmsEvent::Initialized {
            node_id: 0x00B5,
            timeout_secs: TIMEOUT,
            enabled: true,
        }]
    );
    assert!(master.charger().bms_master_enabled);
    assert_eq!(master.charger().bms_node_id, 0x00B5);
}

// ── Disabled master ──────────────────────────────────────────

#[test]
fn disabled_master_never_mutates_charger_state() {
    let mut sink = RecordingSink::new();
    let mut master = make_master(false, &mut sink);
    let clock = ManualClock::at(0);
    let before = *master.charger();

    for t in 0..30 {
        clock.set(t);
        if t % 3 == 0 {
            master.control_updated(ControlUpdate::TargetVoltage(40.0), &clock, &mut sink);
        }
        master.update(&clock, &mut sink);
        assert_eq!(*master.charger(), before, "tick at {t} mutated the record");
    }

    assert_eq!(sink.timeouts(), 0);
    assert_eq!(sink.limits_applied(), 0);
    assert_eq!(master.link_state(), LinkState::Uninitialized);
}

// ── Watchdog ─────────────────────────────────────────────────

#[test]
fn first_tick_without_heartbeat_times_out() {
    let mut sink = RecordingSink::new();
    let mut master = make_master(true, &mut sink);
    let clock = ManualClock::at(1);

    master.update(&clock, &mut sink);

    assert!(master.charger().bms_timeout_detected);
    assert_eq!(master.link_state(), LinkState::TimedOut);
    assert_eq!(sink.timeouts(), 1);
    assert_eq!(sink.limits_applied(), 0);
}

#[test]
fn timeout_threshold_boundary() {
    let mut sink = RecordingSink::new();
    let mut master = make_master(true, &mut sink);
    let clock = ManualClock::at(100);

    master.control_updated(ControlUpdate::TargetVoltage(40.0), &clock, &mut sink);

    clock.set(105);
    master.update(&clock, &mut sink);
    assert!(!master.charger().bms_timeout_detected, "t0 + T must be healthy");
    assert_eq!(master.charger().time_last_bms_msg, 105);

    clock.set(106);
    master.update(&clock, &mut sink);
    assert!(master.charger().bms_timeout_detected, "t0 + T + 1 must time out");
}

#[test]
fn transitions_are_logged_once_each() {
    let mut sink = RecordingSink::new();
    let mut master = make_master(true, &mut sink);
    let clock = ManualClock::at(0);

    healthy_with(&mut master, &clock, &mut sink, 40.0, 10.0, true);

    // Go silent for a long time.
    for _ in 0..20 {
        clock.advance(1);
        master.update(&clock, &mut sink);
    }
    assert_eq!(sink.timeouts(), 1);
    assert_eq!(sink.restorations(), 0);

    // Come back and stay.
    master.control_updated(ControlUpdate::ChargeEnable(true), &clock, &mut sink);
    for _ in 0..4 {
        master.update(&clock, &mut sink);
        clock.advance(1);
    }
    assert_eq!(sink.timeouts(), 1);
    assert_eq!(sink.restorations(), 1);
    assert!(!master.charger().bms_timeout_detected);
}

#[test]
fn initial_timeout_then_first_contact_is_a_recovery() {
    let mut sink = RecordingSink::new();
    let mut master = make_master(true, &mut sink);
    let clock = ManualClock::at(0);

    master.update(&clock, &mut sink);
    clock.set(3);
    master.update(&clock, &mut sink);
    assert_eq!(sink.timeouts(), 1);

    master.control_updated(ControlUpdate::TargetVoltage(44.0), &clock, &mut sink);
    clock.set(4);
    master.update(&clock, &mut sink);

    assert_eq!(sink.restorations(), 1);
    assert_eq!(master.charger().bms_voltage_limit, 44.0);
}

#[test]
fn heartbeat_before_first_tick_is_quietly_healthy() {
    let mut sink = RecordingSink::new();
    let mut master = make_master(true, &mut sink);
    let clock = ManualClock::at(2);

    master.control_updated(ControlUpdate::MaxChargeCurrent(8.0), &clock, &mut sink);
    master.update(&clock, &mut sink);

    assert_eq!(sink.timeouts(), 0);
    assert_eq!(sink.restorations(), 0);
    assert_eq!(master.charger().bms_current_limit, 8.0);
}

// ── Arbitration ──────────────────────────────────────────────

#[test]
fn voltage_most_restrictive_wins() {
    for (remote, expected) in [(0.0, 0.0), (50.0, 48.0), (40.0, 40.0)] {
        let mut sink = RecordingSink::new();
        let mut master = make_master(true, &mut sink);
        let clock = ManualClock::at(10);
        master.control_updated(ControlUpdate::TargetVoltage(remote), &clock, &mut sink);
        master.update(&clock, &mut sink);
        assert_eq!(
            master.charger().bms_voltage_limit,
            expected,
            "remote target {remote} V"
        );
    }
}

#[test]
fn current_most_restrictive_wins() {
    for (remote, expected) in [(0.0, 0.0), (30.0, 20.0), (10.0, 10.0)] {
        let mut sink = RecordingSink::new();
        let mut master = make_master(true, &mut sink);
        let clock = ManualClock::at(10);
        master.control_updated(ControlUpdate::MaxChargeCurrent(remote), &clock, &mut sink);
        master.update(&clock, &mut sink);
        assert_eq!(
            master.charger().bms_current_limit,
            expected,
            "remote max current {remote} A"
        );
    }
}

#[test]
fn enable_flag_copied_verbatim() {
    let mut sink = RecordingSink::new();
    let mut master = make_master(true, &mut sink);
    let clock = ManualClock::at(0);

    healthy_with(&mut master, &clock, &mut sink, 40.0, 10.0, false);
    assert!(!master.charger().bms_charge_enabled);

    master.control_updated(ControlUpdate::ChargeEnable(true), &clock, &mut sink);
    master.update(&clock, &mut sink);
    assert!(master.charger().bms_charge_enabled);
}

#[test]
fn limits_applied_event_carries_arbitrated_values() {
    let mut sink = RecordingSink::new();
    let mut master = make_master(true, &mut sink);
    let clock = ManualClock::at(0);

    healthy_with(&mut master, &clock, &mut sink, 60.0, 5.0, true);

    assert_eq!(
        sink.events.last(),
        Some(&BmsEvent::LimitsApplied {
            voltage_limit: 48.0,
            current_limit: 5.0,
            charge_enabled: true,
        })
    );
}

// ── Fail-safe ────────────────────────────────────────────────

#[test]
fn no_stale_application_during_timeout() {
    let mut sink = RecordingSink::new();
    let mut master = make_master(true, &mut sink);
    let clock = ManualClock::at(0);

    healthy_with(&mut master, &clock, &mut sink, 40.0, 10.0, false);
    let healthy = *master.charger();

    clock.set(u64::from(TIMEOUT) + 1);
    for _ in 0..5 {
        master.update(&clock, &mut sink);
        clock.advance(1);
    }

    let stale = master.charger();
    assert!(stale.bms_timeout_detected);
    assert_eq!(stale.bms_voltage_limit, healthy.bms_voltage_limit);
    assert_eq!(stale.bms_current_limit, healthy.bms_current_limit);
    assert_eq!(stale.bms_charge_enabled, healthy.bms_charge_enabled);
    assert_eq!(stale.time_last_bms_msg, healthy.time_last_bms_msg);
}

#[test]
fn timed_out_record_resolves_to_local_limits() {
    let mut sink = RecordingSink::new();
    let mut master = make_master(true, &mut sink);
    let clock = ManualClock::at(0);

    healthy_with(&mut master, &clock, &mut sink, 40.0, 10.0, false);
    let lim = master.charger().effective_limits(master.battery());
    assert_eq!((lim.voltage, lim.current, lim.charge_enabled), (40.0, 10.0, false));

    clock.set(60);
    master.update(&clock, &mut sink);
    let lim = master.charger().effective_limits(master.battery());
    assert_eq!((lim.voltage, lim.current, lim.charge_enabled), (48.0, 20.0, true));
}

#[test]
fn handed_over_timed_out_record_recovers_on_heartbeat() {
    let mut sink = RecordingSink::new();
    let clock = ManualClock::at(0);
    let mut first = make_master(true, &mut sink);
    first.update(&clock, &mut sink);
    assert!(first.charger().bms_timeout_detected);

    let record = first.into_charger();
    let config = BmsConfig {
        node_id: 0x00B5,
        timeout_secs: TIMEOUT,
        master_enabled: true,
    };
    let battery = BatteryConfig {
        absolute_max_voltage: 48.0,
        charge_current_max: 20.0,
    };
    let mut master = BmsMaster::new(config, battery, record);
    master.init(&mut sink);
    assert_eq!(master.link_state(), LinkState::TimedOut);
    sink.clear();

    clock.set(10);
    master.control_updated(ControlUpdate::TargetVoltage(40.0), &clock, &mut sink);
    master.control_updated(ControlUpdate::ChargeEnable(false), &clock, &mut sink);
    master.update(&clock, &mut sink);

    let charger = master.charger();
    assert!(!charger.bms_timeout_detected);
    assert_eq!(charger.bms_voltage_limit, 40.0);
    assert_eq!(sink.restorations(), 1);
    assert_eq!(sink.timeouts(), 0);

    let lim = charger.effective_limits(master.battery());
    assert!(!lim.charge_enabled);
}

// ── Logging adapter ──────────────────────────────────────────

#[test]
fn log_sink_handles_every_event_without_a_logger() {
    let mut sink = LogEventSink::new();
    let config = BmsConfig {
        timeout_secs: 1,
        ..Default::default()
    };
    let mut master = BmsMaster::new(config, BatteryConfig::default(), ChargerState::default());
    let clock = ManualClock::at(0);

    master.init(&mut sink);
    master.update(&clock, &mut sink);
    master.control_updated(ControlUpdate::TargetVoltage(14.2), &clock, &mut sink);
    master.update(&clock, &mut sink);

    let charger = master.into_charger();
    assert!(!charger.bms_timeout_detected);
    assert_eq!(charger.bms_voltage_limit, 14.2);
}
