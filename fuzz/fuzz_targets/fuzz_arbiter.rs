//! Fuzz target: `BmsMaster` update / tick sequences
//!
//! Interprets the input as a stream of 5-byte ops (opcode + f32 payload)
//! and drives the arbiter with them, verifying:
//! - No panics for any value, NaN and infinities included
//! - Voltage / current limits are 0 or within the local bounds
//! - A timed-out tick never changes the limits
//!
//! cargo fuzz run fuzz_arbiter

#![no_main]

use std::cell::Cell;

use bms_master::app::commands::ControlUpdate;
use bms_master::app::ports::TimePort;
use bms_master::bms::BmsMaster;
use bms_master::charger::ChargerState;
use bms_master::config::{BatteryConfig, BmsConfig};
use libfuzzer_sys::fuzz_target;

struct Clock(Cell<u64>);

impl TimePort for Clock {
    fn uptime_secs(&self) -> u64 {
        self.0.get()
    }
}

const V_MAX: f32 = 58.4;
const I_MAX: f32 = 40.0;

fuzz_target!(|data: &[u8]| {
    let Some((&timeout, ops)) = data.split_first() else {
        return;
    };

    let config = BmsConfig {
        node_id: 1,
        timeout_secs: u32::from(timeout % 30) + 1,
        master_enabled: true,
    };
    let battery = BatteryConfig {
        absolute_max_voltage: V_MAX,
        charge_current_max: I_MAX,
    };
    let mut master = BmsMaster::new(config, battery, ChargerState::default());
    master.init(&mut ());
    let clock = Clock(Cell::new(0));

    for op in ops.chunks_exact(5) {
        let value = f32::from_le_bytes([op[1], op[2], op[3], op[4]]);
        match op[0] % 8 {
            0 => master.control_updated(ControlUpdate::ChargeEnable(value > 0.0), &clock, &mut ()),
            1 => master.control_updated(ControlUpdate::TargetVoltage(value), &clock, &mut ()),
            2 => master.control_updated(ControlUpdate::MaxChargeCurrent(value), &clock, &mut ()),
            3 => master.control_updated(ControlUpdate::ToppingVoltage(value), &clock, &mut ()),
            4 => master.control_updated(ControlUpdate::FloatVoltage(value), &clock, &mut ()),
            5 => master.heartbeat(&clock),
            6 => clock.0.set(clock.0.get() + u64::from(op[1] % 16)),
            _ => {
                let before = *master.charger();
                master.update(&clock, &mut ());
                let after = master.charger();
                if after.bms_timeout_detected {
                    assert_eq!(after.bms_voltage_limit.to_bits(), before.bms_voltage_limit.to_bits());
                    assert_eq!(after.bms_current_limit.to_bits(), before.bms_current_limit.to_bits());
                }
            }
        }

        let c = master.charger();
        assert!(c.bms_voltage_limit == 0.0 || c.bms_voltage_limit <= V_MAX);
        assert!(c.bms_current_limit == 0.0 || c.bms_current_limit <= I_MAX);
    }
});
