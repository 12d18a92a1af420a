//! Charger state shared between the BMS arbiter and the charging loop.
//!
//! [`ChargerState`] is the record the arbiter writes and the charging
//! control loop reads once per cycle.  Limit fields use `0.0` to mean
//! "no limit asserted by the BMS".
//!
//! The consumer contract: whenever `bms_timeout_detected` is set, every
//! other `bms_*` field is stale and must be ignored.
//! [`ChargerState::effective_limits`] applies that rule.

use serde::{Deserialize, Serialize};

use crate::config::BatteryConfig;

/// BMS-related part of the charger record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChargerState {
    // -- Arbitration settings (written once by init) --
    pub bms_master_enabled: bool,
    pub bms_timeout_secs: u32,
    pub bms_node_id: u16,

    // -- Arbiter output --
    /// No fresh BMS heartbeat within the timeout window.
    pub bms_timeout_detected: bool,
    /// Charging permitted by the BMS.
    pub bms_charge_enabled: bool,
    /// BMS voltage limit (V), `0.0` = none.
    pub bms_voltage_limit: f32,
    /// BMS current limit (A), `0.0` = none.
    pub bms_current_limit: f32,
    /// Uptime (s) at which BMS limits were last applied.
    pub time_last_bms_msg: u64,
}

impl Default for ChargerState {
    fn default() -> Self {
        Self {
            bms_master_enabled: false,
            bms_timeout_secs: 0,
            bms_node_id: 0,
            bms_timeout_detected: false,
            bms_charge_enabled: true,
            bms_voltage_limit: 0.0,
            bms_current_limit: 0.0,
            time_last_bms_msg: 0,
        }
    }
}

/// Limits the charging loop should actually regulate to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectiveLimits {
    pub voltage: f32,
    pub current: f32,
    pub charge_enabled: bool,
}

impl ChargerState {
    /// True if the charging loop should honour the `bms_*` fields.
    pub fn bms_in_control(&self) -> bool {
        self.bms_master_enabled && !self.bms_timeout_detected
    }

    /// Resolve the limits for this charging cycle.
    ///
    /// Local bounds only while the BMS is disabled or silent; otherwise
    /// each asserted BMS limit replaces the local bound (the arbiter has
    /// already clamped it).
    pub fn effective_limits(&self, battery: &BatteryConfig) -> EffectiveLimits {
        if !self.bms_in_control() {
            return EffectiveLimits {
                voltage: battery.absolute_max_voltage,
                current: battery.charge_current_max,
                charge_enabled: true,
            };
        }

        EffectiveLimits {
            voltage: if self.bms_voltage_limit > 0.0 {
                self.bms_voltage_limit
            } else {
                battery.absolute_max_voltage
            },
            current: if self.bms_current_limit > 0.0 {
                self.bms_current_limit
            } else {
                battery.charge_current_max
            },
            charge_enabled: self.bms_charge_enabled,
        }
    }
}
