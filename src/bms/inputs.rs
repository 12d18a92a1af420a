//! Latest control values received from the BMS master.

use serde::{Deserialize, Serialize};

use crate::app::commands::ControlUpdate;

/// Raw remote values, stored as received.  Arbitration happens on tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RemoteControlInputs {
    pub enable: bool,
    pub target_voltage: f32,
    pub max_charge_current: f32,
    pub topping_voltage: f32,
    pub float_voltage: f32,
}

impl Default for RemoteControlInputs {
    fn default() -> Self {
        // Charging stays allowed until the BMS says otherwise.
        Self {
            enable: true,
            target_voltage: 0.0,
            max_charge_current: 0.0,
            topping_voltage: 0.0,
            float_voltage: 0.0,
        }
    }
}

impl RemoteControlInputs {
    pub fn apply(&mut self, update: ControlUpdate) {
        match update {
            ControlUpdate::ChargeEnable(en) => self.enable = en,
            ControlUpdate::TargetVoltage(v) => self.target_voltage = v,
            ControlUpdate::MaxChargeCurrent(i) => self.max_charge_current = i,
            ControlUpdate::ToppingVoltage(v) => self.topping_voltage = v,
            ControlUpdate::FloatVoltage(v) => self.float_voltage = v,
        }
    }
}
