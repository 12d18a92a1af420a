//! Inbound control values from the BMS master.
//!
//! The bus transport decodes each received value into one
//! [`ControlUpdate`] and hands it to
//! [`BmsMaster::control_updated`](crate::bms::BmsMaster::control_updated).
//! Node filtering and range sanity are the transport's job.

use serde::{Deserialize, Serialize};

/// One remote control value, applied as a unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ControlUpdate {
    /// BMS allows (true) or forbids (false) charging.
    ChargeEnable(bool),
    /// Requested charge voltage (V); `<= 0` means "no remote limit".
    TargetVoltage(f32),
    /// Requested maximum charge current (A); `<= 0` means "no remote limit".
    MaxChargeCurrent(f32),
    /// Requested topping (absorption) voltage (V).
    ToppingVoltage(f32),
    /// Requested float voltage (V).
    FloatVoltage(f32),
}
