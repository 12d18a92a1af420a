//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing arbiter events to the `log` facade
//! (UART / USB-CDC in production, whatever logger the host installs in
//! simulation).  Transitions are info/warn; per-message and per-tick
//! chatter stays at debug.

use log::{debug, info, warn};

use crate::app::events::BmsEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`BmsEvent`].
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &BmsEvent) {
        match *event {
            BmsEvent::Initialized {
                node_id,
                timeout_secs,
                enabled,
            } => {
                info!(
                    "BMS master control initialized (node_id=0x{:04X}, timeout={}s, enabled={})",
                    node_id, timeout_secs, enabled
                );
            }
            BmsEvent::ControlUpdated {
                target_voltage,
                max_charge_current,
                enable,
            } => {
                debug!(
                    "BMS control value updated: V={:.2}, I={:.2}, en={}",
                    target_voltage, max_charge_current, enable as u8
                );
            }
            BmsEvent::TimeoutDetected => {
                warn!("BMS master timeout detected - reverting to local control");
            }
            BmsEvent::CommunicationRestored => {
                info!("BMS master communication restored");
            }
            BmsEvent::LimitsApplied {
                voltage_limit,
                current_limit,
                charge_enabled,
            } => {
                debug!(
                    "BMS update: V_lim={:.2}V, I_lim={:.2}A, chg_en={}",
                    voltage_limit, current_limit, charge_enabled as u8
                );
            }
        }
    }
}
