//! Outbound application events.
//!
//! [`BmsMaster`](crate::bms::BmsMaster) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them: log to serial or publish on the bus.

/// Structured events emitted by the BMS master arbiter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BmsEvent {
    /// Arbitration settings were written into the charger record.
    Initialized {
        node_id: u16,
        timeout_secs: u32,
        enabled: bool,
    },

    /// A remote control value arrived (raw, not yet arbitrated).
    ControlUpdated {
        target_voltage: f32,
        max_charge_current: f32,
        enable: bool,
    },

    /// The BMS went silent; the charger falls back to local limits.
    TimeoutDetected,

    /// The BMS is talking again after a timeout.
    CommunicationRestored,

    /// Limits were recomputed and written into the charger record.
    LimitsApplied {
        voltage_limit: f32,
        current_limit: f32,
        charge_enabled: bool,
    },
}
