//! BMS master limit arbiter.
//!
//! When a BMS master is in control of the bus it may restrict charging:
//! switch it off, lower the charge voltage, lower the charge current.
//! [`BmsMaster`] merges those requests with the local battery bounds and
//! writes the result into the [`ChargerState`] read by the charging loop.
//!
//! ```text
//!  transport ──ControlUpdate──▶ control_updated()  (stores value, heartbeat)
//!  1 Hz loop ─────────────────▶ update()           (watchdog → arbitration)
//!                                   │
//!                                   ▼
//!                             ChargerState ──▶ charging loop
//! ```
//!
//! ## Fail-safe rules
//!
//! - Master control disabled: `update` is a no-op.
//! - No heartbeat yet, or silence longer than the timeout: the record's
//!   limits are left untouched and `bms_timeout_detected` is set.  The
//!   charging loop must then use local limits only.
//! - Healthy: every asserted remote limit is capped at the local bound
//!   (most restrictive wins).  The enable flag is copied verbatim.
//!
//! All methods take `&mut self`.  Callers on different tasks must
//! serialize access, e.g. through [`ControlQueue`](crate::control_queue::ControlQueue).

pub mod inputs;
pub mod limits;
pub mod watchdog;

use serde::Serialize;

use crate::app::commands::ControlUpdate;
use crate::app::events::BmsEvent;
use crate::app::ports::{EventSink, TimePort};
use crate::charger::ChargerState;
use crate::config::{BatteryConfig, BmsConfig};

use inputs::RemoteControlInputs;
use limits::arbitrate;
use watchdog::{HeartbeatWatchdog, LinkState, LinkTransition};

/// Point-in-time view of the arbiter for telemetry and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BmsStatus {
    pub link: LinkState,
    /// Seconds since the last heartbeat, `None` if the BMS never spoke.
    pub silence_secs: Option<u64>,
    pub remote: RemoteControlInputs,
    pub charger: ChargerState,
}

/// The arbiter.  Owns the remote inputs, the watchdog and the charger record.
pub struct BmsMaster {
    config: BmsConfig,
    battery: BatteryConfig,
    remote: RemoteControlInputs,
    watchdog: HeartbeatWatchdog,
    charger: ChargerState,
}

impl BmsMaster {
    /// Construct the arbiter around an existing charger record.
    ///
    /// Does **not** activate remote control; call [`init`](Self::init) next.
    /// `battery` must have passed [`SystemConfig::validate`](crate::config::SystemConfig::validate).
    /// A record already flagged as timed out stays flagged until a fresh
    /// heartbeat restores the link.
    pub fn new(config: BmsConfig, battery: BatteryConfig, charger: ChargerState) -> Self {
        debug_assert!(
            battery.absolute_max_voltage > 0.0 && battery.charge_current_max > 0.0,
            "local battery bounds must be positive"
        );
        Self {
            config,
            battery,
            remote: RemoteControlInputs::default(),
            watchdog: HeartbeatWatchdog::resuming(
                config.timeout_secs,
                charger.bms_timeout_detected,
            ),
            charger,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Write the arbitration settings into the charger record.
    ///
    /// Call once at startup, after the configuration store is loaded.
    pub fn init(&mut self, sink: &mut impl EventSink) {
        self.charger.bms_master_enabled = self.config.master_enabled;
        self.charger.bms_timeout_secs = self.config.timeout_secs;
        self.charger.bms_node_id = self.config.node_id;

        sink.emit(&BmsEvent::Initialized {
            node_id: self.charger.bms_node_id,
            timeout_secs: self.charger.bms_timeout_secs,
            enabled: self.charger.bms_master_enabled,
        });
    }

    // ── Inbound ───────────────────────────────────────────────

    /// A control value arrived from the BMS.
    ///
    /// Stores it and counts as a heartbeat.  Nothing reaches the charger
    /// record until the next [`update`](Self::update).
    pub fn control_updated(
        &mut self,
        update: ControlUpdate,
        clock: &impl TimePort,
        sink: &mut impl EventSink,
    ) {
        self.remote.apply(update);
        self.watchdog.feed(clock.uptime_secs());

        sink.emit(&BmsEvent::ControlUpdated {
            target_voltage: self.remote.target_voltage,
            max_charge_current: self.remote.max_charge_current,
            enable: self.remote.enable,
        });
    }

    /// Liveness evidence without a value change.
    pub fn heartbeat(&mut self, clock: &impl TimePort) {
        self.watchdog.feed(clock.uptime_secs());
    }

    // ── Per-tick arbitration ──────────────────────────────────

    /// Run one arbitration cycle.  Expected cadence: once per second.
    pub fn update(&mut self, clock: &impl TimePort, sink: &mut impl EventSink) {
        if !self.charger.bms_master_enabled {
            return;
        }

        let now = clock.uptime_secs();

        match self.watchdog.evaluate(now) {
            Some(LinkTransition::Lost) => sink.emit(&BmsEvent::TimeoutDetected),
            Some(LinkTransition::Restored) => sink.emit(&BmsEvent::CommunicationRestored),
            None => {}
        }

        let link = self.watchdog.state();
        self.charger.bms_timeout_detected = link == LinkState::TimedOut;

        if link != LinkState::Healthy {
            // Keep last-known limits; the timeout flag tells the charging
            // loop to ignore them.
            return;
        }

        self.charger.bms_charge_enabled = self.remote.enable;
        self.charger.bms_voltage_limit = arbitrate(
            self.remote.target_voltage,
            self.battery.absolute_max_voltage,
        );
        self.charger.bms_current_limit = arbitrate(
            self.remote.max_charge_current,
            self.battery.charge_current_max,
        );
        self.charger.time_last_bms_msg = now;

        sink.emit(&BmsEvent::LimitsApplied {
            voltage_limit: self.charger.bms_voltage_limit,
            current_limit: self.charger.bms_current_limit,
            charge_enabled: self.charger.bms_charge_enabled,
        });
    }

    // ── Queries ───────────────────────────────────────────────

    /// The charger record, as the charging loop should read it.
    pub fn charger(&self) -> &ChargerState {
        &self.charger
    }

    /// Latest raw values from the BMS (topping/float voltages included).
    pub fn remote(&self) -> &RemoteControlInputs {
        &self.remote
    }

    pub fn battery(&self) -> &BatteryConfig {
        &self.battery
    }

    pub fn link_state(&self) -> LinkState {
        self.watchdog.state()
    }

    pub fn status(&self, clock: &impl TimePort) -> BmsStatus {
        BmsStatus {
            link: self.watchdog.state(),
            silence_secs: self.watchdog.silence_secs(clock.uptime_secs()),
            remote: self.remote,
            charger: self.charger,
        }
    }

    /// Hand the charger record back (e.g. on shutdown).
    pub fn into_charger(self) -> ChargerState {
        self.charger
    }
}
