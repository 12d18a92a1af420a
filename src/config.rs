//! System configuration parameters
//!
//! Local battery safety bounds and BMS master arbitration settings.
//! Values can be overridden via NVS (non-volatile storage) or a JSON import.

use anyhow::{Context, anyhow};
use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;

/// Local battery safety bounds.  Never exceeded, whatever the BMS asks for.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BatteryConfig {
    /// Absolute maximum battery voltage (V)
    pub absolute_max_voltage: f32,
    /// Maximum charge current (A)
    pub charge_current_max: f32,
}

impl Default for BatteryConfig {
    fn default() -> Self {
        Self {
            // 12 V lead-acid bank
            absolute_max_voltage: 14.8,
            charge_current_max: 20.0,
        }
    }
}

/// BMS master control settings.  Read once at init.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BmsConfig {
    /// Bus node id of the BMS master we accept control from
    pub node_id: u16,
    /// Silence period (seconds) after which remote limits are ignored
    pub timeout_secs: u32,
    /// Administrative switch for remote control
    pub master_enabled: bool,
}

impl Default for BmsConfig {
    fn default() -> Self {
        Self {
            node_id: 0x0001,
            timeout_secs: 10,
            master_enabled: true,
        }
    }
}

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemConfig {
    pub battery: BatteryConfig,
    pub bms: BmsConfig,
    /// Control loop interval (milliseconds)
    pub control_loop_interval_ms: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            battery: BatteryConfig::default(),
            bms: BmsConfig::default(),
            control_loop_interval_ms: 1000, // 1 Hz
        }
    }
}

impl SystemConfig {
    /// Range-check every field.  Rejects rather than clamps.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1.0..=100.0).contains(&self.battery.absolute_max_voltage) {
            return Err(ConfigError::ValidationFailed(
                "absolute_max_voltage must be 1.0–100.0",
            ));
        }
        if !(0.1..=200.0).contains(&self.battery.charge_current_max) {
            return Err(ConfigError::ValidationFailed(
                "charge_current_max must be 0.1–200.0",
            ));
        }
        if !(1..=3600).contains(&self.bms.timeout_secs) {
            return Err(ConfigError::ValidationFailed(
                "bms timeout_secs must be 1–3600",
            ));
        }
        if !(100..=5000).contains(&self.control_loop_interval_ms) {
            return Err(ConfigError::ValidationFailed(
                "control_loop_interval_ms must be 100–5000",
            ));
        }
        Ok(())
    }

    /// Parse and validate a JSON configuration document.
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let cfg: Self = serde_json::from_str(json).context("malformed config JSON")?;
        cfg.validate().map_err(|e| anyhow!("invalid config: {e}"))?;
        Ok(cfg)
    }
}
