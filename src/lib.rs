//! BMS master control for a solar charge controller.
//!
//! A BMS master on the bus may restrict charging; this crate decides which
//! of its requests reach the charging loop.  Pure-logic modules are
//! host-testable; ESP-IDF-specific code is guarded by
//! `#[cfg(all(target_os = "espidf", feature = "espidf"))]` within each adapter.

#![deny(unused_must_use)]

pub mod app;
pub mod bms;
pub mod charger;
pub mod config;
pub mod control_queue;
pub mod error;

pub mod adapters;
