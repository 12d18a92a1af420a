//! Application boundary: port traits and the messages that cross them.
//!
//! The arbiter in [`crate::bms`] talks to the outside world only through
//! the traits in [`ports`]: inbound [`commands`] from the bus transport,
//! outbound [`events`] to whatever sink the firmware wires up.

pub mod commands;
pub mod events;
pub mod ports;
