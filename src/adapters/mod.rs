//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements  | Connects to                      |
//! |------------|-------------|----------------------------------|
//! | `log_sink` | EventSink   | `log` facade / serial console    |
//! | `nvs`      | ConfigPort  | NVS / in-memory store            |
//! | `time`     | TimePort    | ESP32 system timer / `Instant`   |

pub mod log_sink;
pub mod nvs;
pub mod time;
