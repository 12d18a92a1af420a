//! BMS heartbeat watchdog.
//!
//! Tracks when the BMS master last spoke and classifies the link on each
//! control tick.  Transitions are reported once, on the edge, so the
//! caller can log them without repeating itself every second.
//!
//! ```text
//!   Uninitialized ──(tick, no heartbeat)──▶ TimedOut
//!   Uninitialized ──(tick, fresh)─────────▶ Healthy
//!   Healthy  ──(silence > timeout)──▶ TimedOut
//!   TimedOut ──(fresh heartbeat)────▶ Healthy
//! ```

use serde::{Deserialize, Serialize};

/// Link state as seen by the watchdog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LinkState {
    /// No tick evaluated yet.
    Uninitialized,
    Healthy,
    TimedOut,
}

/// Edge reported by [`HeartbeatWatchdog::evaluate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkTransition {
    /// Entered `TimedOut` (from `Uninitialized` or `Healthy`).
    Lost,
    /// `TimedOut` → `Healthy`.
    Restored,
}

pub struct HeartbeatWatchdog {
    timeout_secs: u32,
    /// `None` until the first heartbeat.
    last_heartbeat: Option<u64>,
    state: LinkState,
}

impl HeartbeatWatchdog {
    pub fn new(timeout_secs: u32) -> Self {
        Self {
            timeout_secs,
            last_heartbeat: None,
            state: LinkState::Uninitialized,
        }
    }

    /// Continue from a charger record that is already flagged as timed out.
    /// The first fresh tick then reports [`LinkTransition::Restored`].
    pub fn resuming(timeout_secs: u32, timed_out: bool) -> Self {
        let mut wd = Self::new(timeout_secs);
        if timed_out {
            wd.state = LinkState::TimedOut;
        }
        wd
    }

    /// Record liveness evidence at `now`.
    pub fn feed(&mut self, now: u64) {
        self.last_heartbeat = Some(now);
    }

    /// True if the last heartbeat is within the timeout window at `now`.
    /// Silence of exactly `timeout_secs` still counts as alive.
    pub fn is_fresh(&self, now: u64) -> bool {
        match self.last_heartbeat {
            None => false,
            Some(t) => now.saturating_sub(t) <= u64::from(self.timeout_secs),
        }
    }

    /// Classify the link at `now` and report an edge if the state changed.
    pub fn evaluate(&mut self, now: u64) -> Option<LinkTransition> {
        let next = if self.is_fresh(now) {
            LinkState::Healthy
        } else {
            LinkState::TimedOut
        };
        let prev = core::mem::replace(&mut self.state, next);

        match (prev, next) {
            (LinkState::TimedOut, LinkState::TimedOut) => None,
            (_, LinkState::TimedOut) => Some(LinkTransition::Lost),
            (LinkState::TimedOut, LinkState::Healthy) => Some(LinkTransition::Restored),
            _ => None,
        }
    }

    pub fn state(&self) -> LinkState {
        self.state
    }

    /// Seconds since the last heartbeat, `None` if never fed.
    pub fn silence_secs(&self, now: u64) -> Option<u64> {
        self.last_heartbeat.map(|t| now.saturating_sub(t))
    }
}
