//! Most-restrictive-wins limit arbitration.
//!
//! The BMS encodes "no limit" as a non-positive value.  Inside the
//! arbiter that sentinel becomes [`Limit::None`]; it turns back into
//! `0.0` only when written into [`ChargerState`](crate::charger::ChargerState).

/// A limit that may or may not be asserted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Limit {
    /// No limit asserted.
    None,
    /// Upper bound in volts or amps.
    Max(f32),
}

impl Limit {
    /// Decode a raw remote value.  `<= 0` (and NaN) means no limit.
    pub fn from_raw(raw: f32) -> Self {
        if raw > 0.0 { Self::Max(raw) } else { Self::None }
    }

    /// Combine with a local bound; the smaller value wins.
    /// An absent remote limit stays absent.
    #[must_use]
    pub fn capped_at(self, local_max: f32) -> Self {
        match self {
            Self::None => Self::None,
            Self::Max(remote) => Self::Max(remote.min(local_max)),
        }
    }

    /// Encode for the charger record (`0.0` = no limit).
    pub fn to_raw(self) -> f32 {
        match self {
            Self::None => 0.0,
            Self::Max(v) => v,
        }
    }
}

/// Arbitrate one remote value against a local bound, returning the raw
/// record value.
pub fn arbitrate(remote: f32, local_max: f32) -> f32 {
    Limit::from_raw(remote).capped_at(local_max).to_raw()
}
