//! HIP association states.
//!
//! Kept here, rather than in `hip-state-machine`, since both the HADB and
//! the state machine need to name these states without a circular crate
//! dependency.

use std::fmt;

/// State of a [`crate`]-level host association.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HipState {
    Unassociated,
    I1Sent,
    I2Sent,
    R2Sent,
    Established,
    Closing,
    Closed,
    Failed,
}

impl HipState {
    /// Keys are present iff state >= R2_SENT in this ordering.
    pub fn has_keys(self) -> bool {
        matches!(
            self,
            HipState::R2Sent | HipState::Established | HipState::Closing | HipState::Closed
        )
    }
}

impl fmt::Display for HipState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            HipState::Unassociated => "UNASSOC",
            HipState::I1Sent => "I1_SENT",
            HipState::I2Sent => "I2_SENT",
            HipState::R2Sent => "R2_SENT",
            HipState::Established => "ESTABLISHED",
            HipState::Closing => "CLOSING",
            HipState::Closed => "CLOSED",
            HipState::Failed => "FAILED",
        };
        write!(f, "{s}")
    }
}
