//! Opportunistic-mode peer identity.
//!
//! Opportunistic mode is modeled as a
//! first-class enum rather than a synthesized pseudo-HIT, so callers that
//! require a real public key (anything past R1) cannot accidentally compile
//! against the opportunistic branch.

use std::net::IpAddr;

use crate::Hit;

/// Identity of a HIP peer as known to the initiator at a given point in the
/// exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PeerId {
    /// The peer's HIT is known (normal case, or learned from R1).
    Known(Hit),
    /// The peer's HIT is not yet known; only a destination address is.
    /// Disallowed anywhere the peer's public key is required — the state
    /// machine narrows this to `Known` once R1 supplies the peer's `HOST_ID`.
    Opportunistic(IpAddr),
}

impl PeerId {
    /// The HIT, if known.
    pub fn hit(&self) -> Option<Hit> {
        match self {
            PeerId::Known(hit) => Some(*hit),
            PeerId::Opportunistic(_) => None,
        }
    }

    pub fn is_opportunistic(&self) -> bool {
        matches!(self, PeerId::Opportunistic(_))
    }
}
