//! # Shared HIP Value Types
//!
//! Identity and addressing primitives shared across the control-plane,
//! crypto, HADB, and connection-tracker crates.
//!
//! ## Components
//!
//! | Module | Contents |
//! |--------|----------|
//! | `hit`  | Host Identity Tag: 128-bit ORCHID-prefixed hash of a Host Identity |
//! | `lsi`  | Local Scope Identifier: 32-bit legacy shadow of a HIT |
//! | `peer` | `PeerId`, the `Known(Hit) | Opportunistic(IpAddr)` distinction |
//! | `state`| HIP association state enum shared by the state machine and HADB |

mod hit;
mod lsi;
mod peer;
mod state;

pub use hit::{Hit, HitType, HIT_LEN};
pub use lsi::{Lsi, LSI_PREFIX};
pub use peer::PeerId;
pub use state::HipState;

/// HIP protocol version in use for a host association.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HipVersion {
    /// RFC 5201 base exchange semantics.
    V1,
    /// RFC 7401 base exchange semantics (adds DH group negotiation lists).
    V2,
}

/// NAT traversal mode recorded on a host association. Only plain UDP
/// encapsulation is modeled; ICE-style hole punching is out of scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NatMode {
    #[default]
    None,
    PlainUdp,
}
