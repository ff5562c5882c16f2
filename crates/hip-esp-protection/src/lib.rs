//! Lightweight per-packet ESP authentication layered on top of SPI-based
//! security associations: hash-chain and hash-tree tokens that let a
//! receiver cheaply verify packet provenance without a signature on every
//! packet, plus the anchor-rollover protocol that keeps a chain or tree
//! from running out.

mod anchor_update;
mod errors;
mod transform;
mod verifier;

pub use anchor_update::{AnchorUpdateCache, Direction};
pub use errors::EspProtectionError;
pub use transform::{EspProtTransform, TransformConfig};
pub use verifier::PacketVerifier;
