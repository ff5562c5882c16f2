//! Local Scope Identifier.
//!
//! LSIs present as a dotted-quad address carved out of the 1.0.0.0/8 block,
//! letting legacy socket APIs address a HIT-based association.

use std::fmt;

/// The /8 network LSIs are allocated from.
pub const LSI_PREFIX: u8 = 1;

/// A 32-bit Local Scope Identifier shadowing a HIT for legacy APIs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Lsi([u8; 4]);

impl Lsi {
    /// Build an LSI from the three host-part octets; the network octet is
    /// fixed at [`LSI_PREFIX`].
    pub fn new(b: u8, c: u8, d: u8) -> Self {
        Self([LSI_PREFIX, b, c, d])
    }

    /// Build an LSI from already-prefixed bytes (e.g. read off the wire).
    /// Returns `None` if the bytes are not in the 1.0.0.0/8 block.
    pub fn from_bytes(bytes: [u8; 4]) -> Option<Self> {
        if bytes[0] == LSI_PREFIX {
            Some(Self(bytes))
        } else {
            None
        }
    }

    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }
}

impl fmt::Display for Lsi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}.{}", self.0[0], self.0[1], self.0[2], self.0[3])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_block_bytes() {
        assert!(Lsi::from_bytes([2, 0, 0, 1]).is_none());
        assert!(Lsi::from_bytes([1, 0, 0, 1]).is_some());
    }

    #[test]
    fn display_is_dotted_quad() {
        let lsi = Lsi::new(2, 3, 4);
        assert_eq!(format!("{lsi}"), "1.2.3.4");
    }
}
