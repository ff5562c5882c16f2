//! Host Identity Tag.
//!
//! Host Identity Tag derivation (`host_id_to_hit`).

use std::fmt;

/// Length of a HIT in bytes (128 bits).
pub const HIT_LEN: usize = 16;

/// The ORCHID prefix (RFC 4843), occupying the top 28 bits of every HIT.
/// Represented here as the first 4 bytes with the low nibble of the 4th
/// byte reserved for the HIT-type selector (OR'd in by `Hit::from_hash`).
const ORCHID_PREFIX: [u8; 4] = [0x20, 0x01, 0x00, 0x10];

/// Which hash construction produced a HIT's suffix bits.
///
/// Only `Hash100` (SHA-1-based) is defined today; the
/// selector is still modeled as an enum rather than a bare bit so a second
/// hash-type selector can be added without renegotiating the wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HitType {
    /// SHA-1(canonical HI)[0..10], the only type currently defined.
    Hash100,
}

impl HitType {
    /// The 4-bit selector OR'd into the low nibble of the ORCHID prefix.
    fn selector_bits(self) -> u8 {
        match self {
            HitType::Hash100 => 0x1,
        }
    }
}

/// A 128-bit Host Identity Tag.
///
/// Equality and ordering are bytewise, giving a strict total order over
/// HITs that the I2/I2 collision rule relies on.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Hit([u8; HIT_LEN]);

impl Hit {
    /// Build a HIT from raw bytes, without re-deriving or checking the
    /// ORCHID prefix. Used when the bytes are already known-good (e.g. read
    /// off the wire) — use [`Hit::from_hash`] when deriving one locally.
    pub fn from_bytes(bytes: [u8; HIT_LEN]) -> Self {
        Self(bytes)
    }

    /// Derive a HIT from a 96-bit hash suffix and a [`HitType`], per
    /// `host_id_to_hit`: the ORCHID prefix is combined with the
    /// type selector bits, followed by the truncated hash.
    ///
    /// # Panics
    ///
    /// Panics if `hash_suffix` is not exactly 12 bytes (96 bits) — the
    /// caller (`hip-crypto`) always passes a SHA-1 digest truncated to this
    /// width, so this indicates a programming error, not bad input.
    pub fn from_hash(hash_type: HitType, hash_suffix: &[u8]) -> Self {
        assert_eq!(hash_suffix.len(), 12, "HIT hash suffix must be 96 bits");
        let mut bytes = [0u8; HIT_LEN];
        bytes[0..4].copy_from_slice(&ORCHID_PREFIX);
        bytes[3] |= hash_type.selector_bits();
        bytes[4..16].copy_from_slice(hash_suffix);
        Self(bytes)
    }

    /// Raw 16-byte representation.
    pub fn as_bytes(&self) -> &[u8; HIT_LEN] {
        &self.0
    }

    /// Whether the ORCHID prefix bits are present. Used to reject HITs
    /// parsed off the wire that aren't plausibly HITs at all.
    pub fn has_orchid_prefix(&self) -> bool {
        self.0[0] == ORCHID_PREFIX[0]
            && self.0[1] == ORCHID_PREFIX[1]
            && self.0[2] == ORCHID_PREFIX[2]
            && (self.0[3] & 0xF0) == (ORCHID_PREFIX[3] & 0xF0)
    }

    /// True iff `self` is strictly greater than `other` under the bytewise
    /// total order the I2/I2 collision rule relies on.
    pub fn is_bigger_than(&self, other: &Hit) -> bool {
        self.0 > other.0
    }
}

impl AsRef<[u8]> for Hit {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Hit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hit({})", self)
    }
}

impl fmt::Display for Hit {
    /// Colon-hex, IPv6-like presentation form.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, chunk) in self.0.chunks(2).enumerate() {
            if i > 0 {
                write!(f, ":")?;
            }
            write!(f, "{:02x}{:02x}", chunk[0], chunk[1])?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_hash_carries_orchid_prefix() {
        let hit = Hit::from_hash(HitType::Hash100, &[0xAB; 12]);
        assert!(hit.has_orchid_prefix());
    }

    #[test]
    fn total_order_is_strict() {
        let a = Hit::from_bytes([1u8; 16]);
        let b = Hit::from_bytes([2u8; 16]);
        assert!(a < b);
        assert!(b > a);
        assert!(a == a);
        assert!(!(a < a));
        assert_eq!(a.is_bigger_than(&b), false);
        assert!(b.is_bigger_than(&a));
    }

    #[test]
    fn display_is_colon_hex() {
        let hit = Hit::from_bytes([
            0x20, 0x01, 0x00, 0x11, 0xaa, 0xbb, 0xcc, 0xdd, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x00, 0x01,
        ]);
        assert_eq!(format!("{hit}"), "2001:0011:aabb:ccdd:0000:0000:0000:0001");
    }

    #[test]
    #[should_panic(expected = "96 bits")]
    fn from_hash_rejects_wrong_length() {
        let _ = Hit::from_hash(HitType::Hash100, &[0u8; 10]);
    }
}
