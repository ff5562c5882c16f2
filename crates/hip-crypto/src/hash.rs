//! SHA-1 hashing and HMAC-SHA1, the fixed hash used throughout HIPv1 keymat,
//! puzzles, and HIT derivation.
//!
//! Thin wrappers mirroring the rest of the crate's hashing primitives.

use hmac::{Hmac, Mac};
use sha1::{Digest, Sha1};

/// Raw 160-bit SHA-1 digest.
pub type Sha1Digest = [u8; 20];

/// One-shot SHA-1 over a single buffer.
pub fn sha1(data: &[u8]) -> Sha1Digest {
    let mut hasher = Sha1::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// One-shot SHA-1 over multiple buffers, without concatenating them first.
pub fn sha1_many(parts: &[&[u8]]) -> Sha1Digest {
    let mut hasher = Sha1::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

/// SHA-1 truncated to the first `n` bytes (used for the 96-bit HIT suffix).
pub fn sha1_truncated(data: &[u8], n: usize) -> Vec<u8> {
    sha1(data)[..n].to_vec()
}

/// HMAC-SHA1 over a single buffer, truncated to `out_len` bytes.
pub fn hmac_sha1(key: &[u8], data: &[u8], out_len: usize) -> Vec<u8> {
    let mut mac = Hmac::<Sha1>::new_from_slice(key).expect("HMAC accepts any key length");
    mac.update(data);
    let full = mac.finalize().into_bytes();
    full[..out_len.min(full.len())].to_vec()
}

/// Constant-time comparison of two byte slices of possibly differing length.
/// Used wherever a computed MAC/hash is compared against an attacker-
/// controlled value (HMAC verification, puzzle solution check).
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha1_is_deterministic() {
        assert_eq!(sha1(b"hip"), sha1(b"hip"));
        assert_ne!(sha1(b"hip"), sha1(b"hop"));
    }

    #[test]
    fn sha1_many_matches_concatenation() {
        let concatenated = sha1(b"helloworld");
        let many = sha1_many(&[b"hello", b"world"]);
        assert_eq!(concatenated, many);
    }

    #[test]
    fn hmac_truncation_respects_out_len() {
        let mac = hmac_sha1(b"key", b"data", 12);
        assert_eq!(mac.len(), 12);
    }

    #[test]
    fn constant_time_eq_rejects_length_mismatch() {
        assert!(!constant_time_eq(b"abc", b"ab"));
        assert!(constant_time_eq(b"abc", b"abc"));
        assert!(!constant_time_eq(b"abc", b"abd"));
    }
}
