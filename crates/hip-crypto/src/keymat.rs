//! Keying material derivation (KEYMAT).
//!
//! HIP derives an effectively unbounded keystream from the DH shared secret
//! by repeated hashing: `K1 = SHA1(Kij | sort(HIT_I, HIT_R) | I | J | 1)`,
//! `K(n+1) = SHA1(Kij | K(n) | n+1)`, and the stream is `K1 || K2 || K3 || ...`.
//! Eight fixed-length keys are then drawn from the front of that stream in
//! a fixed order.

use crate::hash::sha1;

/// Order keys are drawn from the keymat stream (RFC 5201 Section 6.5.1 /
/// HIP control-plane keys first, then ESP keys, each
/// pair in (initiator-to-responder, responder-to-initiator) order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeymatSlot {
    HipEncryptIR,
    HipAuthIR,
    HipEncryptRI,
    HipAuthRI,
    EspEncryptIR,
    EspAuthIR,
    EspEncryptRI,
    EspAuthRI,
}

impl KeymatSlot {
    /// Fixed draw order; index into this to compute cumulative byte offsets.
    pub const ORDER: [KeymatSlot; 8] = [
        KeymatSlot::HipEncryptIR,
        KeymatSlot::HipAuthIR,
        KeymatSlot::HipEncryptRI,
        KeymatSlot::HipAuthRI,
        KeymatSlot::EspEncryptIR,
        KeymatSlot::EspAuthIR,
        KeymatSlot::EspEncryptRI,
        KeymatSlot::EspAuthRI,
    ];
}

/// A generator for the KEYMAT hash chain, producing bytes lazily and caching
/// previously generated blocks so repeated draws don't redo work.
pub struct KeymatStream {
    kij: Vec<u8>,
    seed: Vec<u8>,
    blocks: Vec<[u8; 20]>,
}

impl KeymatStream {
    /// `kij` is the DH shared secret; `sorted_hits` is `HIT_I || HIT_R` or
    /// `HIT_R || HIT_I`, whichever HIT sorts smaller first; `i` and `j`
    /// are the initiator's and responder's nonces from I2/R1.
    pub fn new(kij: &[u8], sorted_hits: &[u8], i: &[u8], j: &[u8]) -> Self {
        let mut seed = Vec::with_capacity(sorted_hits.len() + i.len() + j.len());
        seed.extend_from_slice(sorted_hits);
        seed.extend_from_slice(i);
        seed.extend_from_slice(j);
        KeymatStream {
            kij: kij.to_vec(),
            seed,
            blocks: Vec::new(),
        }
    }

    fn ensure_blocks(&mut self, count: usize) {
        while self.blocks.len() < count {
            // Blocks are numbered from 1; the counter is appended to every
            // block's hash input, including the first.
            let n = (self.blocks.len() + 1) as u8;
            let block = match self.blocks.last() {
                None => {
                    let mut input = self.kij.clone();
                    input.extend_from_slice(&self.seed);
                    input.push(n);
                    sha1(&input)
                }
                Some(prev) => {
                    let mut input = self.kij.clone();
                    input.extend_from_slice(prev);
                    input.push(n);
                    sha1(&input)
                }
            };
            self.blocks.push(block);
        }
    }

    /// Return `len` bytes starting at stream offset `offset`.
    pub fn bytes_at(&mut self, offset: usize, len: usize) -> Vec<u8> {
        let end = offset + len;
        let blocks_needed = end.div_ceil(20);
        self.ensure_blocks(blocks_needed);
        let mut flat = Vec::with_capacity(blocks_needed * 20);
        for block in &self.blocks[..blocks_needed] {
            flat.extend_from_slice(block);
        }
        flat[offset..end].to_vec()
    }
}

/// Draw all eight fixed-length keys, given the symmetric transform's key
/// and MAC key lengths (keys of the same length for both directions).
pub fn draw_all(
    stream: &mut KeymatStream,
    cipher_key_len: usize,
    mac_key_len: usize,
) -> [Vec<u8>; 8] {
    let lens = [
        cipher_key_len,
        mac_key_len,
        cipher_key_len,
        mac_key_len,
        cipher_key_len,
        mac_key_len,
        cipher_key_len,
        mac_key_len,
    ];
    let mut offset = 0usize;
    let mut out: [Vec<u8>; 8] = Default::default();
    for (idx, len) in lens.iter().enumerate() {
        out[idx] = stream.bytes_at(offset, *len);
        offset += len;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stream_is_deterministic_given_same_inputs() {
        let mut a = KeymatStream::new(b"shared-secret", b"hits", b"i-nonce", b"j-nonce");
        let mut b = KeymatStream::new(b"shared-secret", b"hits", b"i-nonce", b"j-nonce");
        assert_eq!(a.bytes_at(0, 64), b.bytes_at(0, 64));
    }

    #[test]
    fn different_seeds_produce_different_streams() {
        let mut a = KeymatStream::new(b"shared-secret", b"hits-a", b"i", b"j");
        let mut b = KeymatStream::new(b"shared-secret", b"hits-b", b"i", b"j");
        assert_ne!(a.bytes_at(0, 20), b.bytes_at(0, 20));
    }

    #[test]
    fn draw_all_produces_non_overlapping_keys() {
        let mut stream = KeymatStream::new(b"k", b"hits", b"i", b"j");
        let keys = draw_all(&mut stream, 16, 20);
        assert_eq!(keys[0].len(), 16);
        assert_eq!(keys[1].len(), 20);
        // Spans should be contiguous and non-overlapping: concatenating all
        // eight keys must equal a single draw of the same total length.
        let total_len: usize = keys.iter().map(|k| k.len()).sum();
        let mut stream2 = KeymatStream::new(b"k", b"hits", b"i", b"j");
        let whole = stream2.bytes_at(0, total_len);
        let concatenated: Vec<u8> = keys.iter().flatten().copied().collect();
        assert_eq!(whole, concatenated);
    }

    #[test]
    fn bytes_at_spans_multiple_hash_blocks() {
        let mut stream = KeymatStream::new(b"k", b"s", b"i", b"j");
        let got = stream.bytes_at(0, 45);
        assert_eq!(got.len(), 45);
        assert_eq!(stream.blocks.len(), 3);
    }
}
