//! TPA (token-based per-packet authentication) hash chains, used by
//! ESP-protection's PLAIN/CUMULATIVE/PARA_CUMUL transforms. A chain is generated backwards from a random seed by repeated
//! hashing, then disclosed forwards: the anchor (chain tail) is exchanged
//! during the base exchange or an UPDATE, and each packet reveals the next
//! element, which must hash to the previously disclosed one.

use crate::errors::CryptoError;
use crate::hash::sha1;

/// One generated hash chain. Elements are produced in generation order
/// (`elements[0]` = anchor, the last value computed; `elements[len-1]` =
/// the seed). Disclosure proceeds in the opposite direction, from the seed
/// towards the anchor.
pub struct HashChain {
    elements: Vec<[u8; 20]>,
}

impl HashChain {
    /// Generate a chain of `length` elements from `seed`. `elements[0]` is
    /// `SHA1^length(seed)`, the chain's anchor; `elements[length - 1]` is
    /// `SHA1(seed)`, the first element ever disclosed.
    pub fn generate(seed: &[u8], length: usize) -> Result<Self, CryptoError> {
        if length == 0 {
            return Err(CryptoError::InvalidChainParameters("chain length must be > 0"));
        }
        let mut elements = Vec::with_capacity(length);
        let mut current = sha1(seed);
        elements.push(current);
        for _ in 1..length {
            current = sha1(&current);
            elements.push(current);
        }
        elements.reverse();
        Ok(HashChain { elements })
    }

    /// The chain anchor (last value computed during generation, disclosed
    /// first — e.g. in the ESP_PROT_ANCHOR parameter of I2/R2).
    pub fn anchor(&self) -> [u8; 20] {
        self.elements[0]
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// The element disclosed for packet index `idx` (0-based, in disclosure
    /// order: idx 0 is the first element after the anchor).
    pub fn element(&self, idx: usize) -> Option<[u8; 20]> {
        self.elements.get(idx + 1).copied()
    }
}

/// Verify that `candidate` is the next element after `previously_verified`
/// in a hash chain whose tail is ultimately `anchor`, by hashing forward
/// `hops` times. Used on the receiving side, which does not hold the chain
/// itself — only the last anchor it verified and the claimed hop count.
pub fn verify_link(previously_verified: &[u8; 20], candidate: &[u8; 20], hops: u32) -> bool {
    if hops == 0 {
        return previously_verified == candidate;
    }
    let mut current = sha1(candidate);
    for _ in 1..hops {
        current = sha1(&current);
    }
    &current == previously_verified
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_rejects_zero_length() {
        assert!(HashChain::generate(b"seed", 0).is_err());
    }

    #[test]
    fn anchor_verifies_first_disclosed_element() {
        let chain = HashChain::generate(b"chain-seed", 8).unwrap();
        let anchor = chain.anchor();
        let first = chain.element(0).unwrap();
        assert!(verify_link(&anchor, &first, 1));
    }

    #[test]
    fn out_of_order_disclosure_fails_single_hop_check() {
        let chain = HashChain::generate(b"chain-seed", 8).unwrap();
        let anchor = chain.anchor();
        let third = chain.element(2).unwrap();
        assert!(!verify_link(&anchor, &third, 1));
        assert!(verify_link(&anchor, &third, 3));
    }

    #[test]
    fn chain_elements_are_all_distinct() {
        let chain = HashChain::generate(b"distinctness", 16).unwrap();
        let mut seen = std::collections::HashSet::new();
        seen.insert(chain.anchor());
        for idx in 0..chain.len() - 1 {
            assert!(seen.insert(chain.element(idx).unwrap()));
        }
    }
}
