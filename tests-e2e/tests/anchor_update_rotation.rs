//! Rotating an ESP-protection chain before it runs out: the sender begins
//! an UPDATE carrying the next anchor, the peer ACKs it, and only then does
//! verification switch over to a fresh chain seeded from that anchor.

use hip_crypto::hashchain::HashChain;
use hip_esp_protection::{AnchorUpdateCache, Direction, EspProtectionError, PacketVerifier, TransformConfig};

#[test]
fn anchor_update_is_idempotent_under_retransmission_and_rejects_a_conflicting_second_attempt() {
    let mut pending = AnchorUpdateCache::new();
    let new_anchor = [0x42u8; 20];

    assert!(pending.begin_update(Direction::Outbound, 0, 100, new_anchor).unwrap());
    // The same first-UPDATE retransmitted (same seq, same anchor) is a
    // no-op, not a conflict.
    assert!(!pending.begin_update(Direction::Outbound, 0, 100, new_anchor).unwrap());

    // A second, different anchor proposed while one is already pending is
    // rejected until the first completes.
    let err = pending.begin_update(Direction::Outbound, 0, 101, [0x99u8; 20]).unwrap_err();
    assert_eq!(err, EspProtectionError::UpdateAlreadyPending);
}

#[test]
fn completing_the_update_hands_back_the_anchor_to_seed_a_fresh_verifier() {
    let mut pending = AnchorUpdateCache::new();
    let old_chain = HashChain::generate(b"old-chain-seed", 8).unwrap();
    let new_chain = HashChain::generate(b"new-chain-seed", 8).unwrap();

    let mut verifier = PacketVerifier::new(&TransformConfig::plain(4), old_chain.anchor(), 0);
    for (seq, idx) in (1..=3u32).zip(0..3usize) {
        let token = old_chain.element(idx).unwrap();
        verifier.verify_token(seq, &token).unwrap();
    }

    pending.begin_update(Direction::Inbound, 0, 200, new_chain.anchor()).unwrap();
    let acked_anchor = pending.complete_update(Direction::Inbound, 0, 200).expect("update was pending");
    assert_eq!(acked_anchor, new_chain.anchor());
    assert!(!pending.is_pending(Direction::Inbound, 0));

    // Verification now continues from the new chain, starting a fresh
    // sequence count from 0.
    let mut verifier = PacketVerifier::new(&TransformConfig::plain(4), acked_anchor, 0);
    let token = new_chain.element(0).unwrap();
    assert!(verifier.verify_token(1, &token).is_ok());
}
