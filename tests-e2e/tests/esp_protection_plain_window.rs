//! A middlebox with no SA keys can still authenticate a stream of ESP
//! packets protected by the PLAIN hash-chain transform, as long as each
//! disclosed token arrives within the negotiated window — and correctly
//! refuses to once a gap grows too large.

use hip_crypto::hashchain::HashChain;
use hip_esp_protection::{EspProtectionError, TransformConfig};
use hip_firewall::HipTuple;
use hip_fw::Firewall;
use hip_types::Hit;
use hip_wire::PacketType;

fn tuple() -> HipTuple {
    HipTuple {
        local_hit: Hit::from_bytes([1; 16]),
        peer_hit: Hit::from_bytes([2; 16]),
        local_addr: "10.0.0.1".parse().unwrap(),
        peer_addr: "10.0.0.2".parse().unwrap(),
    }
}

#[test]
fn firewall_authenticates_a_disclosed_chain_through_a_full_base_exchange_and_data_flow() {
    let mut fw = Firewall::new();
    let t = tuple();
    fw.observe_control(t, PacketType::I1);
    fw.observe_control(t, PacketType::I2);
    fw.observe_control(t, PacketType::R2);

    let spi = 0x1000;
    let chain = HashChain::generate(b"plain-window-e2e", 16).unwrap();
    let config = TransformConfig::plain(4);
    fw.install_verifier(spi, &config, chain.anchor(), 0);

    for (seq, idx) in (1..=4u32).zip(0..4usize) {
        let token = chain.element(idx).unwrap();
        assert!(fw.verify_esp_token(spi, seq, &token).is_ok(), "seq {seq} should authenticate in order");
    }
}

#[test]
fn a_disclosure_arriving_after_the_window_has_slid_past_it_is_rejected() {
    let mut fw = Firewall::new();
    let chain = HashChain::generate(b"plain-window-e2e-2", 16).unwrap();
    let config = TransformConfig::plain(2);
    let spi = 0x2000;
    fw.install_verifier(spi, &config, chain.anchor(), 0);

    // Skip straight to a token far beyond the 2-hop window.
    let far_token = chain.element(10).unwrap();
    let err = fw.verify_esp_token(spi, 11, &far_token).unwrap_err();
    match err {
        hip_fw::FirewallError::Protection(EspProtectionError::OutOfWindow { .. }) => {}
        other => panic!("expected OutOfWindow, got {other:?}"),
    }
}
