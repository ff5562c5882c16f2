//! A full HIPv1 base exchange between two hosts: I1 draws a puzzle, I2
//! carries a correctly solved puzzle plus a signed HMAC'd proposal, the
//! responder derives KEYMAT, installs both SAs, and answers with a signed
//! R2; the resulting SAs carry an ESP packet round-trip in BEET mode.

use std::net::{IpAddr, Ipv4Addr};
use std::time::Instant;

use hip_crypto::dh::DhGroup;
use hip_crypto::keymat::{draw_all, KeymatSlot, KeymatStream};
use hip_crypto::sign::HostKeyPair;
use hip_crypto::symmetric::SymmetricTransform;
use hip_hadb::Hadb;
use hip_puzzle::{PuzzleCache, R1Signer};
use hip_sa::{decode_inbound, encode_outbound, SaManager};
use hip_state_machine::{handle_i1, handle_i2, I2Outcome, LocalIdentity};
use hip_types::{HipState, Hit};
use hip_wire::header::{HipHeader, PacketType};
use hip_wire::params::{DiffieHellman, EspInfo, HiAlgo, HmacParam, HostId, Solution, SignatureParam, TransformList};
use hip_wire::serialize::serialize;
use hip_wire::{param_type, Message};
use p256::ecdsa::SigningKey as P256SigningKey;

fn ecdsa_identity() -> LocalIdentity {
    let mut rng = rand::thread_rng();
    let keypair = HostKeyPair::EcdsaP256(Box::new(P256SigningKey::random(&mut rng)));
    let host_id = HostId {
        algo: HiAlgo::EcdsaP256,
        key_bytes: keypair.public().to_host_id_bytes().unwrap(),
        hostname: None,
    };
    LocalIdentity {
        keypair,
        host_id,
        hip_transforms: vec![SymmetricTransform::AesCbc.transform_id()],
        esp_transforms: vec![SymmetricTransform::AesCbc.transform_id()],
    }
}

fn serialize_without(message: &Message, excluded: &[u16]) -> Vec<u8> {
    let mut copy = message.clone();
    copy.params.retain(|t| !excluded.contains(&t.param_type));
    serialize(&copy)
}

#[test]
fn base_exchange_establishes_symmetric_keys_and_working_sas() {
    let responder_hit = Hit::from_bytes([0xAA; 16]);
    let initiator_hit = Hit::from_bytes([0xBB; 16]);
    let loopback = IpAddr::V4(Ipv4Addr::LOCALHOST);
    let now = Instant::now();

    let responder_identity = ecdsa_identity();
    let initiator_identity = ecdsa_identity();

    let responder_signer = R1Signer {
        keypair: match &responder_identity.keypair {
            HostKeyPair::EcdsaP256(sk) => HostKeyPair::EcdsaP256(sk.clone()),
            _ => unreachable!(),
        },
        host_id: responder_identity.host_id.clone(),
        dh_group: DhGroup::NistP256,
        hip_transforms: responder_identity.hip_transforms.clone(),
        esp_transforms: responder_identity.esp_transforms.clone(),
    };
    let mut responder_cache = PuzzleCache::with_signer(responder_hit, responder_signer);
    let (i, k) = handle_i1(&mut responder_cache, now);

    let j = hip_puzzle::solve(i, &responder_hit, &initiator_hit, k);
    let responder_dh = responder_cache.dh_for(i).unwrap();
    let initiator_dh = hip_crypto::dh::DhKeyExchange::generate(DhGroup::NistP256).unwrap();
    let shared_at_responder = responder_dh.compute_shared(&initiator_dh.public_value()).unwrap();
    let shared_at_initiator = initiator_dh.compute_shared(&responder_dh.public_value()).unwrap();
    assert_eq!(shared_at_responder.as_bytes(), shared_at_initiator.as_bytes());

    let mut sorted_hits = Vec::new();
    if initiator_hit < responder_hit {
        sorted_hits.extend_from_slice(initiator_hit.as_bytes());
        sorted_hits.extend_from_slice(responder_hit.as_bytes());
    } else {
        sorted_hits.extend_from_slice(responder_hit.as_bytes());
        sorted_hits.extend_from_slice(initiator_hit.as_bytes());
    }
    let i_bytes = i.to_be_bytes();
    let j_bytes = j.to_be_bytes();

    let mut initiator_stream = KeymatStream::new(shared_at_initiator.as_bytes(), &sorted_hits, &i_bytes, &j_bytes);
    let initiator_keys = draw_all(&mut initiator_stream, 16, 20);
    let auth_key_ir = &initiator_keys[KeymatSlot::ORDER.iter().position(|s| *s == KeymatSlot::HipAuthIR).unwrap()];

    let transform = SymmetricTransform::AesCbc;
    let new_spi = 0xCAFEBABEu32;
    let header = HipHeader {
        next_header: 0,
        header_length: 0,
        packet_type: PacketType::I2,
        version: 1,
        checksum: 0,
        controls: 0,
        sender_hit: initiator_hit,
        receiver_hit: responder_hit,
    };
    let mut message = Message::new(header);
    message.push(Solution { k, opaque: 0, i, j }.to_tlv());
    message.push(
        DiffieHellman {
            group_id: DhGroup::NistP256.group_id(),
            public_value: initiator_dh.public_value(),
        }
        .to_tlv(),
    );
    message.push(TransformList::hip(vec![transform.transform_id()]).to_tlv());
    message.push(TransformList::esp(vec![transform.transform_id()]).to_tlv());
    message.push(
        EspInfo {
            old_spi: 0,
            new_spi,
            keymat_index: 0,
        }
        .to_tlv(),
    );
    message.push(initiator_identity.host_id.to_tlv());

    let hmac_input = serialize_without(&message, &[param_type::HMAC, param_type::SIGNATURE]);
    let hmac = hip_crypto::hash::hmac_sha1(auth_key_ir, &hmac_input, 20);
    message.push(HmacParam::hmac(hmac).to_tlv());

    let sig_input = serialize_without(&message, &[param_type::SIGNATURE]);
    let signature = initiator_identity.keypair.sign(&sig_input).unwrap();
    message.push(SignatureParam::signature(initiator_identity.keypair.algorithm().algo_id(), signature).to_tlv());

    let mut hadb = Hadb::new();
    let mut sa_manager = SaManager::new();
    let outcome = handle_i2(
        &mut hadb,
        &responder_cache,
        &mut sa_manager,
        &responder_identity,
        &message,
        responder_hit,
        initiator_hit,
        loopback,
        loopback,
    )
    .unwrap();

    let r2_bytes = match outcome {
        I2Outcome::Accepted(state, r2_bytes) => {
            assert_eq!(state, HipState::R2Sent);
            r2_bytes
        }
        other => panic!("expected Accepted, got {other:?}"),
    };
    let r2 = hip_wire::parse(&r2_bytes).unwrap();
    assert_eq!(r2.header.packet_type, PacketType::R2);

    let ha = hadb.find_by_hits(responder_hit, initiator_hit).unwrap();
    assert!(ha.has_esp_sas());
    assert_eq!(ha.outbound_spi.current, new_spi);
    assert_eq!(ha.keys.esp_encrypt_ir, initiator_keys[4]);
    assert_eq!(ha.keys.esp_auth_ir, initiator_keys[5]);

    let inbound_spi = ha.inbound_spi.current;
    assert_eq!(sa_manager.find_outbound(initiator_hit).unwrap().spi, new_spi);

    // Simulate the initiator side independently encoding a packet with the
    // KEYMAT it derived on its own, and the responder's installed inbound
    // SA decoding it.
    let mut initiator_out_sa = hip_sa::SaEntry::new(
        inbound_spi,
        hip_sa::Direction::Outbound,
        transform,
        initiator_keys[4].clone(),
        initiator_keys[5].clone(),
        initiator_hit,
        responder_hit,
        loopback,
        loopback,
    );
    let esp_packet = encode_outbound(&mut initiator_out_sa, 6, b"hello over the tunnel");

    let responder_in_sa = sa_manager.find_inbound_mut(inbound_spi).unwrap();
    let (recovered, next_header) = decode_inbound(responder_in_sa, &esp_packet).unwrap();
    assert_eq!(recovered, b"hello over the tunnel");
    assert_eq!(next_header, 6);
}
