//! BEET (Bound End-to-End Tunnel) mode ESP encode/decode: the inner packet
//! keeps its HIT/LSI addressing, while the wire format carries only the
//! SPI and the peer's real transport address. A receiver recovers the
//! inner addressing purely from which SPI the packet arrived under.

use hip_crypto::symmetric::{decrypt, encrypt, SymmetricTransform};

use crate::errors::SaError;
use crate::sa::SaEntry;

const SPI_LEN: usize = 4;
const SEQ_LEN: usize = 4;
const ICV_LEN: usize = 12;

/// Encrypt and authenticate an inner (HIT-addressed) packet for
/// transmission under `sa`, producing a full ESP packet:
/// `SPI || SEQ || IV || ciphertext || truncated-ICV`.
pub fn encode_outbound(sa: &mut SaEntry, next_header: u8, inner_packet: &[u8]) -> Vec<u8> {
    let seq = sa.next_outbound_seq();
    let iv = deterministic_iv(sa.transform, sa.spi, seq);
    let trailer_padded = append_trailer(sa.transform, next_header, inner_packet);
    let ciphertext = encrypt(sa.transform, &sa.enc_key, &iv, &trailer_padded)
        .expect("outbound key/iv lengths are validated when the SA is installed");

    let mut out = Vec::with_capacity(SPI_LEN + SEQ_LEN + iv.len() + ciphertext.len() + ICV_LEN);
    out.extend_from_slice(&sa.spi.to_be_bytes());
    out.extend_from_slice(&seq.to_be_bytes());
    out.extend_from_slice(&iv);
    out.extend_from_slice(&ciphertext);
    let mac = hip_crypto::hmac_sha1(&sa.auth_key, &out, ICV_LEN);
    out.extend_from_slice(&mac);
    out
}

/// Decrypt and verify an ESP packet against `sa`, returning the recovered
/// inner packet and its next-header value. `sa` must already be the one
/// identified by the packet's SPI field.
pub fn decode_inbound(sa: &mut SaEntry, esp_packet: &[u8]) -> Result<(Vec<u8>, u8), SaError> {
    if esp_packet.len() < SPI_LEN + SEQ_LEN + ICV_LEN {
        return Err(SaError::Truncated);
    }
    let (header_and_body, mac) = esp_packet.split_at(esp_packet.len() - ICV_LEN);
    let expected_mac = hip_crypto::hmac_sha1(&sa.auth_key, header_and_body, ICV_LEN);
    if !hip_crypto::constant_time_eq(&expected_mac, mac) {
        return Err(SaError::AuthenticationFailed);
    }

    let seq = u32::from_be_bytes(header_and_body[SPI_LEN..SPI_LEN + SEQ_LEN].try_into().unwrap());
    if !sa.replay_window.check_and_update(seq) {
        return Err(SaError::Replay { seq, floor: sa.replay_window.floor() });
    }

    let iv_len = sa.transform.block_len().max(1);
    let iv_start = SPI_LEN + SEQ_LEN;
    let iv_end = iv_start + if sa.transform.block_len() > 1 { iv_len } else { 0 };
    let iv = &header_and_body[iv_start..iv_end];
    let ciphertext = &header_and_body[iv_end..];

    let padded = decrypt(sa.transform, &sa.enc_key, iv, ciphertext).map_err(|_| SaError::DecryptionFailed)?;
    strip_trailer(&padded)
}

fn deterministic_iv(transform: SymmetricTransform, spi: u32, seq: u32) -> Vec<u8> {
    if transform.block_len() <= 1 {
        return Vec::new();
    }
    let material = hip_crypto::sha1_many(&[&spi.to_be_bytes(), &seq.to_be_bytes()]);
    material[..transform.block_len()].to_vec()
}

/// Append the ESP trailer (`[padding][pad length][next header]`) to
/// `plaintext`. NULL has no block cipher to align itself, so the trailer
/// pads to a 4-byte boundary by hand; block ciphers rely on their own
/// PKCS#7 padding for alignment and only need the explicit pad length of
/// zero plus the next-header byte.
fn append_trailer(transform: SymmetricTransform, next_header: u8, plaintext: &[u8]) -> Vec<u8> {
    let mut out = plaintext.to_vec();
    if transform.block_len() <= 1 {
        let unpadded_len = out.len() + 2;
        let pad_len = (4 - unpadded_len % 4) % 4;
        for i in 1..=pad_len {
            out.push(i as u8);
        }
        out.push(pad_len as u8);
    } else {
        out.push(0u8);
    }
    out.push(next_header);
    out
}

fn strip_trailer(data: &[u8]) -> Result<(Vec<u8>, u8), SaError> {
    if data.len() < 2 {
        return Err(SaError::MalformedTrailer);
    }
    let next_header = data[data.len() - 1];
    let pad_len = data[data.len() - 2] as usize;
    if data.len() < 2 + pad_len {
        return Err(SaError::MalformedTrailer);
    }
    let payload_end = data.len() - 2 - pad_len;
    Ok((data[..payload_end].to_vec(), next_header))
}
