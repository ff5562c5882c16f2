//! `serialize`: Message → bytes, emitting TLVs in ascending type order and
//! writing `header_length` last, before the checksum pass.

use crate::header::HEADER_LEN;
use crate::message::Message;

/// Serialize `message` with its params (assumed already in ascending
/// order, as `Message::push` maintains). The checksum field is left as
/// whatever `message.header.checksum` holds; callers needing a real
/// checksum should compute it over this output with the field zeroed and
/// patch bytes `[4..6]` afterward (see `checksum::compute_checksum`).
pub fn serialize(message: &Message) -> Vec<u8> {
    let mut body = Vec::new();
    for tlv in &message.params {
        tlv.encode(&mut body);
    }

    let mut header = message.header.clone();
    let total_len = HEADER_LEN + body.len();
    header.header_length = ((total_len / 8) - 1) as u8;

    let mut out = header.to_bytes().to_vec();
    out.extend_from_slice(&body);
    out
}

/// Build the HMAC2 pseudo-message used when computing/verifying the R2's
/// HMAC2: a copy of `message` with the HMAC2 TLV removed and the HOST_ID
/// appended in its canonical form, since HMAC2 binds the responder's
/// identity into R2 without R2 actually carrying a HOST_ID TLV of its own
///.
pub fn build_pseudo_for_hmac2(message: &Message, responder_host_id_tlv: &crate::tlv::Tlv) -> Vec<u8> {
    let mut pseudo = message.clone();
    pseudo.params.retain(|t| t.param_type != crate::tlv::param_type::HMAC2);
    pseudo.push(responder_host_id_tlv.clone());
    serialize(&pseudo)
}
