//! Raw TLV encode/decode: 16-bit type with a
//! "critical" low bit, 16-bit contents length, contents, then zero-padding
//! out to the next 8-byte boundary.

use crate::errors::WireError;

pub const TLV_HEADER_LEN: usize = 4;
pub const TLV_ALIGN: usize = 8;

/// Parameter type codes relevant to the core.
pub mod param_type {
    pub const R1_COUNTER: u16 = 128;
    pub const PUZZLE: u16 = 257;
    pub const SOLUTION: u16 = 321;
    pub const DIFFIE_HELLMAN: u16 = 513;
    pub const HIP_TRANSFORM: u16 = 577;
    pub const ESP_TRANSFORM: u16 = 4095;
    pub const ENCRYPTED: u16 = 641;
    pub const HOST_ID: u16 = 705;
    pub const ESP_INFO: u16 = 65;
    pub const HMAC: u16 = 61505;
    pub const HMAC2: u16 = 61569;
    pub const SIGNATURE2: u16 = 61633;
    pub const SIGNATURE: u16 = 64771;
    pub const ESP_PROT_TRANSFORMS: u16 = 4143;
    pub const ESP_PROT_ANCHOR: u16 = 4144;
    pub const ESP_PROT_BRANCH: u16 = 4145;
    pub const ESP_PROT_SECRET: u16 = 4146;
    pub const ESP_PROT_ROOT: u16 = 4147;
    pub const SEQ: u16 = 385;
    pub const ACK: u16 = 449;
    pub const NOTIFICATION: u16 = 832;
    pub const CHALLENGE_REQUEST: u16 = 908;
    pub const CHALLENGE_RESPONSE: u16 = 916;

    /// A parameter type is "critical" (MUST be understood) iff its low bit
    /// is zero, by HIP convention — this is the `critical` flag, not the
    /// numeric low bit of the type itself, which callers track separately
    /// via `Tlv::critical`.
    pub fn is_known(t: u16) -> bool {
        matches!(
            t,
            R1_COUNTER
                | PUZZLE
                | SOLUTION
                | DIFFIE_HELLMAN
                | HIP_TRANSFORM
                | ESP_TRANSFORM
                | ENCRYPTED
                | HOST_ID
                | ESP_INFO
                | HMAC
                | HMAC2
                | SIGNATURE2
                | SIGNATURE
                | ESP_PROT_TRANSFORMS
                | ESP_PROT_ANCHOR
                | ESP_PROT_BRANCH
                | ESP_PROT_SECRET
                | ESP_PROT_ROOT
                | SEQ
                | ACK
                | NOTIFICATION
                | CHALLENGE_REQUEST
                | CHALLENGE_RESPONSE
        )
    }
}

/// One parsed TLV: type, critical bit, and raw contents (padding stripped).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tlv {
    pub param_type: u16,
    pub contents: Vec<u8>,
}

impl Tlv {
    pub fn new(param_type: u16, contents: Vec<u8>) -> Self {
        Tlv { param_type, contents }
    }

    /// Whether an unrecognized parameter of this type must cause the
    /// packet to be dropped with NOTIFY(UNSUPPORTED_CRITICAL_PARAMETER_TYPE)
    /// rather than silently skipped. HMAC,
    /// signature, and sequencing parameters are integrity/ack metadata that
    /// an unaware peer can safely ignore; the rest carry protocol-critical
    /// content.
    pub fn is_critical(&self) -> bool {
        !matches!(
            self.param_type,
            param_type::HMAC
                | param_type::HMAC2
                | param_type::SIGNATURE
                | param_type::SIGNATURE2
                | param_type::SEQ
                | param_type::ACK
                | param_type::NOTIFICATION
        )
    }

    /// Total on-wire size including the 4-byte TLV header and padding.
    pub fn padded_len(&self) -> usize {
        let raw = TLV_HEADER_LEN + self.contents.len();
        raw.div_ceil(TLV_ALIGN) * TLV_ALIGN
    }

    pub fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.param_type.to_be_bytes());
        out.extend_from_slice(&(self.contents.len() as u16).to_be_bytes());
        out.extend_from_slice(&self.contents);
        let padding = self.padded_len() - TLV_HEADER_LEN - self.contents.len();
        out.extend(std::iter::repeat(0u8).take(padding));
    }

    /// Decode one TLV starting at `buf[offset]`. Returns the TLV and the
    /// offset of the next one (`offset + padded_len`).
    pub fn decode_at(buf: &[u8], offset: usize) -> Result<(Self, usize), WireError> {
        if offset + TLV_HEADER_LEN > buf.len() {
            return Err(WireError::TlvCrossesBoundary { offset });
        }
        let param_type = u16::from_be_bytes([buf[offset], buf[offset + 1]]);
        let len = u16::from_be_bytes([buf[offset + 2], buf[offset + 3]]) as usize;
        let contents_start = offset + TLV_HEADER_LEN;
        let contents_end = contents_start + len;
        if contents_end > buf.len() {
            return Err(WireError::TlvCrossesBoundary { offset });
        }
        let tlv = Tlv::new(param_type, buf[contents_start..contents_end].to_vec());
        let next = offset + tlv.padded_len();
        if next > buf.len() {
            return Err(WireError::TlvCrossesBoundary { offset });
        }
        Ok((tlv, next))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_pads_to_eight_byte_boundary() {
        let tlv = Tlv::new(param_type::ESP_INFO, vec![1, 2, 3]);
        let mut out = Vec::new();
        tlv.encode(&mut out);
        assert_eq!(out.len() % TLV_ALIGN, 0);
        assert_eq!(out.len(), 8);
    }

    #[test]
    fn decode_round_trips_through_encode() {
        let tlv = Tlv::new(param_type::DIFFIE_HELLMAN, vec![0xAA; 17]);
        let mut out = Vec::new();
        tlv.encode(&mut out);
        let (decoded, next) = Tlv::decode_at(&out, 0).unwrap();
        assert_eq!(decoded, tlv);
        assert_eq!(next, out.len());
    }

    #[test]
    fn decode_rejects_length_crossing_boundary() {
        let mut out = Vec::new();
        out.extend_from_slice(&1u16.to_be_bytes());
        out.extend_from_slice(&100u16.to_be_bytes());
        out.extend_from_slice(&[0u8; 4]);
        assert!(matches!(
            Tlv::decode_at(&out, 0),
            Err(WireError::TlvCrossesBoundary { .. })
        ));
    }

    #[test]
    fn critical_follows_per_type_table() {
        assert!(Tlv::new(param_type::PUZZLE, vec![]).is_critical());
        assert!(Tlv::new(param_type::ESP_INFO, vec![]).is_critical());
        assert!(!Tlv::new(param_type::HMAC, vec![]).is_critical());
        assert!(!Tlv::new(param_type::SIGNATURE, vec![]).is_critical());
    }
}
