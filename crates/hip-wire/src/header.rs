//! The 40-byte fixed HIP header.

use hip_types::Hit;

use crate::errors::WireError;

pub const HEADER_LEN: usize = 40;

/// HIP packet types, from the IANA HIP parameters registry. Only the
/// control-plane types the core handles are modeled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketType {
    I1,
    R1,
    I2,
    R2,
    Update,
    Notify,
    Close,
    CloseAck,
}

impl PacketType {
    pub fn as_u8(self) -> u8 {
        match self {
            PacketType::I1 => 1,
            PacketType::R1 => 2,
            PacketType::I2 => 3,
            PacketType::R2 => 4,
            PacketType::Notify => 17,
            PacketType::Close => 18,
            PacketType::CloseAck => 19,
            PacketType::Update => 16,
        }
    }

    pub fn from_u8(v: u8) -> Result<Self, WireError> {
        Ok(match v {
            1 => PacketType::I1,
            2 => PacketType::R1,
            3 => PacketType::I2,
            4 => PacketType::R2,
            16 => PacketType::Update,
            17 => PacketType::Notify,
            18 => PacketType::Close,
            19 => PacketType::CloseAck,
            other => return Err(WireError::UnknownPacketType(other)),
        })
    }
}

/// Control bitfield flags.
pub mod controls {
    pub const ANYTIME: u16 = 0x0001;
    pub const HIT_ANON: u16 = 0x0002;
}

/// The fixed 40-byte header preceding the TLV stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HipHeader {
    pub next_header: u8,
    /// Total packet length in 8-byte units, minus 1 (excludes the first 8
    /// bytes of the fixed header, per RFC 5201 framing).
    pub header_length: u8,
    pub packet_type: PacketType,
    pub version: u8,
    pub checksum: u16,
    pub controls: u16,
    pub sender_hit: Hit,
    pub receiver_hit: Hit,
}

impl HipHeader {
    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let mut buf = [0u8; HEADER_LEN];
        buf[0] = self.next_header;
        buf[1] = self.header_length;
        buf[2] = self.packet_type.as_u8() & 0x7F;
        buf[3] = (self.version & 0x0F) << 4;
        buf[4..6].copy_from_slice(&self.checksum.to_be_bytes());
        buf[6..8].copy_from_slice(&self.controls.to_be_bytes());
        buf[8..24].copy_from_slice(self.sender_hit.as_bytes());
        buf[24..40].copy_from_slice(self.receiver_hit.as_bytes());
        buf
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, WireError> {
        if bytes.len() < HEADER_LEN {
            return Err(WireError::TruncatedHeader);
        }
        let mut sender = [0u8; 16];
        let mut receiver = [0u8; 16];
        sender.copy_from_slice(&bytes[8..24]);
        receiver.copy_from_slice(&bytes[24..40]);
        Ok(HipHeader {
            next_header: bytes[0],
            header_length: bytes[1],
            packet_type: PacketType::from_u8(bytes[2] & 0x7F)?,
            version: (bytes[3] >> 4) & 0x0F,
            checksum: u16::from_be_bytes([bytes[4], bytes[5]]),
            controls: u16::from_be_bytes([bytes[6], bytes[7]]),
            sender_hit: Hit::from_bytes(sender),
            receiver_hit: Hit::from_bytes(receiver),
        })
    }

    /// Total on-wire packet length implied by `header_length`.
    pub fn total_len(&self) -> usize {
        (self.header_length as usize + 1) * 8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_round_trips() {
        let header = HipHeader {
            next_header: 0,
            header_length: 4,
            packet_type: PacketType::I1,
            version: 1,
            checksum: 0xBEEF,
            controls: controls::HIT_ANON,
            sender_hit: Hit::from_bytes([0x11; 16]),
            receiver_hit: Hit::from_bytes([0x22; 16]),
        };
        let bytes = header.to_bytes();
        let decoded = HipHeader::from_bytes(&bytes).unwrap();
        assert_eq!(header, decoded);
    }

    #[test]
    fn truncated_header_is_rejected() {
        assert!(matches!(
            HipHeader::from_bytes(&[0u8; 10]),
            Err(WireError::TruncatedHeader)
        ));
    }

    #[test]
    fn packet_type_roundtrips() {
        for t in [
            PacketType::I1,
            PacketType::R1,
            PacketType::I2,
            PacketType::R2,
            PacketType::Update,
            PacketType::Notify,
            PacketType::Close,
            PacketType::CloseAck,
        ] {
            assert_eq!(PacketType::from_u8(t.as_u8()).unwrap(), t);
        }
    }
}
