//! `parse`: bytes → Message, validating total length, TLV ordering, and
//! alignment.

use crate::errors::WireError;
use crate::header::{HipHeader, HEADER_LEN};
use crate::message::Message;
use crate::tlv::{Tlv, TLV_ALIGN};

pub fn parse(bytes: &[u8]) -> Result<Message, WireError> {
    let header = HipHeader::from_bytes(bytes)?;
    let total_len = header.total_len();
    if total_len != bytes.len() {
        return Err(WireError::LengthMismatch {
            declared: header.header_length,
            actual: bytes.len(),
        });
    }

    let mut message = Message::new(header);
    let mut offset = HEADER_LEN;
    let mut previous_type: Option<u16> = None;

    while offset < bytes.len() {
        if offset % TLV_ALIGN != 0 {
            return Err(WireError::AlignmentViolation { offset });
        }
        let (tlv, next) = Tlv::decode_at(bytes, offset)?;

        if let Some(prev) = previous_type {
            // Equal types are allowed (repeated NOTIFICATION parameters);
            // only a strict decrease violates ascending order.
            if tlv.param_type < prev {
                return Err(WireError::TlvOutOfOrder {
                    offset,
                    previous: prev,
                    got: tlv.param_type,
                });
            }
        }
        previous_type = Some(tlv.param_type);

        if tlv.is_critical() && !crate::tlv::param_type::is_known(tlv.param_type) {
            return Err(WireError::UnknownCriticalParameter(tlv.param_type));
        }

        message.push(tlv);
        offset = next;
    }

    Ok(message)
}
