//! HIP control-packet wire codec: the fixed 40-byte header, TLV
//! parsing/serialization, checksums, and canonical HOST_ID encoding
//!.

pub mod checksum;
pub mod errors;
pub mod header;
pub mod hostid;
pub mod message;
pub mod params;
pub mod parse;
pub mod serialize;
pub mod tlv;

pub use errors::WireError;
pub use header::{controls, HipHeader, PacketType, HEADER_LEN};
pub use hostid::host_id_to_hit;
pub use message::Message;
pub use parse::parse;
pub use serialize::{build_pseudo_for_hmac2, serialize};
pub use tlv::{param_type, Tlv};
