//! Wire codec errors.

use thiserror::Error;

/// Failures from `parse`/`serialize` and the TLV walk.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WireError {
    #[error("packet shorter than the fixed 40-byte header")]
    TruncatedHeader,

    #[error("declared header-length ({declared} * 8 + 8 bytes) does not match packet size ({actual} bytes)")]
    LengthMismatch { declared: u8, actual: usize },

    #[error("TLV at offset {offset} declares a length that crosses the packet boundary")]
    TlvCrossesBoundary { offset: usize },

    #[error("TLV type {got} at offset {offset} is not in ascending order (previous type was {previous})")]
    TlvOutOfOrder {
        offset: usize,
        previous: u16,
        got: u16,
    },

    #[error("TLV at offset {offset} is not 8-byte aligned")]
    AlignmentViolation { offset: usize },

    #[error("unknown critical parameter type {0}")]
    UnknownCriticalParameter(u16),

    #[error("parameter type {0} has the wrong contents length ({1} bytes)")]
    MalformedParameter(u16, usize),

    #[error("parameter type {0} was not present")]
    MissingParameter(u16),

    #[error("unknown HIP packet type {0}")]
    UnknownPacketType(u8),

    #[error("HOST_ID contents past ENCRYPTED did not decode to a valid HOST_ID parameter")]
    InvalidEncryptedHostId,
}
