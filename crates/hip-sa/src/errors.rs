use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SaError {
    #[error("no security association for SPI {0:#x}")]
    UnknownSpi(u32),

    #[error("no outbound security association for peer")]
    NoOutboundSa,

    #[error("sequence number {seq} is a replay (window floor {floor})")]
    Replay { seq: u32, floor: u32 },

    #[error("authentication check failed")]
    AuthenticationFailed,

    #[error("decryption failed")]
    DecryptionFailed,

    #[error("packet shorter than the minimum ESP header plus ICV")]
    Truncated,

    #[error("malformed ESP trailer (pad length exceeds payload)")]
    MalformedTrailer,

    #[error("a security association with SPI {0:#x} is already installed")]
    DuplicateSpi(u32),
}
