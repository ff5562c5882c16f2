use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum EspProtectionError {
    #[error("packet sequence {seq} is outside the verification window (last seen {last_seen}, window {window})")]
    OutOfWindow { seq: u32, last_seen: u32, window: u32 },

    #[error("disclosed token does not hash forward to the last verified anchor")]
    TokenMismatch,

    #[error("tree branch does not reduce to the current root")]
    BranchMismatch,

    #[error("chain index {0} is not configured for this transform")]
    UnknownChainIndex(u32),

    #[error("an anchor update is already pending for this chain in this direction")]
    UpdateAlreadyPending,

    #[error("transform UNUSED does not authenticate packets")]
    TransformUnused,
}
