//! The control-plane error taxonomy and what each kind does to the packet
//! being processed and the association it belongs to.

use thiserror::Error;

use crate::outcome::Phase;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ControlPlaneError {
    #[error("packet is structurally malformed")]
    Malformed,
    #[error("signature or HMAC verification failed")]
    AuthFailed,
    #[error("packet carries an unsupported critical parameter")]
    UnsupportedCritical,
    #[error("peer attempted a protocol downgrade")]
    Downgrade,
    #[error("sequence number outside the replay window")]
    ReplayWindow,
    #[error("a required resource (memory, HADB slot, SA) is exhausted")]
    ResourceExhausted,
    #[error("a transient condition prevented processing; retry later")]
    Transient,
    #[error("an unrecoverable local error occurred")]
    Fatal,
}

/// What happens to the current packet and to the association it belongs
/// to once a [`ControlPlaneError`] is raised in a given [`Phase`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    /// Drop the packet silently; the association, if any, is untouched.
    DropPacket,
    /// Drop the packet and send a NOTIFY back to the peer.
    DropAndNotify,
    /// Terminate the association (move it to FAILED) and drop the packet.
    TerminateAssociation,
    /// Leave the packet queued for a later retry instead of dropping it.
    RetryLater,
}

/// The propagation policy for an error kind. Independent of which phase
/// raised it: a `Malformed` packet is dropped whether the parser caught it
/// in the check phase or a later handler discovered an inconsistency
/// while applying it.
pub fn policy_for(kind: ControlPlaneError) -> Policy {
    match kind {
        ControlPlaneError::Malformed => Policy::DropPacket,
        ControlPlaneError::AuthFailed => Policy::DropPacket,
        ControlPlaneError::UnsupportedCritical => Policy::DropAndNotify,
        ControlPlaneError::Downgrade => Policy::DropAndNotify,
        ControlPlaneError::ReplayWindow => Policy::DropPacket,
        ControlPlaneError::ResourceExhausted => Policy::RetryLater,
        ControlPlaneError::Transient => Policy::RetryLater,
        ControlPlaneError::Fatal => Policy::TerminateAssociation,
    }
}

/// An error kind paired with the phase it was raised in, for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RaisedError {
    pub kind: ControlPlaneError,
    pub phase: Phase,
}

impl RaisedError {
    pub fn policy(&self) -> Policy {
        policy_for(self.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_packets_are_dropped_silently() {
        assert_eq!(policy_for(ControlPlaneError::Malformed), Policy::DropPacket);
    }

    #[test]
    fn unsupported_critical_notifies_the_peer() {
        assert_eq!(policy_for(ControlPlaneError::UnsupportedCritical), Policy::DropAndNotify);
    }

    #[test]
    fn resource_exhaustion_is_retried_not_dropped() {
        assert_eq!(policy_for(ControlPlaneError::ResourceExhausted), Policy::RetryLater);
    }

    #[test]
    fn fatal_errors_terminate_the_association() {
        assert_eq!(policy_for(ControlPlaneError::Fatal), Policy::TerminateAssociation);
    }

    #[test]
    fn policy_depends_only_on_kind_not_phase() {
        let in_check = RaisedError { kind: ControlPlaneError::Malformed, phase: Phase::Check };
        let in_handle = RaisedError { kind: ControlPlaneError::Malformed, phase: Phase::Handle };
        assert_eq!(in_check.policy(), in_handle.policy());
    }
}
