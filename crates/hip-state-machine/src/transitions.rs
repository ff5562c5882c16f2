//! The canonical (packet type, current state) -> next state table for the
//! base exchange and its teardown, shared by both the initiator and
//! responder roles (a given host association only ever sees the subset of
//! packet types appropriate to the role it's playing).

use hip_types::HipState;

use hip_wire::PacketType;

/// Look up the next state for an accepted packet. Returns `None` when the
/// (packet type, state) pair isn't a valid transition at all — the caller
/// should treat this as a protocol error rather than a silent no-op,
/// unlike a handler-level retransmission which is handled upstream of
/// this table.
pub fn next_state(current: HipState, packet_type: PacketType) -> Option<HipState> {
    use HipState::*;
    use PacketType::*;
    match (current, packet_type) {
        (Unassociated, I1) => Some(I1Sent),
        // The responder that accepts an I2 and sends R2 lands in R2_SENT;
        // I2_SENT is the initiator's state after sending its own I2.
        (Unassociated, I2) => Some(R2Sent),

        (I1Sent, R1) => Some(I2Sent),
        // A retransmitted I1 while still waiting on R1 doesn't move state.
        (I1Sent, I1) => Some(I1Sent),

        (I2Sent, R2) => Some(R2Sent),
        // The responder's I2 retransmission timer may still be running;
        // an R1 arriving again just restarts it without changing state.
        (I2Sent, R1) => Some(I2Sent),

        (R2Sent, Update) => Some(Established),
        (R2Sent, Notify) => Some(R2Sent),

        (Established, Update) => Some(Established),
        (Established, Notify) => Some(Established),

        (I1Sent | I2Sent | R2Sent | Established, Close) => Some(Closing),
        (Closing, CloseAck) => Some(Closed),
        // A Close crossing in flight with our own Close: stay in Closing
        // until the local CloseAck timer fires.
        (Closing, Close) => Some(Closing),

        (Closed, I1) => Some(I1Sent),

        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initiator_happy_path() {
        assert_eq!(next_state(HipState::Unassociated, PacketType::I1), Some(HipState::I1Sent));
        assert_eq!(next_state(HipState::I1Sent, PacketType::R1), Some(HipState::I2Sent));
        assert_eq!(next_state(HipState::I2Sent, PacketType::R2), Some(HipState::R2Sent));
    }

    #[test]
    fn responder_happy_path() {
        assert_eq!(next_state(HipState::Unassociated, PacketType::I2), Some(HipState::R2Sent));
    }

    #[test]
    fn teardown_sequence() {
        assert_eq!(next_state(HipState::Established, PacketType::Close), Some(HipState::Closing));
        assert_eq!(next_state(HipState::Closing, PacketType::CloseAck), Some(HipState::Closed));
    }

    #[test]
    fn reopening_from_closed_restarts_exchange() {
        assert_eq!(next_state(HipState::Closed, PacketType::I1), Some(HipState::I1Sent));
    }

    #[test]
    fn invalid_transition_is_none() {
        assert_eq!(next_state(HipState::Unassociated, PacketType::R2), None);
        assert_eq!(next_state(HipState::Established, PacketType::R1), None);
    }

    #[test]
    fn update_in_established_state_is_idempotent() {
        assert_eq!(next_state(HipState::Established, PacketType::Update), Some(HipState::Established));
    }
}
