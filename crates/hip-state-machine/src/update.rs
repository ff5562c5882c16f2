//! Classifies an incoming UPDATE packet by which of SEQ, ACK, and ESP_INFO
//! it carries. RFC 7402-style mobility/multihoming isn't implemented, but
//! the three-way UPDATE handshake used for rekey and anchor rotation is.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateTlvPresence {
    pub seq: Option<u32>,
    pub ack: Option<u32>,
    pub has_esp_info: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateKind {
    /// SEQ only: the first message of an UPDATE exchange, announcing new
    /// state (new ESP_INFO for a rekey, or an anchor for ESP-protection).
    First { seq: u32, carries_esp_info: bool },
    /// SEQ + ACK: the second message, acknowledging the peer's first
    /// UPDATE while also announcing the sender's own.
    SecondAndFirst { seq: u32, ack: u32, carries_esp_info: bool },
    /// ACK only: the third message, completing a handshake the sender
    /// itself did not initiate.
    Third { ack: u32 },
    /// Neither SEQ nor ACK: not a valid UPDATE.
    Invalid,
}

pub fn classify(presence: UpdateTlvPresence) -> UpdateKind {
    match (presence.seq, presence.ack) {
        (Some(seq), None) => UpdateKind::First { seq, carries_esp_info: presence.has_esp_info },
        (Some(seq), Some(ack)) => {
            UpdateKind::SecondAndFirst { seq, ack, carries_esp_info: presence.has_esp_info }
        }
        (None, Some(ack)) => UpdateKind::Third { ack },
        (None, None) => UpdateKind::Invalid,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seq_only_is_first_message() {
        let kind = classify(UpdateTlvPresence { seq: Some(1), ack: None, has_esp_info: true });
        assert_eq!(kind, UpdateKind::First { seq: 1, carries_esp_info: true });
    }

    #[test]
    fn seq_and_ack_is_second_and_first() {
        let kind = classify(UpdateTlvPresence { seq: Some(2), ack: Some(1), has_esp_info: false });
        assert_eq!(kind, UpdateKind::SecondAndFirst { seq: 2, ack: 1, carries_esp_info: false });
    }

    #[test]
    fn ack_only_is_third_message() {
        let kind = classify(UpdateTlvPresence { seq: None, ack: Some(2), has_esp_info: false });
        assert_eq!(kind, UpdateKind::Third { ack: 2 });
    }

    #[test]
    fn neither_tlv_is_invalid() {
        let kind = classify(UpdateTlvPresence { seq: None, ack: None, has_esp_info: false });
        assert_eq!(kind, UpdateKind::Invalid);
    }
}
