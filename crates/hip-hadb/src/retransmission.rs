//! Fixed-capacity retransmission slots for an in-progress exchange.

use std::time::{Duration, Instant};

use crate::ha::RetransmitSlot;

/// Number of outstanding packets a single host association tracks for
/// retransmission at once — one base-exchange packet plus a small amount of
/// headroom for an overlapping UPDATE.
pub const RETRANSMIT_CAPACITY: usize = 4;

const INITIAL_BACKOFF: Duration = Duration::from_millis(500);
const MAX_ATTEMPTS: u32 = 5;

/// A small fixed-capacity ring of retransmission slots. Never grows past
/// [`RETRANSMIT_CAPACITY`]; inserting past capacity evicts the oldest slot.
#[derive(Debug, Clone, Default)]
pub struct RetransmissionRing {
    slots: Vec<RetransmitSlot>,
}

impl RetransmissionRing {
    pub fn new() -> Self {
        Self { slots: Vec::with_capacity(RETRANSMIT_CAPACITY) }
    }

    /// Arm retransmission for a freshly sent packet, replacing any existing
    /// slot for the same packet type (a retransmitted I2 replaces the one
    /// still pending, it doesn't stack).
    pub fn arm(&mut self, packet_type: hip_wire::PacketType, bytes: Vec<u8>, now: Instant) {
        self.slots.retain(|slot| slot.packet_type != packet_type);
        if self.slots.len() >= RETRANSMIT_CAPACITY {
            self.slots.remove(0);
        }
        self.slots.push(RetransmitSlot {
            packet_type,
            bytes,
            attempts: 0,
            next_deadline: now + INITIAL_BACKOFF,
        });
    }

    /// Clear the slot for a packet type once its response has arrived.
    pub fn disarm(&mut self, packet_type: hip_wire::PacketType) {
        self.slots.retain(|slot| slot.packet_type != packet_type);
    }

    /// Slots whose deadline has passed, with exponential backoff applied
    /// and attempts incremented. Slots that have exhausted their attempt
    /// budget are dropped and returned separately as given-up packet types.
    pub fn due(&mut self, now: Instant) -> (Vec<RetransmitSlot>, Vec<hip_wire::PacketType>) {
        let mut fired = Vec::new();
        let mut given_up = Vec::new();
        let mut i = 0;
        while i < self.slots.len() {
            if self.slots[i].next_deadline <= now {
                let mut slot = self.slots.remove(i);
                slot.attempts += 1;
                if slot.attempts >= MAX_ATTEMPTS {
                    given_up.push(slot.packet_type);
                    continue;
                }
                slot.next_deadline = now + INITIAL_BACKOFF * 2u32.pow(slot.attempts.min(5));
                fired.push(slot.clone());
                self.slots.push(slot);
            } else {
                i += 1;
            }
        }
        (fired, given_up)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hip_wire::PacketType;

    #[test]
    fn arming_same_type_replaces_previous_slot() {
        let mut ring = RetransmissionRing::new();
        let now = Instant::now();
        ring.arm(PacketType::I2, vec![1], now);
        ring.arm(PacketType::I2, vec![2], now);
        assert_eq!(ring.len(), 1);
    }

    #[test]
    fn disarm_removes_the_matching_slot() {
        let mut ring = RetransmissionRing::new();
        let now = Instant::now();
        ring.arm(PacketType::I2, vec![1], now);
        ring.disarm(PacketType::I2);
        assert!(ring.is_empty());
    }

    #[test]
    fn capacity_evicts_oldest_slot() {
        let mut ring = RetransmissionRing::new();
        let now = Instant::now();
        ring.arm(PacketType::I1, vec![], now);
        ring.arm(PacketType::I2, vec![], now);
        ring.arm(PacketType::Update, vec![], now);
        ring.arm(PacketType::Close, vec![], now);
        ring.arm(PacketType::CloseAck, vec![], now);
        assert_eq!(ring.len(), RETRANSMIT_CAPACITY);
    }

    #[test]
    fn due_slots_fire_once_past_deadline_and_back_off() {
        let mut ring = RetransmissionRing::new();
        let now = Instant::now();
        ring.arm(PacketType::I2, vec![9], now);
        let (fired, given_up) = ring.due(now);
        assert!(fired.is_empty());
        assert!(given_up.is_empty());

        let later = now + INITIAL_BACKOFF + Duration::from_millis(1);
        let (fired, given_up) = ring.due(later);
        assert_eq!(fired.len(), 1);
        assert!(given_up.is_empty());
        assert_eq!(fired[0].attempts, 1);
    }

    #[test]
    fn slot_gives_up_after_max_attempts() {
        let mut ring = RetransmissionRing::new();
        let mut now = Instant::now();
        ring.arm(PacketType::I2, vec![9], now);
        let mut given_up_types = Vec::new();
        for _ in 0..MAX_ATTEMPTS {
            now += Duration::from_secs(3600);
            let (_, given_up) = ring.due(now);
            given_up_types.extend(given_up);
        }
        assert_eq!(given_up_types, vec![PacketType::I2]);
        assert!(ring.is_empty());
    }
}
