//! Tracks in-flight anchor (or tree root) rollovers.
//!
//! An anchor update is a two-message handshake riding on UPDATE packets:
//! the sender announces its new anchor (first UPDATE, carrying a sequence
//! number), the receiver acknowledges, and only after the ack does the
//! sender start disclosing tokens from the new chain. At most one update
//! can be pending per (direction, chain index) at a time — a second
//! first-UPDATE for an already-pending chain is a protocol error, while a
//! retransmitted duplicate of the same pending update's sequence number is
//! just a retransmission and is ignored rather than rejected.

use std::collections::HashMap;

use crate::errors::EspProtectionError;

type Digest = [u8; 20];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Inbound,
    Outbound,
}

#[derive(Debug, Clone, Copy)]
struct Pending {
    seq: u32,
    new_anchor: Digest,
}

/// Cache of anchor updates awaiting acknowledgment, keyed by direction and
/// chain index (chain index is always 0 for non-parallel transforms).
#[derive(Default)]
pub struct AnchorUpdateCache {
    pending: HashMap<(Direction, u32), Pending>,
}

impl AnchorUpdateCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new anchor announcement. Returns `Ok(false)` for a
    /// duplicate of the already-pending update (same chain, same seq) and
    /// `Ok(true)` for a freshly registered one. Rejects a second, distinct
    /// announcement for a chain that already has one pending.
    pub fn begin_update(
        &mut self,
        direction: Direction,
        chain_index: u32,
        seq: u32,
        new_anchor: Digest,
    ) -> Result<bool, EspProtectionError> {
        match self.pending.get(&(direction, chain_index)) {
            Some(existing) if existing.seq == seq && existing.new_anchor == new_anchor => Ok(false),
            Some(_) => Err(EspProtectionError::UpdateAlreadyPending),
            None => {
                self.pending.insert((direction, chain_index), Pending { seq, new_anchor });
                Ok(true)
            }
        }
    }

    /// Acknowledge completes the handshake, returning the new anchor to
    /// install as the chain's active anchor.
    pub fn complete_update(&mut self, direction: Direction, chain_index: u32, acked_seq: u32) -> Option<Digest> {
        let pending = self.pending.get(&(direction, chain_index))?;
        if pending.seq != acked_seq {
            return None;
        }
        self.pending.remove(&(direction, chain_index)).map(|p| p.new_anchor)
    }

    pub fn is_pending(&self, direction: Direction, chain_index: u32) -> bool {
        self.pending.contains_key(&(direction, chain_index))
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn begin_then_complete_round_trips() {
        let mut cache = AnchorUpdateCache::new();
        assert!(cache.begin_update(Direction::Outbound, 0, 5, [1; 20]).unwrap());
        assert!(cache.is_pending(Direction::Outbound, 0));
        let anchor = cache.complete_update(Direction::Outbound, 0, 5);
        assert_eq!(anchor, Some([1; 20]));
        assert!(!cache.is_pending(Direction::Outbound, 0));
    }

    #[test]
    fn duplicate_first_update_with_same_seq_is_ignored_not_rejected() {
        let mut cache = AnchorUpdateCache::new();
        cache.begin_update(Direction::Outbound, 0, 5, [1; 20]).unwrap();
        let result = cache.begin_update(Direction::Outbound, 0, 5, [1; 20]);
        assert_eq!(result, Ok(false));
    }

    #[test]
    fn distinct_update_while_one_pending_is_rejected() {
        let mut cache = AnchorUpdateCache::new();
        cache.begin_update(Direction::Outbound, 0, 5, [1; 20]).unwrap();
        let result = cache.begin_update(Direction::Outbound, 0, 6, [2; 20]);
        assert_eq!(result, Err(EspProtectionError::UpdateAlreadyPending));
    }

    #[test]
    fn chains_are_tracked_independently() {
        let mut cache = AnchorUpdateCache::new();
        cache.begin_update(Direction::Outbound, 0, 5, [1; 20]).unwrap();
        assert!(cache.begin_update(Direction::Outbound, 1, 5, [2; 20]).unwrap());
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn complete_with_wrong_seq_does_not_clear_pending() {
        let mut cache = AnchorUpdateCache::new();
        cache.begin_update(Direction::Outbound, 0, 5, [1; 20]).unwrap();
        assert_eq!(cache.complete_update(Direction::Outbound, 0, 4), None);
        assert!(cache.is_pending(Direction::Outbound, 0));
    }
}
