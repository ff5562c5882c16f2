//! Drives [`ConnState`] transitions from observed HIP packet types, and
//! indexes connections by their HIP tuple (either direction resolves to
//! the same entry).

use std::collections::HashMap;

use hip_wire::PacketType;

use crate::conn::{ConnState, Connection};
use crate::tuple::{Direction, HipTuple};

#[derive(Default)]
pub struct ConnectionTracker {
    connections: HashMap<HipTuple, Connection>,
}

impl ConnectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Find the tracked connection for either orientation of a tuple.
    pub fn find(&self, tuple: &HipTuple) -> Option<&Connection> {
        self.connections.get(tuple).or_else(|| self.connections.get(&tuple.reversed()))
    }

    fn find_key(&self, tuple: &HipTuple) -> Option<HipTuple> {
        if self.connections.contains_key(tuple) {
            Some(*tuple)
        } else if self.connections.contains_key(&tuple.reversed()) {
            Some(tuple.reversed())
        } else {
            None
        }
    }

    /// Feed one observed control-plane packet into the tracker, creating a
    /// new connection on I1 if none exists yet. Returns the resulting
    /// state, or `None` if the packet type doesn't apply to an untracked
    /// tuple (e.g. an R2 with no matching I1 ever seen).
    pub fn observe(&mut self, tuple: HipTuple, packet_type: PacketType) -> Option<ConnState> {
        let key = self.find_key(&tuple);
        match (key, packet_type) {
            (None, PacketType::I1) => {
                let mut conn = Connection::new(tuple, Direction::Original);
                conn.state = ConnState::I1Seen;
                self.connections.insert(tuple, conn);
                Some(ConnState::I1Seen)
            }
            (None, _) => None,
            (Some(key), pt) => {
                let conn = self.connections.get_mut(&key)?;
                conn.state = next_state(conn.state, pt);
                Some(conn.state)
            }
        }
    }

    pub fn get_mut(&mut self, tuple: &HipTuple) -> Option<&mut Connection> {
        let key = self.find_key(tuple)?;
        self.connections.get_mut(&key)
    }

    pub fn remove(&mut self, tuple: &HipTuple) -> Option<Connection> {
        let key = self.find_key(tuple)?;
        self.connections.remove(&key)
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}

fn next_state(current: ConnState, packet_type: PacketType) -> ConnState {
    use ConnState::*;
    use PacketType::*;
    match (current, packet_type) {
        (New, I1) => I1Seen,
        (I1Seen, I2) => I2Seen,
        (I2Seen, R2) => R2Seen,
        (R2Seen, _) | (Established, Update) => Established,
        (_, Close) => Closing,
        (Closing, CloseAck) => Closed,
        // Any other packet for a connection not yet in a state where it
        // makes sense is ignored rather than forced into a new state;
        // retransmissions of the packet that produced the current state
        // are the common case.
        (state, _) => state,
    }
}
