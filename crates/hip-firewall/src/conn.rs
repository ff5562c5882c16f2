//! Per-connection tracked state: a mirror of the control-plane's host
//! association state, kept independently so the firewall process can run
//! without access to the daemon's HADB.

use crate::tuple::{Direction, EspTuple, HipTuple};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnState {
    New,
    I1Seen,
    I2Seen,
    R2Seen,
    Established,
    Closing,
    Closed,
}

pub struct Connection {
    pub hip_tuple: HipTuple,
    pub direction: Direction,
    pub state: ConnState,
    pub esp_tuples: Vec<EspTuple>,
    /// Nonce exchanged during HIP middlebox authentication (RFC 6253-style
    /// registration); only meaningful while a middlebox has inserted itself.
    pub midauth_nonce: Option<u64>,
}

impl Connection {
    pub fn new(hip_tuple: HipTuple, direction: Direction) -> Self {
        Connection { hip_tuple, direction, state: ConnState::New, esp_tuples: Vec::new(), midauth_nonce: None }
    }

    pub fn add_esp_tuple(&mut self, tuple: EspTuple) {
        self.esp_tuples.push(tuple);
    }

    /// Find the ESP tuple for an incoming packet. An anchor match always
    /// wins over a bare SPI match, since the SPI space is only unique
    /// within one peer and a NAT'd deployment can see collisions.
    pub fn match_esp_tuple(&self, spi: u32, disclosed_anchor: Option<&[u8; 20]>) -> Option<&EspTuple> {
        if let Some(anchor) = disclosed_anchor {
            if let Some(tuple) = self.esp_tuples.iter().find(|t| t.active_anchor.as_ref() == Some(anchor)) {
                return Some(tuple);
            }
        }
        self.esp_tuples.iter().find(|t| t.spi == spi)
    }

    pub fn match_esp_tuple_mut(&mut self, spi: u32) -> Option<&mut EspTuple> {
        self.esp_tuples.iter_mut().find(|t| t.spi == spi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hip_types::Hit;

    fn sample_tuple() -> HipTuple {
        HipTuple {
            local_hit: Hit::from_bytes([1; 16]),
            peer_hit: Hit::from_bytes([2; 16]),
            local_addr: "10.0.0.1".parse().unwrap(),
            peer_addr: "10.0.0.2".parse().unwrap(),
        }
    }

    #[test]
    fn new_connection_has_no_esp_tuples() {
        let conn = Connection::new(sample_tuple(), Direction::Original);
        assert_eq!(conn.state, ConnState::New);
        assert!(conn.esp_tuples.is_empty());
    }

    #[test]
    fn anchor_match_wins_over_spi_collision() {
        let mut conn = Connection::new(sample_tuple(), Direction::Original);
        let mut t1 = EspTuple::new(100, "10.0.0.1".parse().unwrap(), "10.0.0.2".parse().unwrap());
        t1.active_anchor = Some([1; 20]);
        let mut t2 = EspTuple::new(100, "10.0.0.1".parse().unwrap(), "10.0.0.3".parse().unwrap());
        t2.active_anchor = Some([2; 20]);
        conn.add_esp_tuple(t1);
        conn.add_esp_tuple(t2);
        let matched = conn.match_esp_tuple(100, Some(&[2; 20])).unwrap();
        assert_eq!(matched.peer_addr, "10.0.0.3".parse::<std::net::IpAddr>().unwrap());
    }

    #[test]
    fn falls_back_to_spi_when_no_anchor_known() {
        let mut conn = Connection::new(sample_tuple(), Direction::Original);
        conn.add_esp_tuple(EspTuple::new(200, "10.0.0.1".parse().unwrap(), "10.0.0.2".parse().unwrap()));
        assert!(conn.match_esp_tuple(200, None).is_some());
    }
}
