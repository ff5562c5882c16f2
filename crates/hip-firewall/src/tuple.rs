//! The tuples a connection is tracked by: one HIP control-plane tuple, and
//! zero or more ESP data-plane tuples once SAs are installed.

use std::net::IpAddr;

use hip_types::Hit;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// The side that sent the I1 that created this connection.
    Original,
    Reply,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HipTuple {
    pub local_hit: Hit,
    pub peer_hit: Hit,
    pub local_addr: IpAddr,
    pub peer_addr: IpAddr,
}

impl HipTuple {
    /// The tuple as seen from the other side of the exchange.
    pub fn reversed(&self) -> HipTuple {
        HipTuple {
            local_hit: self.peer_hit,
            peer_hit: self.local_hit,
            local_addr: self.peer_addr,
            peer_addr: self.local_addr,
        }
    }
}

/// One ESP SA bound to a connection. Matched against incoming ESP traffic
/// primarily by its disclosed anchor, once one has been seen — a NAT'd or
/// re-keyed SPI can't be trusted alone to identify the right connection.
#[derive(Debug, Clone)]
pub struct EspTuple {
    pub spi: u32,
    pub local_addr: IpAddr,
    pub peer_addr: IpAddr,
    pub active_anchor: Option<[u8; 20]>,
}

impl EspTuple {
    pub fn new(spi: u32, local_addr: IpAddr, peer_addr: IpAddr) -> Self {
        EspTuple { spi, local_addr, peer_addr, active_anchor: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reversed_swaps_local_and_peer() {
        let tuple = HipTuple {
            local_hit: Hit::from_bytes([1; 16]),
            peer_hit: Hit::from_bytes([2; 16]),
            local_addr: "10.0.0.1".parse().unwrap(),
            peer_addr: "10.0.0.2".parse().unwrap(),
        };
        let rev = tuple.reversed();
        assert_eq!(rev.local_hit, tuple.peer_hit);
        assert_eq!(rev.peer_addr, tuple.local_addr);
    }
}
