//! The SA manager: the daemon's table of installed ESP security
//! associations, indexed for inbound lookup by SPI and for outbound
//! lookup by peer HIT.

use std::collections::HashMap;

use hip_types::Hit;

use crate::errors::SaError;
use crate::sa::{Direction, SaEntry};

#[derive(Default)]
pub struct SaManager {
    inbound: HashMap<u32, SaEntry>,
    outbound: HashMap<Hit, SaEntry>,
}

impl SaManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_sa(&mut self, sa: SaEntry) -> Result<(), SaError> {
        match sa.direction {
            Direction::Inbound => {
                if self.inbound.contains_key(&sa.spi) {
                    return Err(SaError::DuplicateSpi(sa.spi));
                }
                self.inbound.insert(sa.spi, sa);
            }
            Direction::Outbound => {
                self.outbound.insert(sa.peer_hit, sa);
            }
        }
        Ok(())
    }

    /// Remove both directions of the SA pair associated with `peer_hit`,
    /// and the inbound SA at `inbound_spi` if given separately (inbound and
    /// outbound SPIs are independently assigned by each end).
    pub fn delete_sa(&mut self, peer_hit: Hit, inbound_spi: Option<u32>) {
        self.outbound.remove(&peer_hit);
        if let Some(spi) = inbound_spi {
            self.inbound.remove(&spi);
        }
    }

    pub fn find_inbound(&self, spi: u32) -> Option<&SaEntry> {
        self.inbound.get(&spi)
    }

    pub fn find_inbound_mut(&mut self, spi: u32) -> Option<&mut SaEntry> {
        self.inbound.get_mut(&spi)
    }

    pub fn find_outbound(&self, peer_hit: Hit) -> Option<&SaEntry> {
        self.outbound.get(&peer_hit)
    }

    pub fn find_outbound_mut(&mut self, peer_hit: Hit) -> Option<&mut SaEntry> {
        self.outbound.get_mut(&peer_hit)
    }

    /// Remove every SA associated with a peer, in either direction.
    /// Distinct from `delete_sa` in that it doesn't require the caller to
    /// already know the inbound SPI.
    pub fn flush(&mut self, peer_hit: Hit) {
        self.outbound.remove(&peer_hit);
        self.inbound.retain(|_, sa| sa.peer_hit != peer_hit);
    }

    pub fn inbound_count(&self) -> usize {
        self.inbound.len()
    }

    pub fn outbound_count(&self) -> usize {
        self.outbound.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hip_crypto::symmetric::SymmetricTransform;
    use std::net::{IpAddr, Ipv4Addr};

    fn sample_sa(spi: u32, direction: Direction, peer: Hit) -> SaEntry {
        SaEntry::new(
            spi,
            direction,
            SymmetricTransform::Null,
            vec![],
            vec![0u8; 20],
            Hit::from_bytes([1; 16]),
            peer,
            IpAddr::V4(Ipv4Addr::LOCALHOST),
            IpAddr::V4(Ipv4Addr::LOCALHOST),
        )
    }

    #[test]
    fn add_and_find_inbound() {
        let mut mgr = SaManager::new();
        mgr.add_sa(sample_sa(100, Direction::Inbound, Hit::from_bytes([2; 16]))).unwrap();
        assert!(mgr.find_inbound(100).is_some());
    }

    #[test]
    fn duplicate_inbound_spi_is_rejected() {
        let mut mgr = SaManager::new();
        mgr.add_sa(sample_sa(100, Direction::Inbound, Hit::from_bytes([2; 16]))).unwrap();
        let err = mgr.add_sa(sample_sa(100, Direction::Inbound, Hit::from_bytes([3; 16]))).unwrap_err();
        assert_eq!(err, SaError::DuplicateSpi(100));
    }

    #[test]
    fn find_outbound_by_peer_hit() {
        let mut mgr = SaManager::new();
        let peer = Hit::from_bytes([9; 16]);
        mgr.add_sa(sample_sa(200, Direction::Outbound, peer)).unwrap();
        assert!(mgr.find_outbound(peer).is_some());
    }

    #[test]
    fn flush_removes_both_directions_for_peer() {
        let mut mgr = SaManager::new();
        let peer = Hit::from_bytes([9; 16]);
        mgr.add_sa(sample_sa(200, Direction::Outbound, peer)).unwrap();
        mgr.add_sa(sample_sa(201, Direction::Inbound, peer)).unwrap();
        mgr.flush(peer);
        assert_eq!(mgr.inbound_count(), 0);
        assert_eq!(mgr.outbound_count(), 0);
    }
}
