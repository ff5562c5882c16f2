//! Host association database: the daemon's table of per-peer protocol
//! state, keyed by (local HIT, peer HIT).

mod errors;
mod ha;
mod retransmission;

pub use errors::HadbError;
pub use ha::{
    DerivedKeys, EspProtectionState, HeartbeatStats, HostAssociation, PendingPuzzle,
    RetransmitSlot, SpiSet,
};
pub use retransmission::{RetransmissionRing, RETRANSMIT_CAPACITY};

use std::collections::HashMap;

use hip_types::{Hit, Lsi};

/// Key identifying one host association: the pair of HITs it was created
/// for. At most one association exists per pair at any time.
pub type HaKey = (Hit, Hit);

/// The daemon's table of host associations.
///
/// Invariants upheld by every method below:
/// - at most one [`HostAssociation`] per `(local_hit, peer_hit)` pair;
/// - an LSI, once assigned to an association, is unique across the table;
/// - iteration via [`Hadb::for_each`] tolerates the callback deleting the
///   entry it was just given, but not concurrent mutation from elsewhere.
#[derive(Default)]
pub struct Hadb {
    associations: HashMap<HaKey, HostAssociation>,
    order: Vec<HaKey>,
    lsi_index: HashMap<Lsi, HaKey>,
}

impl Hadb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create and insert a fresh, unassociated host association for the
    /// given HIT pair.
    pub fn create(&mut self, local_hit: Hit, peer_hit: Hit) -> Result<&mut HostAssociation, HadbError> {
        let key = (local_hit, peer_hit);
        if self.associations.contains_key(&key) {
            return Err(HadbError::AlreadyExists { local: local_hit, peer: peer_hit });
        }
        self.associations.insert(key, HostAssociation::new(local_hit, peer_hit));
        self.order.push(key);
        Ok(self.associations.get_mut(&key).expect("just inserted"))
    }

    /// Insert an already-constructed association, replacing key tracking.
    /// Used when reconstituting state (e.g. from a persisted checkpoint).
    pub fn insert(&mut self, ha: HostAssociation) -> Result<(), HadbError> {
        let key = (ha.local_hit, ha.peer_hit);
        if self.associations.contains_key(&key) {
            return Err(HadbError::AlreadyExists { local: ha.local_hit, peer: ha.peer_hit });
        }
        if let Some(lsi) = ha.local_lsi {
            self.lsi_index.insert(lsi, key);
        }
        if let Some(lsi) = ha.peer_lsi {
            self.lsi_index.insert(lsi, key);
        }
        self.order.push(key);
        self.associations.insert(key, ha);
        Ok(())
    }

    pub fn find_by_hits(&self, local_hit: Hit, peer_hit: Hit) -> Option<&HostAssociation> {
        self.associations.get(&(local_hit, peer_hit))
    }

    pub fn find_by_hits_mut(&mut self, local_hit: Hit, peer_hit: Hit) -> Option<&mut HostAssociation> {
        self.associations.get_mut(&(local_hit, peer_hit))
    }

    /// Find the (first, in insertion order) association for a given peer
    /// HIT regardless of which local identity it was opened against.
    pub fn find_by_peer_hit(&self, peer_hit: Hit) -> Option<&HostAssociation> {
        self.order
            .iter()
            .filter(|key| key.1 == peer_hit)
            .find_map(|key| self.associations.get(key))
    }

    pub fn find_by_lsis(&self, local_lsi: Lsi, peer_lsi: Lsi) -> Option<&HostAssociation> {
        let key = self.lsi_index.get(&local_lsi)?;
        let ha = self.associations.get(key)?;
        if ha.peer_lsi == Some(peer_lsi) {
            Some(ha)
        } else {
            None
        }
    }

    /// Assign LSIs to an existing association, indexing them for
    /// [`Hadb::find_by_lsis`]. Returns `false` if either LSI is already
    /// claimed by a different association.
    pub fn assign_lsis(&mut self, local_hit: Hit, peer_hit: Hit, local_lsi: Lsi, peer_lsi: Lsi) -> bool {
        let key = (local_hit, peer_hit);
        if self.lsi_index.get(&local_lsi).is_some_and(|owner| *owner != key)
            || self.lsi_index.get(&peer_lsi).is_some_and(|owner| *owner != key)
        {
            return false;
        }
        if let Some(ha) = self.associations.get_mut(&key) {
            ha.local_lsi = Some(local_lsi);
            ha.peer_lsi = Some(peer_lsi);
            self.lsi_index.insert(local_lsi, key);
            self.lsi_index.insert(peer_lsi, key);
            true
        } else {
            false
        }
    }

    pub fn delete(&mut self, local_hit: Hit, peer_hit: Hit) -> Option<HostAssociation> {
        let key = (local_hit, peer_hit);
        let removed = self.associations.remove(&key)?;
        self.order.retain(|k| *k != key);
        if let Some(lsi) = removed.local_lsi {
            self.lsi_index.remove(&lsi);
        }
        if let Some(lsi) = removed.peer_lsi {
            self.lsi_index.remove(&lsi);
        }
        Some(removed)
    }

    /// Visit every association in insertion order. The callback may request
    /// deletion of the association it was just given by returning `true`.
    pub fn for_each_mut(&mut self, mut callback: impl FnMut(&mut HostAssociation) -> bool) {
        let keys: Vec<HaKey> = self.order.clone();
        for key in keys {
            let should_delete = match self.associations.get_mut(&key) {
                Some(ha) => callback(ha),
                None => continue,
            };
            if should_delete {
                self.delete(key.0, key.1);
            }
        }
    }

    pub fn for_each(&self, mut callback: impl FnMut(&HostAssociation)) {
        for key in &self.order {
            if let Some(ha) = self.associations.get(key) {
                callback(ha);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.associations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.associations.is_empty()
    }
}
