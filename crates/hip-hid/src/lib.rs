//! Local host identity store: the daemon's own keypairs and their HITs,
//! looked up by HIT or by algorithm preference.

use std::collections::HashMap;

use hip_crypto::SignatureAlgorithm;
use hip_types::Hit;
use hip_wire::params::HostId;

mod errors;

pub use errors::HidError;

/// One local host identity: its keypair, public half, and canonical
/// HOST_ID bytes (precomputed so callers don't re-derive them per packet).
pub struct HidEntry {
    pub hit: Hit,
    pub keypair: hip_crypto::HostKeyPair,
    pub host_id: HostId,
}

impl HidEntry {
    pub fn algorithm(&self) -> SignatureAlgorithm {
        self.keypair.algorithm()
    }
}

/// The order in which `default_hit` prefers algorithms when multiple local
/// identities are configured.
const ALGO_PREFERENCE: [SignatureAlgorithm; 4] = [
    SignatureAlgorithm::EcdsaP384,
    SignatureAlgorithm::EcdsaP256,
    SignatureAlgorithm::Rsa,
    SignatureAlgorithm::Dsa,
];

/// The daemon's single instance of local host identities, keyed by HIT.
#[derive(Default)]
pub struct HidStore {
    entries: HashMap<Hit, HidEntry>,
    insertion_order: Vec<Hit>,
}

impl HidStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, host_id: HostId, keypair: hip_crypto::HostKeyPair) -> Result<Hit, HidError> {
        let hit = hip_wire::host_id_to_hit(&host_id, hip_types::HitType::Hash100);
        if self.entries.contains_key(&hit) {
            return Err(HidError::DuplicateHit(hit));
        }
        self.entries.insert(
            hit,
            HidEntry {
                hit,
                keypair,
                host_id,
            },
        );
        self.insertion_order.push(hit);
        Ok(hit)
    }

    pub fn remove(&mut self, hit: &Hit) -> Option<HidEntry> {
        self.insertion_order.retain(|h| h != hit);
        self.entries.remove(hit)
    }

    pub fn lookup(&self, hit: &Hit) -> Option<&HidEntry> {
        self.entries.get(hit)
    }

    pub fn lookup_by_algorithm(&self, algo: SignatureAlgorithm) -> Option<&HidEntry> {
        self.insertion_order
            .iter()
            .filter_map(|hit| self.entries.get(hit))
            .find(|entry| entry.algorithm() == algo)
    }

    /// Deterministic selection: the first-inserted HIT among the most
    /// preferred algorithm that has any entry at all.
    pub fn default_hit(&self) -> Option<Hit> {
        for algo in ALGO_PREFERENCE {
            if let Some(entry) = self.lookup_by_algorithm(algo) {
                return Some(entry.hit);
            }
        }
        self.insertion_order.first().copied()
    }

    pub fn for_each(&self, mut callback: impl FnMut(&HidEntry)) {
        for hit in &self.insertion_order {
            if let Some(entry) = self.entries.get(hit) {
                callback(entry);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hip_wire::params::HiAlgo;
    use p256::ecdsa::SigningKey as P256SigningKey;

    fn sample_host_id(tag: u8) -> HostId {
        HostId {
            algo: HiAlgo::EcdsaP256,
            key_bytes: vec![tag; 65],
            hostname: None,
        }
    }

    fn sample_keypair() -> hip_crypto::HostKeyPair {
        let mut rng = rand::thread_rng();
        hip_crypto::HostKeyPair::EcdsaP256(Box::new(P256SigningKey::random(&mut rng)))
    }

    #[test]
    fn insert_then_lookup_round_trips() {
        let mut store = HidStore::new();
        let hit = store.insert(sample_host_id(1), sample_keypair()).unwrap();
        assert!(store.lookup(&hit).is_some());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn duplicate_host_id_is_rejected() {
        let mut store = HidStore::new();
        store.insert(sample_host_id(7), sample_keypair()).unwrap();
        let err = store.insert(sample_host_id(7), sample_keypair()).unwrap_err();
        assert!(matches!(err, HidError::DuplicateHit(_)));
    }

    #[test]
    fn default_hit_prefers_first_inserted_of_preferred_algo() {
        let mut store = HidStore::new();
        let first = store.insert(sample_host_id(1), sample_keypair()).unwrap();
        let _second = store.insert(sample_host_id(2), sample_keypair()).unwrap();
        assert_eq!(store.default_hit(), Some(first));
    }

    #[test]
    fn remove_drops_entry_and_updates_default() {
        let mut store = HidStore::new();
        let first = store.insert(sample_host_id(1), sample_keypair()).unwrap();
        let second = store.insert(sample_host_id(2), sample_keypair()).unwrap();
        store.remove(&first);
        assert!(store.lookup(&first).is_none());
        assert_eq!(store.default_hit(), Some(second));
    }

    #[test]
    fn for_each_visits_in_insertion_order() {
        let mut store = HidStore::new();
        let first = store.insert(sample_host_id(1), sample_keypair()).unwrap();
        let second = store.insert(sample_host_id(2), sample_keypair()).unwrap();
        let mut seen = Vec::new();
        store.for_each(|entry| seen.push(entry.hit));
        assert_eq!(seen, vec![first, second]);
    }

}
