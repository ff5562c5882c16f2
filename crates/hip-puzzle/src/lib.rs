//! R1 puzzle cache and the stateless puzzle-cookie mechanism that protects
//! the responder from committing state before the initiator proves it can
//! receive traffic at its claimed address.
//!
//! A solution is valid iff `SHA1(I || HIT_I || HIT_R || J)` has at least `K`
//! leading zero bits, and `I` matches a still-live entry this cache handed
//! out. The cache itself holds no per-initiator state: it keeps a small,
//! rotating pool of precomputed challenges (bounded at [`POOL_SIZE`]
//! regardless of how many I1s arrive), and a solution is checked against
//! whichever pool entry matches its `I` alone. When configured with an
//! [`R1Signer`], each pool entry also carries a fully built and signed R1
//! packet so the responder can answer a flood of I1s without touching the
//! HADB or re-running a signature operation per initiator.

use std::time::{Duration, Instant};

use hip_crypto::dh::{DhGroup, DhKeyExchange};
use hip_crypto::sha1_many;
use hip_crypto::sign::HostKeyPair;
use hip_types::Hit;
use hip_wire::header::{HipHeader, PacketType};
use hip_wire::params::{DiffieHellman, HostId, Puzzle, SignatureParam, TransformList};
use hip_wire::serialize::serialize;
use hip_wire::Message;
use rand::RngCore;

/// Difficulty used for freshly generated R1s under normal load.
pub const DEFAULT_DIFFICULTY: u8 = 10;
/// Difficulty substituted once the cache is under load (see [`PuzzleCache::set_loaded`]).
/// Always at least [`DEFAULT_DIFFICULTY`]: load raises the cost of a
/// solution, it never lowers it.
pub const LOADED_DIFFICULTY: u8 = 14;
const DEFAULT_LIFETIME: Duration = Duration::from_secs(60);
/// Bounded size of the rotating challenge pool. A flood of I1s rotates
/// entries out; it never grows the pool past this size.
const POOL_SIZE: usize = 16;

/// One precomputed challenge, keyed by its random `I`. When the cache was
/// built with an [`R1Signer`], also carries the DH keypair and the signed R1
/// template used to answer it.
struct PoolEntry {
    i: u64,
    k: u8,
    issued_at: Instant,
    lifetime: Duration,
    dh: Option<DhKeyExchange>,
    /// Fully serialized, signed R1 with a placeholder (all-zero)
    /// receiver-HIT, ready to be patched per-initiator.
    r1_template: Option<Vec<u8>>,
}

impl PoolEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now.duration_since(self.issued_at) > self.lifetime
    }
}

/// Error returned when a submitted (I, J) pair does not satisfy an
/// outstanding challenge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PuzzleVerifyError {
    /// No cache entry exists for this `I` (never issued, or already expired
    /// and rotated out).
    UnknownOrExpired,
    /// The hash does not have `k` leading zero bits.
    WrongSolution,
}

/// The local host identity and offered transforms used to build and sign
/// real R1 packets. A [`PuzzleCache`] without one still issues bare `(I, K)`
/// challenges, for pure puzzle-verification tests and callers that build
/// their own R1.
pub struct R1Signer {
    pub keypair: HostKeyPair,
    pub host_id: HostId,
    pub dh_group: DhGroup,
    pub hip_transforms: Vec<u16>,
    pub esp_transforms: Vec<u16>,
}

impl R1Signer {
    /// Build and sign an R1 with a placeholder receiver-HIT. `header_length`
    /// is computed from the TLV body alone, so patching the real receiver
    /// HIT into the serialized bytes afterward (see
    /// [`PuzzleCache::r1_bytes_for`]) never invalidates the signature or the
    /// framing.
    fn build_template(&self, local_hit: Hit, i: u64, k: u8, dh: &DhKeyExchange) -> Vec<u8> {
        let header = HipHeader {
            next_header: 0,
            header_length: 0,
            packet_type: PacketType::R1,
            version: 1,
            checksum: 0,
            controls: 0,
            sender_hit: local_hit,
            receiver_hit: Hit::from_bytes([0u8; 16]),
        };
        let mut message = Message::new(header);
        message.push(
            Puzzle {
                k,
                lifetime: 64,
                opaque: 0,
                i,
            }
            .to_tlv(),
        );
        message.push(
            DiffieHellman {
                group_id: self.dh_group.group_id(),
                public_value: dh.public_value(),
            }
            .to_tlv(),
        );
        message.push(TransformList::hip(self.hip_transforms.clone()).to_tlv());
        message.push(TransformList::esp(self.esp_transforms.clone()).to_tlv());
        message.push(self.host_id.to_tlv());

        let digest_input = serialize(&message);
        let signature = self
            .keypair
            .sign(&digest_input)
            .expect("local signing key is always usable");
        message.push(SignatureParam::signature(self.keypair.algorithm().algo_id(), signature).to_tlv());
        serialize(&message)
    }
}

/// Per-local-HIT cache of outstanding R1 puzzles, generated ahead of time so
/// a flood of I1s can be answered without touching the HADB.
pub struct PuzzleCache {
    local_hit: Hit,
    difficulty: u8,
    signer: Option<R1Signer>,
    pool: Vec<PoolEntry>,
}

impl PuzzleCache {
    pub fn new(local_hit: Hit) -> Self {
        Self {
            local_hit,
            difficulty: DEFAULT_DIFFICULTY,
            signer: None,
            pool: Vec::new(),
        }
    }

    /// Build a cache that also produces real signed R1 packets.
    pub fn with_signer(local_hit: Hit, signer: R1Signer) -> Self {
        Self {
            local_hit,
            difficulty: DEFAULT_DIFFICULTY,
            signer: Some(signer),
            pool: Vec::new(),
        }
    }

    /// Switch to the raised difficulty used once incoming-I1 rate exceeds
    /// the configured threshold; `unset_loaded` restores the default.
    pub fn set_loaded(&mut self, loaded: bool) {
        self.difficulty = if loaded { LOADED_DIFFICULTY } else { DEFAULT_DIFFICULTY };
    }

    /// Generate a fresh challenge for an I1, rotating it into the bounded
    /// pool for later stateless verification. If this cache was built with
    /// an [`R1Signer`], also generates a fresh DH keypair and a signed R1
    /// template for the challenge.
    pub fn generate(&mut self, now: Instant) -> (u64, u8) {
        let mut rng = rand::thread_rng();
        let i = rng.next_u64();
        let k = self.difficulty;
        let (dh, r1_template) = match &self.signer {
            Some(signer) => {
                let dh = DhKeyExchange::generate(signer.dh_group)
                    .expect("dh generation for a fixed group always succeeds");
                let template = signer.build_template(self.local_hit, i, k, &dh);
                (Some(dh), Some(template))
            }
            None => (None, None),
        };
        if self.pool.len() >= POOL_SIZE {
            self.pool.remove(0);
        }
        self.pool.push(PoolEntry {
            i,
            k,
            issued_at: now,
            lifetime: DEFAULT_LIFETIME,
            dh,
            r1_template,
        });
        (i, k)
    }

    /// The signed R1 bytes issued for challenge `i`, with `peer_hit` patched
    /// into the receiver-HIT field. `None` if `i` isn't a live pool entry or
    /// this cache wasn't built with a signer.
    pub fn r1_bytes_for(&self, i: u64, peer_hit: Hit) -> Option<Vec<u8>> {
        let entry = self.pool.iter().find(|e| e.i == i)?;
        let mut bytes = entry.r1_template.clone()?;
        bytes[24..40].copy_from_slice(peer_hit.as_bytes());
        Some(bytes)
    }

    /// The DH keyexchange generated for challenge `i`, needed to compute the
    /// shared secret once the initiator's I2 arrives. `None` if `i` isn't a
    /// live pool entry or this cache wasn't built with a signer.
    pub fn dh_for(&self, i: u64) -> Option<&DhKeyExchange> {
        self.pool.iter().find(|e| e.i == i)?.dh.as_ref()
    }

    /// Verify a submitted solution against this cache's outstanding
    /// entries. Does not consume the entry: a retransmitted I2 with the
    /// same (I, J) must verify again identically.
    pub fn verify(&self, peer_hit: Hit, i: u64, j: u64, now: Instant) -> Result<(), PuzzleVerifyError> {
        let entry = self.pool.iter().find(|e| e.i == i).ok_or(PuzzleVerifyError::UnknownOrExpired)?;
        if entry.is_expired(now) {
            return Err(PuzzleVerifyError::UnknownOrExpired);
        }
        if count_leading_zero_bits(&solution_hash(i, &self.local_hit, &peer_hit, j)) >= entry.k {
            Ok(())
        } else {
            Err(PuzzleVerifyError::WrongSolution)
        }
    }

    /// Drop expired entries. Callers invoke this periodically rather than
    /// on every lookup so the cache doesn't pay the sweep cost per packet.
    pub fn sweep(&mut self, now: Instant) {
        self.pool.retain(|entry| !entry.is_expired(now));
    }

    pub fn len(&self) -> usize {
        self.pool.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pool.is_empty()
    }
}

fn solution_hash(i: u64, local_hit: &Hit, peer_hit: &Hit, j: u64) -> [u8; 20] {
    sha1_many(&[&i.to_be_bytes(), local_hit.as_ref(), peer_hit.as_ref(), &j.to_be_bytes()])
}

fn count_leading_zero_bits(digest: &[u8; 20]) -> u8 {
    let mut count = 0u8;
    for byte in digest {
        if *byte == 0 {
            count += 8;
            continue;
        }
        count += byte.leading_zeros() as u8;
        break;
    }
    count
}

/// Brute-force the initiator side: increment `J` from zero until the hash
/// clears `k` leading zero bits. Only used by test and client code; the
/// responder never solves its own puzzles.
pub fn solve(i: u64, local_hit: &Hit, peer_hit: &Hit, k: u8) -> u64 {
    let mut j = 0u64;
    loop {
        if count_leading_zero_bits(&solution_hash(i, local_hit, peer_hit, j)) >= k {
            return j;
        }
        j += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(byte: u8) -> Hit {
        Hit::from_bytes([byte; 16])
    }

    #[test]
    fn solved_puzzle_verifies() {
        let mut cache = PuzzleCache::new(hit(1));
        cache.difficulty = 8;
        let now = Instant::now();
        let (i, k) = cache.generate(now);
        let j = solve(i, &hit(1), &hit(2), k);
        assert!(cache.verify(hit(2), i, j, now).is_ok());
    }

    #[test]
    fn wrong_solution_is_rejected() {
        let mut cache = PuzzleCache::new(hit(1));
        let now = Instant::now();
        let (i, _k) = cache.generate(now);
        assert_eq!(cache.verify(hit(2), i, 0, now), Err(PuzzleVerifyError::WrongSolution));
    }

    #[test]
    fn unknown_i_is_rejected() {
        let cache = PuzzleCache::new(hit(1));
        let now = Instant::now();
        assert_eq!(cache.verify(hit(2), 42, 0, now), Err(PuzzleVerifyError::UnknownOrExpired));
    }

    #[test]
    fn expired_entry_is_rejected_even_with_correct_solution() {
        let mut cache = PuzzleCache::new(hit(1));
        cache.difficulty = 4;
        let now = Instant::now();
        let (i, k) = cache.generate(now);
        let j = solve(i, &hit(1), &hit(2), k);
        let later = now + DEFAULT_LIFETIME + Duration::from_secs(1);
        assert_eq!(cache.verify(hit(2), i, j, later), Err(PuzzleVerifyError::UnknownOrExpired));
    }

    #[test]
    fn sweep_drops_only_expired_entries() {
        let mut cache = PuzzleCache::new(hit(1));
        let now = Instant::now();
        cache.generate(now);
        let later = now + DEFAULT_LIFETIME + Duration::from_secs(1);
        cache.generate(later);
        cache.sweep(later);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn pool_never_grows_past_its_bound() {
        let mut cache = PuzzleCache::new(hit(1));
        let now = Instant::now();
        for _ in 0..(POOL_SIZE * 4) {
            cache.generate(now);
        }
        assert_eq!(cache.len(), POOL_SIZE);
    }

    #[test]
    fn loaded_difficulty_is_at_least_the_default() {
        let mut cache = PuzzleCache::new(hit(1));
        cache.set_loaded(true);
        assert_eq!(cache.difficulty, LOADED_DIFFICULTY);
        assert!(LOADED_DIFFICULTY >= DEFAULT_DIFFICULTY);
        cache.set_loaded(false);
        assert_eq!(cache.difficulty, DEFAULT_DIFFICULTY);
    }

    #[test]
    fn retransmitted_solution_verifies_again_without_consuming_entry() {
        let mut cache = PuzzleCache::new(hit(1));
        cache.difficulty = 6;
        let now = Instant::now();
        let (i, k) = cache.generate(now);
        let j = solve(i, &hit(1), &hit(2), k);
        assert!(cache.verify(hit(2), i, j, now).is_ok());
        assert!(cache.verify(hit(2), i, j, now).is_ok());
    }

    #[test]
    fn cache_without_signer_issues_no_r1_bytes() {
        let mut cache = PuzzleCache::new(hit(1));
        let now = Instant::now();
        let (i, _k) = cache.generate(now);
        assert!(cache.r1_bytes_for(i, hit(2)).is_none());
        assert!(cache.dh_for(i).is_none());
    }
}
