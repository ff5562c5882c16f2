//! `host_id_to_hit`: deriving a HIT from a canonical HOST_ID.

use hip_crypto::sha1_truncated;
use hip_types::{Hit, HitType};

use crate::params::HostId;

/// SHA-1(canonical-HI)\[0..12\] prefixed with the ORCHID prefix and OR'd
/// with the HIT-type selector bits.
pub fn host_id_to_hit(host_id: &HostId, hit_type: HitType) -> Hit {
    let canonical = host_id.canonical_bytes();
    let suffix = sha1_truncated(&canonical, 12);
    Hit::from_hash(hit_type, &suffix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::HiAlgo;

    #[test]
    fn host_id_to_hit_is_deterministic() {
        let hi = HostId {
            algo: HiAlgo::EcdsaP256,
            key_bytes: vec![0x01; 65],
            hostname: None,
        };
        let a = host_id_to_hit(&hi, HitType::Hash100);
        let b = host_id_to_hit(&hi, HitType::Hash100);
        assert_eq!(a, b);
        assert!(a.has_orchid_prefix());
    }

    #[test]
    fn different_keys_produce_different_hits() {
        let hi_a = HostId {
            algo: HiAlgo::Rsa,
            key_bytes: vec![0x01; 128],
            hostname: None,
        };
        let hi_b = HostId {
            algo: HiAlgo::Rsa,
            key_bytes: vec![0x02; 128],
            hostname: None,
        };
        assert_ne!(
            host_id_to_hit(&hi_a, HitType::Hash100),
            host_id_to_hit(&hi_b, HitType::Hash100)
        );
    }
}
