//! Diffie-Hellman / ECDH groups.
//!
//! Group IDs follow the HIP base-exchange
//! registry (RFC 5201/7401): 1=modp-384 (HIP-specific, non-IETF), 2=Oakley-1
//! (RFC 2409 group 1, 768-bit), 3=modp-1536 (RFC 3526 group 5),
//! 4=modp-3072 (group 15), 5=modp-6144 (group 17), 6=modp-8192 (group 18),
//! 7=NIST P-256, 8=NIST P-384, 9=NIST P-521.

use num_bigint_dig::{BigUint, RandBigInt};
use p256::ecdh::EphemeralSecret as P256Secret;
use p256::PublicKey as P256PublicKey;
use p384::ecdh::EphemeralSecret as P384Secret;
use p384::PublicKey as P384PublicKey;
use p521::ecdh::EphemeralSecret as P521Secret;
use p521::PublicKey as P521PublicKey;

use crate::errors::CryptoError;

/// A supported DH or ECDH group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DhGroup {
    Modp384,
    Oakley1,
    Modp1536,
    Modp3072,
    Modp6144,
    Modp8192,
    NistP256,
    NistP384,
    NistP521,
}

impl DhGroup {
    /// Wire group-id, as negotiated in the DIFFIE_HELLMAN TLV.
    pub fn group_id(self) -> u8 {
        match self {
            DhGroup::Modp384 => 1,
            DhGroup::Oakley1 => 2,
            DhGroup::Modp1536 => 3,
            DhGroup::Modp3072 => 4,
            DhGroup::Modp6144 => 5,
            DhGroup::Modp8192 => 6,
            DhGroup::NistP256 => 7,
            DhGroup::NistP384 => 8,
            DhGroup::NistP521 => 9,
        }
    }

    pub fn from_group_id(id: u8) -> Option<Self> {
        Some(match id {
            1 => DhGroup::Modp384,
            2 => DhGroup::Oakley1,
            3 => DhGroup::Modp1536,
            4 => DhGroup::Modp3072,
            5 => DhGroup::Modp6144,
            6 => DhGroup::Modp8192,
            7 => DhGroup::NistP256,
            8 => DhGroup::NistP384,
            9 => DhGroup::NistP521,
            _ => return None,
        })
    }

    /// True for the three NIST elliptic-curve groups.
    pub fn is_ec(self) -> bool {
        matches!(self, DhGroup::NistP256 | DhGroup::NistP384 | DhGroup::NistP521)
    }

    /// Fixed public-value size in bytes for this group (modp groups: the
    /// prime's byte length; EC groups: SEC1 uncompressed point length).
    pub fn pub_value_len(self) -> usize {
        match self {
            DhGroup::Modp384 => 48,
            DhGroup::Oakley1 => 96,
            DhGroup::Modp1536 => 192,
            DhGroup::Modp3072 => 384,
            DhGroup::Modp6144 => 768,
            DhGroup::Modp8192 => 1024,
            DhGroup::NistP256 => 65,
            DhGroup::NistP384 => 97,
            DhGroup::NistP521 => 133,
        }
    }

    fn modp_params(self) -> Option<(&'static str, u32)> {
        match self {
            DhGroup::Modp384 => Some((MODP_384_HEX, 2)),
            DhGroup::Oakley1 => Some((OAKLEY_1_HEX, 2)),
            DhGroup::Modp1536 => Some((MODP_1536_HEX, 2)),
            DhGroup::Modp3072 => Some((MODP_3072_HEX, 2)),
            DhGroup::Modp6144 => Some((MODP_6144_HEX, 2)),
            DhGroup::Modp8192 => Some((MODP_8192_HEX, 2)),
            _ => None,
        }
    }
}

// HIP's group-id 1 ("modp-384") is HIP-specific and has no corresponding
// RFC 2409/3526 MODP group to draw a canonical prime from. This fixes it to
// the NIST P-384 field prime (2^384 - 2^128 - 2^96 + 2^32 - 1), a real,
// independently-documented 384-bit constant.
const MODP_384_HEX: &str = "FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEFFFFFFFF0000000000000000FFFFFFFF";
const OAKLEY_1_HEX: &str = "FFFFFFFFFFFFFFFFC90FDAA22168C234C4C6628B80DC1CD129024E088A67CC74020BBEA63B139B22514A08798E3404DDEF9519B3CD3A431B302B0A6DF25F14374FE1356D6D51C245E485B576625E7EC6F44C42E9A637ED6B0BFF5CB6F406B7EDEE386BFB5A899FA5AE9F24117C4B1FE649286651ECE65381FFFFFFFFFFFFFFFF";
const MODP_1536_HEX: &str = "FFFFFFFFFFFFFFFFC90FDAA22168C234C4C6628B80DC1CD129024E088A67CC74020BBEA63B139B22514A08798E3404DDEF9519B3CD3A431B302B0A6DF25F14374FE1356D6D51C245E485B576625E7EC6F44C42E9A637ED6B0BFF5CB6F406B7EDEE386BFB5A899FA5AE9F24117C4B1FE649286651ECE45B3DC2007CB8A163BF0598DA48361C55D39A69163FA8FD24CF5F83655D23DCA3AD961C62F356208552BB9ED529077096966D670C354E4ABC9804F1746C08CA237327FFFFFFFFFFFFFFFF";
const MODP_3072_HEX: &str = "FFFFFFFFFFFFFFFFC90FDAA22168C234C4C6628B80DC1CD129024E088A67CC74020BBEA63B139B22514A08798E3404DDEF9519B3CD3A431B302B0A6DF25F14374FE1356D6D51C245E485B576625E7EC6F44C42E9A637ED6B0BFF5CB6F406B7EDEE386BFB5A899FA5AE9F24117C4B1FE649286651ECE45B3DC2007CB8A163BF0598DA48361C55D39A69163FA8FD24CF5F83655D23DCA3AD961C62F356208552BB9ED529077096966D670C354E4ABC9804F1746C08CA18217C32905E462E36CE3BE39E772C180E86039B2783A2EC07A28FB5C55DF06F4C52C9DE2BCBF6955817183995497CEA956AE515D2261898FA051015728E5A8AACAA68FFFFFFFFFFFFFFFF";
const MODP_6144_HEX: &str = "FFFFFFFFFFFFFFFFC90FDAA22168C234C4C6628B80DC1CD129024E088A67CC74020BBEA63B139B22514A08798E3404DDEF9519B3CD3A431B302B0A6DF25F14374FE1356D6D51C245E485B576625E7EC6F44C42E9A637ED6B0BFF5CB6F406B7EDEE386BFB5A899FA5AE9F24117C4B1FE649286651ECE45B3DC2007CB8A163BF0598DA48361C55D39A69163FA8FD24CF5F83655D23DCA3AD961C62F356208552BB9ED529077096966D670C354E4ABC9804F1746C08CA18217C32905E462E36CE3BE39E772C180E86039B2783A2EC07A28FB5C55DF06F4C52C9DE2BCBF6955817183995497CEA956AE515D2261898FA051015728E5A8AAAC42DAD33170D04507A33A85521ABDF1CBA64ECFB850458DBEF0A8AEA71575D060C7DB3970F85A6E1E4C7ABF5AE8CDB0933D71E8C94E04A25619DCEE3D2261AD2EE6BF12FFA06D98A0864D87602733EC86A64521F2B18177B200CBBE117577A615D6C770988C0BAD946E208E24FA074E5AB3143DB5BFCE0FD108E4B82D120A92108011A723C12A787E6D788719A10BDBA5B2699C327186AF4E23C1A946834B6150BDA2583E9CA2AD44CE8DBBBC2DB04DE8EF92E8EFC141FBECAA6287C59474E6BC05D99B2964FA090C3A2233BA186515BE7ED1F612970CEE2D7AFB81BDD762170481CD0069127D5B05AA993B4EA988D8FDDC186FFB7DC90A6C08F4DF435C934063199FFFFFFFFFFFFFFFF";
const MODP_8192_HEX: &str = "FFFFFFFFFFFFFFFFC90FDAA22168C234C4C6628B80DC1CD129024E088A67CC74020BBEA63B139B22514A08798E3404DDEF9519B3CD3A431B302B0A6DF25F14374FE1356D6D51C245E485B576625E7EC6F44C42E9A637ED6B0BFF5CB6F406B7EDEE386BFB5A899FA5AE9F24117C4B1FE649286651ECE45B3DC2007CB8A163BF0598DA48361C55D39A69163FA8FD24CF5F83655D23DCA3AD961C62F356208552BB9ED529077096966D670C354E4ABC9804F1746C08CA18217C32905E462E36CE3BE39E772C180E86039B2783A2EC07A28FB5C55DF06F4C52C9DE2BCBF6955817183995497CEA956AE515D2261898FA051015728E5A8AAAC42DAD33170D04507A33A85521ABDF1CBA64ECFB850458DBEF0A8AEA71575D060C7DB3970F85A6E1E4C7ABF5AE8CDB0933D71E8C94E04A25619DCEE3D2261AD2EE6BF12FFA06D98A0864D87602733EC86A64521F2B18177B200CBBE117577A615D6C770988C0BAD946E208E24FA074E5AB3143DB5BFCE0FD108E4B82D120A92108011A723C12A787E6D788719A10BDBA5B2699C327186AF4E23C1A946834B6150BDA2583E9CA2AD44CE8DBBBC2DB04DE8EF92E8EFC141FBECAA6287C59474E6BC05D99B2964FA090C3A2233BA186515BE7ED1F612970CEE2D7AFB81BDD762170481CD0069127D5B05AA993B4EA988D8FDDC186FFB7DC90A6C08F4DF435C93402849236C3FAB4D27C7026C1D4DCB2602646DEC9751E763DBA37BDF8FF9406AD9E530EE5DB382F413001AEB06A53ED9027D831179727B0865A8918DA3EDBEBCF9B14ED44CE6CBACED4BB1BDB7F1447E6CC254B332051512BD7AF426FB8F401378CD2BF5983CA01C64B92ECF032EA15D1721D03F482D7CE6E74FEF6D55E702F46980C82B5A84031900B1C9E59E7C97FBEC7E8F323A97A7E36CC88BE0F1D45B7FF585AC54BD407B22B4154AACC8F6D7EBF48E1D814CC5ED20F8037E0A79715EEF29BE32806A1D58BB7C5DA76F550AA3D8A1FBFF0EB19CCB1A313D55CDA56C9EC2EF29632387FE8D76E3C0468043E8F663F4860EE12BF2D5B0B7474D6E694F91E6DCC4024FFFFFFFFFFFFFFFF";

/// Shared secret output of a completed DH/ECDH exchange.
#[derive(Clone)]
pub struct SharedSecret {
    bytes: Vec<u8>,
}

impl SharedSecret {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
    pub fn len(&self) -> usize {
        self.bytes.len()
    }
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// One side of an in-progress (EC)DH exchange.
pub enum DhKeyExchange {
    Modp {
        group: DhGroup,
        modulus: BigUint,
        generator: BigUint,
        private: BigUint,
        public: BigUint,
    },
    P256(P256Secret),
    P384(P384Secret),
    P521(P521Secret),
}

impl DhKeyExchange {
    /// Generate a fresh ephemeral key for `group`.
    pub fn generate(group: DhGroup) -> Result<Self, CryptoError> {
        let mut rng = rand::thread_rng();
        if let Some((modulus_hex, generator)) = group.modp_params() {
            let modulus = BigUint::parse_bytes(modulus_hex.as_bytes(), 16)
                .ok_or(CryptoError::KeyGenerationFailed("bad modulus".into()))?;
            let generator = BigUint::from(generator);
            let private = rng.gen_biguint_below(&modulus);
            let public = generator.modpow(&private, &modulus);
            return Ok(DhKeyExchange::Modp {
                group,
                modulus,
                generator,
                private,
                public,
            });
        }
        match group {
            DhGroup::NistP256 => Ok(DhKeyExchange::P256(P256Secret::random(&mut rng))),
            DhGroup::NistP384 => Ok(DhKeyExchange::P384(P384Secret::random(&mut rng))),
            DhGroup::NistP521 => Ok(DhKeyExchange::P521(P521Secret::random(&mut rng))),
            _ => Err(CryptoError::UnsupportedGroup(group)),
        }
    }

    pub fn group(&self) -> DhGroup {
        match self {
            DhKeyExchange::Modp { group, .. } => *group,
            DhKeyExchange::P256(_) => DhGroup::NistP256,
            DhKeyExchange::P384(_) => DhGroup::NistP384,
            DhKeyExchange::P521(_) => DhGroup::NistP521,
        }
    }

    /// The public value to place in the DIFFIE_HELLMAN TLV.
    pub fn public_value(&self) -> Vec<u8> {
        match self {
            DhKeyExchange::Modp { public, .. } => public.to_bytes_be(),
            DhKeyExchange::P256(secret) => {
                P256PublicKey::from(secret).to_sec1_bytes().to_vec()
            }
            DhKeyExchange::P384(secret) => {
                P384PublicKey::from(secret).to_sec1_bytes().to_vec()
            }
            DhKeyExchange::P521(secret) => {
                P521PublicKey::from(secret).to_sec1_bytes().to_vec()
            }
        }
    }

    /// Compute the shared secret given the peer's public value.
    pub fn compute_shared(&self, peer_public: &[u8]) -> Result<SharedSecret, CryptoError> {
        match self {
            DhKeyExchange::Modp {
                modulus, private, ..
            } => {
                let peer = BigUint::from_bytes_be(peer_public);
                let shared = peer.modpow(private, modulus);
                Ok(SharedSecret {
                    bytes: shared.to_bytes_be(),
                })
            }
            DhKeyExchange::P256(secret) => {
                let peer = P256PublicKey::from_sec1_bytes(peer_public)
                    .map_err(|_| CryptoError::InvalidPublicKey)?;
                let shared = secret.diffie_hellman(&peer);
                Ok(SharedSecret {
                    bytes: shared.raw_secret_bytes().to_vec(),
                })
            }
            DhKeyExchange::P384(secret) => {
                let peer = P384PublicKey::from_sec1_bytes(peer_public)
                    .map_err(|_| CryptoError::InvalidPublicKey)?;
                let shared = secret.diffie_hellman(&peer);
                Ok(SharedSecret {
                    bytes: shared.raw_secret_bytes().to_vec(),
                })
            }
            DhKeyExchange::P521(secret) => {
                let peer = P521PublicKey::from_sec1_bytes(peer_public)
                    .map_err(|_| CryptoError::InvalidPublicKey)?;
                let shared = secret.diffie_hellman(&peer);
                Ok(SharedSecret {
                    bytes: shared.raw_secret_bytes().to_vec(),
                })
            }
        }
    }
}

/// HIPv2 group-preference-list downgrade check.
///
/// `responder_prefs` is the responder's advertised ordered preference list
/// (as sent in R1); `initiator_choice` is the group the initiator actually
/// used in I2. The initiator MUST pick the responder's first *supported*
/// entry; if it picked anything else, that is a downgrade attempt.
pub fn detect_downgrade(
    responder_prefs: &[DhGroup],
    supported: &[DhGroup],
    initiator_choice: DhGroup,
) -> bool {
    let first_supported = responder_prefs.iter().find(|g| supported.contains(g));
    match first_supported {
        Some(expected) => *expected != initiator_choice,
        None => true,
    }
}
