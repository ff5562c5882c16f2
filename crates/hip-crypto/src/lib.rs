//! Cryptographic primitives for the Host Identity Protocol core: DH/ECDH
//! groups, HOST_ID signatures, HIP_CIPHER/ESP symmetric transforms, the
//! KEYMAT key derivation function, and the hash-chain/hash-tree primitives
//! used by ESP-protection.

pub mod dh;
pub mod errors;
pub mod hash;
pub mod hashchain;
pub mod hashtree;
pub mod keymat;
pub mod sign;
pub mod symmetric;

pub use dh::{DhGroup, DhKeyExchange, SharedSecret};
pub use errors::CryptoError;
pub use hash::{constant_time_eq, hmac_sha1, sha1, sha1_many, sha1_truncated, Sha1Digest};
pub use hashchain::HashChain;
pub use hashtree::HashTree;
pub use keymat::{KeymatSlot, KeymatStream};
pub use sign::{HostKeyPair, HostPublicKey, SignatureAlgorithm};
pub use symmetric::SymmetricTransform;
