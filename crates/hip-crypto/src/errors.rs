//! Crypto error types.

use thiserror::Error;

/// Cryptographic operation errors.
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("unsupported DH/ECDH group: {0:?}")]
    UnsupportedGroup(crate::dh::DhGroup),

    #[error("unsupported signature algorithm")]
    UnsupportedAlgorithm,

    #[error("unsupported HIP transform suite id {0}")]
    UnsupportedTransform(u16),

    #[error("invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("invalid IV length: expected {expected}, got {actual}")]
    InvalidIvLength { expected: usize, actual: usize },

    #[error("signature verification failed")]
    SignatureVerificationFailed,

    #[error("invalid signature encoding: {0}")]
    InvalidSignatureEncoding(String),

    #[error("invalid public key")]
    InvalidPublicKey,

    #[error("invalid private key")]
    InvalidPrivateKey,

    #[error("key generation failed: {0}")]
    KeyGenerationFailed(String),

    #[error("encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("decryption failed: padding or MAC check failed")]
    DecryptionFailed,

    #[error("keymat index {0} exceeds derived keymat length {1}")]
    KeymatExhausted(usize, usize),

    #[error("hash-chain/hash-tree depth or length invariant violated: {0}")]
    InvalidChainParameters(&'static str),
}
