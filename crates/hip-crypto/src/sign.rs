//! HOST_ID signature algorithms: RSA, DSA, ECDSA-P256, ECDSA-P384.
//!
//! The DSA signature encoding has a framing bug where
//! `r`/`s` with a leading zero byte get silently stripped to fewer than 20
//! bytes, desynchronizing the fixed 41-byte T||R||S HIP_SIGNATURE encoding.
//! `dsa_signature_to_wire`/`dsa_signature_from_wire` below always left-pad
//! `r` and `s` to 20 bytes regardless of their natural big-endian length.

use dsa::signature::{RandomizedSigner as DsaRandomizedSigner, Signature as DsaSigSig, Verifier as DsaVerifier};
use dsa::{Signature as DsaSignature, SigningKey as DsaSigningKey, VerifyingKey as DsaVerifyingKey};
use p256::elliptic_curve::sec1::ToEncodedPoint;
use p256::ecdsa::{
    signature::Signer as P256Signer, signature::Verifier as P256Verifier, Signature as P256Signature,
    SigningKey as P256SigningKey, VerifyingKey as P256VerifyingKey,
};
use p384::ecdsa::{
    signature::Signer as P384Signer, signature::Verifier as P384Verifier, Signature as P384Signature,
    SigningKey as P384SigningKey, VerifyingKey as P384VerifyingKey,
};
use rsa::pkcs1v15::{Signature as RsaSignature, SigningKey as RsaSigningKey, VerifyingKey as RsaVerifyingKey};
use rsa::signature::{RandomizedSigner as RsaRandomizedSigner, Signature as RsaSigSig, Verifier as RsaVerifier};
use rsa::{RsaPrivateKey, RsaPublicKey};
use sha1::Sha1;

use crate::errors::CryptoError;

/// HI_ALGO values from the HOST_ID / HI_ALGO registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureAlgorithm {
    Dsa,
    Rsa,
    EcdsaP256,
    EcdsaP384,
}

impl SignatureAlgorithm {
    pub fn algo_id(self) -> u8 {
        match self {
            SignatureAlgorithm::Dsa => 3,
            SignatureAlgorithm::Rsa => 5,
            SignatureAlgorithm::EcdsaP256 => 7,
            SignatureAlgorithm::EcdsaP384 => 9,
        }
    }

    pub fn from_algo_id(id: u8) -> Option<Self> {
        Some(match id {
            3 => SignatureAlgorithm::Dsa,
            5 => SignatureAlgorithm::Rsa,
            7 => SignatureAlgorithm::EcdsaP256,
            9 => SignatureAlgorithm::EcdsaP384,
            _ => return None,
        })
    }
}

/// A host identity keypair, able to sign and verify HIP control packets.
#[derive(Clone)]
pub enum HostKeyPair {
    Dsa(Box<DsaSigningKey>),
    Rsa(Box<RsaPrivateKey>),
    EcdsaP256(Box<P256SigningKey>),
    EcdsaP384(Box<P384SigningKey>),
}

/// The public half only, as carried in a HOST_ID TLV.
pub enum HostPublicKey {
    Dsa(DsaVerifyingKey),
    Rsa(RsaPublicKey),
    EcdsaP256(P256VerifyingKey),
    EcdsaP384(P384VerifyingKey),
}

impl HostKeyPair {
    pub fn algorithm(&self) -> SignatureAlgorithm {
        match self {
            HostKeyPair::Dsa(_) => SignatureAlgorithm::Dsa,
            HostKeyPair::Rsa(_) => SignatureAlgorithm::Rsa,
            HostKeyPair::EcdsaP256(_) => SignatureAlgorithm::EcdsaP256,
            HostKeyPair::EcdsaP384(_) => SignatureAlgorithm::EcdsaP384,
        }
    }

    pub fn public(&self) -> HostPublicKey {
        match self {
            HostKeyPair::Dsa(sk) => HostPublicKey::Dsa(sk.verifying_key().clone()),
            HostKeyPair::Rsa(sk) => HostPublicKey::Rsa(sk.to_public_key()),
            HostKeyPair::EcdsaP256(sk) => HostPublicKey::EcdsaP256(*sk.verifying_key()),
            HostKeyPair::EcdsaP384(sk) => HostPublicKey::EcdsaP384(*sk.verifying_key()),
        }
    }

    /// Sign `digest_input` (the packet bytes with the signature field
    /// zeroed), returning the wire-ready signature
    /// bytes (fixed-width for DSA, DER/raw concatenation for the others).
    pub fn sign(&self, message: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let mut rng = rand::thread_rng();
        match self {
            HostKeyPair::Dsa(sk) => {
                let sig: DsaSignature = sk.sign_with_rng(&mut rng, message);
                Ok(dsa_signature_to_wire(&sig))
            }
            HostKeyPair::Rsa(sk) => {
                let signing_key = RsaSigningKey::<Sha1>::new(sk.as_ref().clone());
                let sig: RsaSignature = signing_key.sign_with_rng(&mut rng, message);
                Ok(sig.as_bytes().to_vec())
            }
            HostKeyPair::EcdsaP256(sk) => {
                let sig: P256Signature = sk.sign(message);
                Ok(sig.to_bytes().to_vec())
            }
            HostKeyPair::EcdsaP384(sk) => {
                let sig: P384Signature = sk.sign(message);
                Ok(sig.to_bytes().to_vec())
            }
        }
    }
}

impl HostPublicKey {
    /// Reconstruct a peer's public key from the HOST_ID TLV's algorithm id
    /// and key bytes. EC keys are carried as SEC1 uncompressed points;
    /// RSA/DSA HOST_ID parsing isn't implemented yet, so those algorithms
    /// are rejected here even though signing with them is fully supported.
    pub fn from_host_id(algo: SignatureAlgorithm, key_bytes: &[u8]) -> Result<Self, CryptoError> {
        match algo {
            SignatureAlgorithm::EcdsaP256 => P256VerifyingKey::from_sec1_bytes(key_bytes)
                .map(HostPublicKey::EcdsaP256)
                .map_err(|_| CryptoError::InvalidPublicKey),
            SignatureAlgorithm::EcdsaP384 => P384VerifyingKey::from_sec1_bytes(key_bytes)
                .map(HostPublicKey::EcdsaP384)
                .map_err(|_| CryptoError::InvalidPublicKey),
            SignatureAlgorithm::Dsa | SignatureAlgorithm::Rsa => Err(CryptoError::UnsupportedAlgorithm),
        }
    }

    /// Canonical HOST_ID key bytes for this public key (SEC1 uncompressed
    /// point for EC algorithms).
    pub fn to_host_id_bytes(&self) -> Result<Vec<u8>, CryptoError> {
        match self {
            HostPublicKey::EcdsaP256(vk) => Ok(vk.to_encoded_point(false).as_bytes().to_vec()),
            HostPublicKey::EcdsaP384(vk) => Ok(vk.to_encoded_point(false).as_bytes().to_vec()),
            HostPublicKey::Dsa(_) | HostPublicKey::Rsa(_) => Err(CryptoError::UnsupportedAlgorithm),
        }
    }

    pub fn algorithm(&self) -> SignatureAlgorithm {
        match self {
            HostPublicKey::Dsa(_) => SignatureAlgorithm::Dsa,
            HostPublicKey::Rsa(_) => SignatureAlgorithm::Rsa,
            HostPublicKey::EcdsaP256(_) => SignatureAlgorithm::EcdsaP256,
            HostPublicKey::EcdsaP384(_) => SignatureAlgorithm::EcdsaP384,
        }
    }

    pub fn verify(&self, message: &[u8], signature: &[u8]) -> Result<(), CryptoError> {
        match self {
            HostPublicKey::Dsa(vk) => {
                let sig = dsa_signature_from_wire(signature)?;
                vk.verify(message, &sig)
                    .map_err(|_| CryptoError::SignatureVerificationFailed)
            }
            HostPublicKey::Rsa(pk) => {
                let verifying_key = RsaVerifyingKey::<Sha1>::new(pk.clone());
                let sig = RsaSignature::try_from(signature)
                    .map_err(|e| CryptoError::InvalidSignatureEncoding(e.to_string()))?;
                verifying_key
                    .verify(message, &sig)
                    .map_err(|_| CryptoError::SignatureVerificationFailed)
            }
            HostPublicKey::EcdsaP256(vk) => {
                let sig = P256Signature::from_slice(signature)
                    .map_err(|e| CryptoError::InvalidSignatureEncoding(e.to_string()))?;
                vk.verify(message, &sig)
                    .map_err(|_| CryptoError::SignatureVerificationFailed)
            }
            HostPublicKey::EcdsaP384(vk) => {
                let sig = P384Signature::from_slice(signature)
                    .map_err(|e| CryptoError::InvalidSignatureEncoding(e.to_string()))?;
                vk.verify(message, &sig)
                    .map_err(|_| CryptoError::SignatureVerificationFailed)
            }
        }
    }
}

/// Fixed width of each DSA signature component on the wire.
const DSA_COMPONENT_LEN: usize = 20;

/// Encode a DSA signature as a fixed 40-byte `R || S` buffer, left-padding
/// each component with zeroes. The RustCrypto `dsa` crate's `Signature`
/// strips leading zero bytes from its big-endian encoding of `r`/`s`; doing
/// that here would desync every HIP_SIGNATURE TLV whose R or S happens to
/// start with a zero byte (~1-in-256 per component).
fn dsa_signature_to_wire(sig: &DsaSignature) -> Vec<u8> {
    let mut out = Vec::with_capacity(DSA_COMPONENT_LEN * 2);
    out.extend(left_pad(&sig.r().to_bytes_be(), DSA_COMPONENT_LEN));
    out.extend(left_pad(&sig.s().to_bytes_be(), DSA_COMPONENT_LEN));
    out
}

fn dsa_signature_from_wire(wire: &[u8]) -> Result<DsaSignature, CryptoError> {
    if wire.len() != DSA_COMPONENT_LEN * 2 {
        return Err(CryptoError::InvalidSignatureEncoding(format!(
            "DSA signature must be {} bytes, got {}",
            DSA_COMPONENT_LEN * 2,
            wire.len()
        )));
    }
    let (r_bytes, s_bytes) = wire.split_at(DSA_COMPONENT_LEN);
    DsaSignature::from_components(
        num_bigint_dig::BigUint::from_bytes_be(r_bytes),
        num_bigint_dig::BigUint::from_bytes_be(s_bytes),
    )
    .map_err(|e| CryptoError::InvalidSignatureEncoding(e.to_string()))
}

fn left_pad(bytes: &[u8], width: usize) -> Vec<u8> {
    if bytes.len() >= width {
        return bytes[bytes.len() - width..].to_vec();
    }
    let mut out = vec![0u8; width - bytes.len()];
    out.extend_from_slice(bytes);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint_dig::BigUint;

    /// Regression test for the DSA leading-zero framing bug. A component whose natural encoding is shorter than 20
    /// bytes must still round-trip through the fixed-width wire encoding.
    #[test]
    fn dsa_wire_encoding_pads_short_components() {
        let short_r = BigUint::from_bytes_be(&[0x00, 0x01, 0x02]);
        let short_s = BigUint::from_bytes_be(&[0xAB]);
        let sig = DsaSignature::from_components(short_r.clone(), short_s.clone()).unwrap();

        let wire = dsa_signature_to_wire(&sig);
        assert_eq!(wire.len(), DSA_COMPONENT_LEN * 2);

        let decoded = dsa_signature_from_wire(&wire).unwrap();
        assert_eq!(decoded.r(), &short_r);
        assert_eq!(decoded.s(), &short_s);
    }

    #[test]
    fn dsa_wire_encoding_rejects_wrong_length() {
        let err = dsa_signature_from_wire(&[0u8; 39]).unwrap_err();
        assert!(matches!(err, CryptoError::InvalidSignatureEncoding(_)));
    }

    #[test]
    fn left_pad_is_identity_at_exact_width() {
        let bytes = vec![0xFFu8; 20];
        assert_eq!(left_pad(&bytes, 20), bytes);
    }

    #[test]
    fn algo_id_roundtrips() {
        for algo in [
            SignatureAlgorithm::Dsa,
            SignatureAlgorithm::Rsa,
            SignatureAlgorithm::EcdsaP256,
            SignatureAlgorithm::EcdsaP384,
        ] {
            assert_eq!(SignatureAlgorithm::from_algo_id(algo.algo_id()), Some(algo));
        }
    }
}
