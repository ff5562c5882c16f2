//! ESP/control-plane symmetric transforms: AES-CBC, 3DES-CBC, and NULL
//!.

use aes::Aes128;
use cbc::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use des::TdesEde3;

use crate::errors::CryptoError;

type Aes128CbcEnc = cbc::Encryptor<Aes128>;
type Aes128CbcDec = cbc::Decryptor<Aes128>;
type TdesCbcEnc = cbc::Encryptor<TdesEde3>;
type TdesCbcDec = cbc::Decryptor<TdesEde3>;

/// HIP_CIPHER / ESP transform suite ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymmetricTransform {
    Null,
    AesCbc,
    TripleDesCbc,
}

impl SymmetricTransform {
    pub fn transform_id(self) -> u16 {
        match self {
            SymmetricTransform::Null => 1,
            SymmetricTransform::TripleDesCbc => 2,
            SymmetricTransform::AesCbc => 3,
        }
    }

    pub fn from_transform_id(id: u16) -> Option<Self> {
        Some(match id {
            1 => SymmetricTransform::Null,
            2 => SymmetricTransform::TripleDesCbc,
            3 => SymmetricTransform::AesCbc,
            _ => return None,
        })
    }

    pub fn key_len(self) -> usize {
        match self {
            SymmetricTransform::Null => 0,
            SymmetricTransform::AesCbc => 16,
            SymmetricTransform::TripleDesCbc => 24,
        }
    }

    pub fn block_len(self) -> usize {
        match self {
            SymmetricTransform::Null => 1,
            SymmetricTransform::AesCbc => 16,
            SymmetricTransform::TripleDesCbc => 8,
        }
    }

    /// MAC algorithm is always HMAC-SHA1 for every defined HIP transform.
    pub fn mac_key_len(self) -> usize {
        20
    }
}

/// Encrypt `plaintext` under `key`/`iv` using PKCS#7 padding, as used for
/// the ENCRYPTED parameter and ESP payload confidentiality.
pub fn encrypt(
    transform: SymmetricTransform,
    key: &[u8],
    iv: &[u8],
    plaintext: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    check_key_len(transform, key)?;
    match transform {
        SymmetricTransform::Null => Ok(plaintext.to_vec()),
        SymmetricTransform::AesCbc => {
            check_iv_len(transform, iv)?;
            let enc = Aes128CbcEnc::new(key.into(), iv.into());
            Ok(enc.encrypt_padded_vec_mut::<Pkcs7>(plaintext))
        }
        SymmetricTransform::TripleDesCbc => {
            check_iv_len(transform, iv)?;
            let enc = TdesCbcEnc::new(key.into(), iv.into());
            Ok(enc.encrypt_padded_vec_mut::<Pkcs7>(plaintext))
        }
    }
}

/// Decrypt and unpad `ciphertext`. Returns `CryptoError::DecryptionFailed`
/// on any padding error, deliberately without distinguishing a bad key from
/// a bad padding byte (padding-oracle hygiene).
pub fn decrypt(
    transform: SymmetricTransform,
    key: &[u8],
    iv: &[u8],
    ciphertext: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    check_key_len(transform, key)?;
    match transform {
        SymmetricTransform::Null => Ok(ciphertext.to_vec()),
        SymmetricTransform::AesCbc => {
            check_iv_len(transform, iv)?;
            let dec = Aes128CbcDec::new(key.into(), iv.into());
            dec.decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
                .map_err(|_| CryptoError::DecryptionFailed)
        }
        SymmetricTransform::TripleDesCbc => {
            check_iv_len(transform, iv)?;
            let dec = TdesCbcDec::new(key.into(), iv.into());
            dec.decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
                .map_err(|_| CryptoError::DecryptionFailed)
        }
    }
}

fn check_key_len(transform: SymmetricTransform, key: &[u8]) -> Result<(), CryptoError> {
    if transform != SymmetricTransform::Null && key.len() != transform.key_len() {
        return Err(CryptoError::InvalidKeyLength {
            expected: transform.key_len(),
            actual: key.len(),
        });
    }
    Ok(())
}

fn check_iv_len(transform: SymmetricTransform, iv: &[u8]) -> Result<(), CryptoError> {
    if iv.len() != transform.block_len() {
        return Err(CryptoError::InvalidIvLength {
            expected: transform.block_len(),
            actual: iv.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aes_cbc_round_trips() {
        let key = [0x11u8; 16];
        let iv = [0x22u8; 16];
        let plaintext = b"host identity protocol test message";
        let ct = encrypt(SymmetricTransform::AesCbc, &key, &iv, plaintext).unwrap();
        let pt = decrypt(SymmetricTransform::AesCbc, &key, &iv, &ct).unwrap();
        assert_eq!(pt, plaintext);
    }

    #[test]
    fn triple_des_cbc_round_trips() {
        let key = [0x33u8; 24];
        let iv = [0x44u8; 8];
        let plaintext = b"short msg";
        let ct = encrypt(SymmetricTransform::TripleDesCbc, &key, &iv, plaintext).unwrap();
        let pt = decrypt(SymmetricTransform::TripleDesCbc, &key, &iv, &ct).unwrap();
        assert_eq!(pt, plaintext);
    }

    #[test]
    fn null_transform_is_identity() {
        let data = b"unencrypted";
        let ct = encrypt(SymmetricTransform::Null, &[], &[], data).unwrap();
        assert_eq!(ct, data);
    }

    #[test]
    fn wrong_key_length_is_rejected() {
        let err = encrypt(SymmetricTransform::AesCbc, &[0u8; 8], &[0u8; 16], b"x").unwrap_err();
        assert!(matches!(err, CryptoError::InvalidKeyLength { .. }));
    }

    #[test]
    fn transform_id_roundtrips() {
        for t in [
            SymmetricTransform::Null,
            SymmetricTransform::AesCbc,
            SymmetricTransform::TripleDesCbc,
        ] {
            assert_eq!(SymmetricTransform::from_transform_id(t.transform_id()), Some(t));
        }
    }
}
