//! Typed views over specific TLV contents.
//! Each type knows its parameter type code and how to encode/decode its
//! own contents; `Message` uses these to expose typed getters over the raw
//! `Tlv` list.

use crate::errors::WireError;
use crate::tlv::{param_type, Tlv};

fn need(contents: &[u8], min_len: usize, param: u16) -> Result<(), WireError> {
    if contents.len() < min_len {
        return Err(WireError::MalformedParameter(param, contents.len()));
    }
    Ok(())
}

/// ESP_INFO: old/new SPI and the keymat index the new SA's keys start at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EspInfo {
    pub old_spi: u32,
    pub new_spi: u32,
    pub keymat_index: u16,
}

impl EspInfo {
    pub const PARAM_TYPE: u16 = param_type::ESP_INFO;

    pub fn to_tlv(&self) -> Tlv {
        let mut body = Vec::with_capacity(12);
        body.extend_from_slice(&[0u8; 2]); // reserved
        body.extend_from_slice(&self.keymat_index.to_be_bytes());
        body.extend_from_slice(&self.old_spi.to_be_bytes());
        body.extend_from_slice(&self.new_spi.to_be_bytes());
        Tlv::new(Self::PARAM_TYPE, body)
    }

    pub fn from_contents(contents: &[u8]) -> Result<Self, WireError> {
        need(contents, 12, Self::PARAM_TYPE)?;
        Ok(EspInfo {
            keymat_index: u16::from_be_bytes([contents[2], contents[3]]),
            old_spi: u32::from_be_bytes(contents[4..8].try_into().unwrap()),
            new_spi: u32::from_be_bytes(contents[8..12].try_into().unwrap()),
        })
    }
}

/// PUZZLE: the R1 puzzle challenge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Puzzle {
    pub k: u8,
    pub lifetime: u8,
    pub opaque: u16,
    pub i: u64,
}

impl Puzzle {
    pub const PARAM_TYPE: u16 = param_type::PUZZLE;

    pub fn to_tlv(&self) -> Tlv {
        let mut body = Vec::with_capacity(12);
        body.push(self.k);
        body.push(self.lifetime);
        body.extend_from_slice(&self.opaque.to_be_bytes());
        body.extend_from_slice(&self.i.to_be_bytes());
        Tlv::new(Self::PARAM_TYPE, body)
    }

    pub fn from_contents(contents: &[u8]) -> Result<Self, WireError> {
        need(contents, 12, Self::PARAM_TYPE)?;
        Ok(Puzzle {
            k: contents[0],
            lifetime: contents[1],
            opaque: u16::from_be_bytes([contents[2], contents[3]]),
            i: u64::from_be_bytes(contents[4..12].try_into().unwrap()),
        })
    }
}

/// SOLUTION: the initiator's puzzle answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    pub k: u8,
    pub opaque: u16,
    pub i: u64,
    pub j: u64,
}

impl Solution {
    pub const PARAM_TYPE: u16 = param_type::SOLUTION;

    pub fn to_tlv(&self) -> Tlv {
        let mut body = Vec::with_capacity(20);
        body.push(self.k);
        body.push(0); // reserved
        body.extend_from_slice(&self.opaque.to_be_bytes());
        body.extend_from_slice(&self.i.to_be_bytes());
        body.extend_from_slice(&self.j.to_be_bytes());
        Tlv::new(Self::PARAM_TYPE, body)
    }

    pub fn from_contents(contents: &[u8]) -> Result<Self, WireError> {
        need(contents, 20, Self::PARAM_TYPE)?;
        Ok(Solution {
            k: contents[0],
            opaque: u16::from_be_bytes([contents[2], contents[3]]),
            i: u64::from_be_bytes(contents[4..12].try_into().unwrap()),
            j: u64::from_be_bytes(contents[12..20].try_into().unwrap()),
        })
    }
}

/// DIFFIE_HELLMAN: the group id plus the sender's public value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffieHellman {
    pub group_id: u8,
    pub public_value: Vec<u8>,
}

impl DiffieHellman {
    pub const PARAM_TYPE: u16 = param_type::DIFFIE_HELLMAN;

    pub fn to_tlv(&self) -> Tlv {
        let mut body = Vec::with_capacity(3 + self.public_value.len());
        body.push(self.group_id);
        body.extend_from_slice(&(self.public_value.len() as u16).to_be_bytes());
        body.extend_from_slice(&self.public_value);
        Tlv::new(Self::PARAM_TYPE, body)
    }

    pub fn from_contents(contents: &[u8]) -> Result<Self, WireError> {
        need(contents, 3, Self::PARAM_TYPE)?;
        let pub_len = u16::from_be_bytes([contents[1], contents[2]]) as usize;
        need(contents, 3 + pub_len, Self::PARAM_TYPE)?;
        Ok(DiffieHellman {
            group_id: contents[0],
            public_value: contents[3..3 + pub_len].to_vec(),
        })
    }
}

/// HIP_TRANSFORM / ESP_TRANSFORM: an ordered list of suite ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformList {
    param_type: u16,
    pub suite_ids: Vec<u16>,
}

impl TransformList {
    pub fn hip(suite_ids: Vec<u16>) -> Self {
        TransformList {
            param_type: param_type::HIP_TRANSFORM,
            suite_ids,
        }
    }

    pub fn esp(suite_ids: Vec<u16>) -> Self {
        TransformList {
            param_type: param_type::ESP_TRANSFORM,
            suite_ids,
        }
    }

    pub fn to_tlv(&self) -> Tlv {
        let mut body = Vec::with_capacity(self.suite_ids.len() * 2);
        for id in &self.suite_ids {
            body.extend_from_slice(&id.to_be_bytes());
        }
        Tlv::new(self.param_type, body)
    }

    pub fn from_contents(param_type: u16, contents: &[u8]) -> Result<Self, WireError> {
        if contents.len() % 2 != 0 {
            return Err(WireError::MalformedParameter(param_type, contents.len()));
        }
        let suite_ids = contents
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        Ok(TransformList { param_type, suite_ids })
    }
}

/// ENCRYPTED: reserved(4) + IV + ciphertext. IV length is transform
/// dependent (0 for NULL); callers pass it in explicitly since the TLV
/// itself carries no length-of-IV field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encrypted {
    pub iv: Vec<u8>,
    pub ciphertext: Vec<u8>,
}

impl Encrypted {
    pub const PARAM_TYPE: u16 = param_type::ENCRYPTED;

    pub fn to_tlv(&self) -> Tlv {
        let mut body = Vec::with_capacity(4 + self.iv.len() + self.ciphertext.len());
        body.extend_from_slice(&[0u8; 4]);
        body.extend_from_slice(&self.iv);
        body.extend_from_slice(&self.ciphertext);
        Tlv::new(Self::PARAM_TYPE, body)
    }

    pub fn from_contents(contents: &[u8], iv_len: usize) -> Result<Self, WireError> {
        need(contents, 4 + iv_len, Self::PARAM_TYPE)?;
        Ok(Encrypted {
            iv: contents[4..4 + iv_len].to_vec(),
            ciphertext: contents[4 + iv_len..].to_vec(),
        })
    }
}

/// HOST_ID public key algorithm id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HiAlgo {
    Dsa,
    Rsa,
    EcdsaP256,
    EcdsaP384,
}

impl HiAlgo {
    fn to_u16(self) -> u16 {
        match self {
            HiAlgo::Dsa => 3,
            HiAlgo::Rsa => 5,
            HiAlgo::EcdsaP256 => 7,
            HiAlgo::EcdsaP384 => 9,
        }
    }

    fn from_u16(v: u16) -> Option<Self> {
        Some(match v {
            3 => HiAlgo::Dsa,
            5 => HiAlgo::Rsa,
            7 => HiAlgo::EcdsaP256,
            9 => HiAlgo::EcdsaP384,
            _ => return None,
        })
    }
}

/// HOST_ID: the canonical "DNS-key-RR-like" host identity, plus an
/// optional hostname.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostId {
    pub algo: HiAlgo,
    pub key_bytes: Vec<u8>,
    pub hostname: Option<String>,
}

impl HostId {
    pub const PARAM_TYPE: u16 = param_type::HOST_ID;
    const DI_TYPE_FQDN: u8 = 1;
    const DI_TYPE_NONE: u8 = 0;

    /// Canonical byte form whose SHA-1 truncated to 96 bits becomes the
    /// HIT: hi_length || di_type_length || algo ||
    /// key_bytes || hostname, i.e. the TLV contents without the 4-byte
    /// TLV header.
    pub fn to_tlv(&self) -> Tlv {
        Tlv::new(Self::PARAM_TYPE, self.canonical_bytes())
    }

    pub fn canonical_bytes(&self) -> Vec<u8> {
        let hostname_bytes = self.hostname.as_deref().unwrap_or("").as_bytes();
        let di_type = if self.hostname.is_some() {
            Self::DI_TYPE_FQDN
        } else {
            Self::DI_TYPE_NONE
        };
        let di_type_length: u16 = ((di_type as u16) << 12) | (hostname_bytes.len() as u16 & 0x0FFF);

        let mut body = Vec::with_capacity(4 + self.key_bytes.len() + hostname_bytes.len());
        body.extend_from_slice(&(self.key_bytes.len() as u16).to_be_bytes());
        body.extend_from_slice(&di_type_length.to_be_bytes());
        body.extend_from_slice(&self.algo.to_u16().to_be_bytes());
        body.extend_from_slice(&self.key_bytes);
        body.extend_from_slice(hostname_bytes);
        body
    }

    pub fn from_contents(contents: &[u8]) -> Result<Self, WireError> {
        need(contents, 6, Self::PARAM_TYPE)?;
        let hi_length = u16::from_be_bytes([contents[0], contents[1]]) as usize;
        let di_type_length = u16::from_be_bytes([contents[2], contents[3]]);
        let hostname_len = (di_type_length & 0x0FFF) as usize;
        let has_hostname = (di_type_length >> 12) as u8 == Self::DI_TYPE_FQDN;
        let algo = HiAlgo::from_u16(u16::from_be_bytes([contents[4], contents[5]]))
            .ok_or(WireError::MalformedParameter(Self::PARAM_TYPE, contents.len()))?;
        need(contents, 6 + hi_length + hostname_len, Self::PARAM_TYPE)?;
        let key_bytes = contents[6..6 + hi_length].to_vec();
        let hostname = if has_hostname && hostname_len > 0 {
            let bytes = &contents[6 + hi_length..6 + hi_length + hostname_len];
            Some(String::from_utf8_lossy(bytes).into_owned())
        } else {
            None
        };
        Ok(HostId {
            algo,
            key_bytes,
            hostname,
        })
    }
}

/// HMAC / HMAC2: a truncated-SHA1 MAC over header+params.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HmacParam {
    param_type: u16,
    pub digest: Vec<u8>,
}

impl HmacParam {
    pub fn hmac(digest: Vec<u8>) -> Self {
        HmacParam {
            param_type: param_type::HMAC,
            digest,
        }
    }

    pub fn hmac2(digest: Vec<u8>) -> Self {
        HmacParam {
            param_type: param_type::HMAC2,
            digest,
        }
    }

    pub fn to_tlv(&self) -> Tlv {
        Tlv::new(self.param_type, self.digest.clone())
    }

    pub fn from_contents(param_type: u16, contents: &[u8]) -> Self {
        HmacParam {
            param_type,
            digest: contents.to_vec(),
        }
    }
}

/// SIGNATURE / SIGNATURE2: algorithm id plus signature bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureParam {
    param_type: u16,
    pub algo: u8,
    pub signature: Vec<u8>,
}

impl SignatureParam {
    pub fn signature(algo: u8, signature: Vec<u8>) -> Self {
        SignatureParam {
            param_type: param_type::SIGNATURE,
            algo,
            signature,
        }
    }

    pub fn signature2(algo: u8, signature: Vec<u8>) -> Self {
        SignatureParam {
            param_type: param_type::SIGNATURE2,
            algo,
            signature,
        }
    }

    pub fn to_tlv(&self) -> Tlv {
        let mut body = Vec::with_capacity(2 + self.signature.len());
        body.extend_from_slice(&(self.algo as u16).to_be_bytes());
        body.extend_from_slice(&self.signature);
        Tlv::new(self.param_type, body)
    }

    pub fn from_contents(param_type: u16, contents: &[u8]) -> Result<Self, WireError> {
        need(contents, 2, param_type)?;
        Ok(SignatureParam {
            param_type,
            algo: contents[1],
            signature: contents[2..].to_vec(),
        })
    }
}

/// ESP_PROT_TRANSFORMS: the offered/selected ESP-protection suite ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EspProtTransforms {
    pub suite_ids: Vec<u8>,
}

impl EspProtTransforms {
    pub const PARAM_TYPE: u16 = param_type::ESP_PROT_TRANSFORMS;

    pub fn to_tlv(&self) -> Tlv {
        Tlv::new(Self::PARAM_TYPE, self.suite_ids.clone())
    }

    pub fn from_contents(contents: &[u8]) -> Self {
        EspProtTransforms {
            suite_ids: contents.to_vec(),
        }
    }
}

/// ESP_PROT_ANCHOR: transform id, hash_item_length, then concatenated
/// active[..][next[..]] anchor values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EspProtAnchor {
    pub transform: u8,
    pub hash_item_length: u8,
    pub active: Vec<u8>,
    pub next: Vec<u8>,
}

impl EspProtAnchor {
    pub const PARAM_TYPE: u16 = param_type::ESP_PROT_ANCHOR;

    pub fn to_tlv(&self) -> Tlv {
        let mut body = Vec::with_capacity(2 + self.active.len() + self.next.len());
        body.push(self.transform);
        body.push(self.hash_item_length);
        body.extend_from_slice(&self.active);
        body.extend_from_slice(&self.next);
        Tlv::new(Self::PARAM_TYPE, body)
    }

    pub fn from_contents(contents: &[u8]) -> Result<Self, WireError> {
        need(contents, 2, Self::PARAM_TYPE)?;
        let item_len = contents[1] as usize;
        need(contents, 2 + item_len, Self::PARAM_TYPE)?;
        let active = contents[2..2 + item_len].to_vec();
        let next = contents[2 + item_len..].to_vec();
        Ok(EspProtAnchor {
            transform: contents[0],
            hash_item_length: contents[1],
            active,
            next,
        })
    }
}
