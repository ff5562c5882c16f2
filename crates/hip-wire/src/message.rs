//! A parsed HIP control message: fixed header plus an ordered TLV list,
//! with typed getters over the TLVs the core cares about.

use crate::errors::WireError;
use crate::header::HipHeader;
use crate::params::{
    DiffieHellman, Encrypted, EspInfo, EspProtAnchor, EspProtTransforms, HmacParam, HostId,
    Puzzle, SignatureParam, Solution, TransformList,
};
use crate::tlv::{param_type, Tlv};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub header: HipHeader,
    /// Kept in ascending type order, as required for serialization and
    /// produced by `parse`.
    pub params: Vec<Tlv>,
}

impl Message {
    pub fn new(header: HipHeader) -> Self {
        Message {
            header,
            params: Vec::new(),
        }
    }

    /// Insert a TLV, keeping `params` sorted by ascending type (stable with
    /// respect to ties, matching multi-valued parameters like repeated
    /// NOTIFICATION TLVs).
    pub fn push(&mut self, tlv: Tlv) {
        let pos = self
            .params
            .iter()
            .position(|existing| existing.param_type > tlv.param_type)
            .unwrap_or(self.params.len());
        self.params.insert(pos, tlv);
    }

    pub fn find(&self, param_type: u16) -> Option<&Tlv> {
        self.params.iter().find(|t| t.param_type == param_type)
    }

    pub fn find_all(&self, param_type: u16) -> Vec<&Tlv> {
        self.params.iter().filter(|t| t.param_type == param_type).collect()
    }

    pub fn diffie_hellman(&self) -> Result<Option<DiffieHellman>, WireError> {
        self.find(param_type::DIFFIE_HELLMAN)
            .map(|t| DiffieHellman::from_contents(&t.contents))
            .transpose()
    }

    pub fn puzzle(&self) -> Result<Option<Puzzle>, WireError> {
        self.find(param_type::PUZZLE)
            .map(|t| Puzzle::from_contents(&t.contents))
            .transpose()
    }

    pub fn solution(&self) -> Result<Option<Solution>, WireError> {
        self.find(param_type::SOLUTION)
            .map(|t| Solution::from_contents(&t.contents))
            .transpose()
    }

    pub fn hip_transform(&self) -> Result<Option<TransformList>, WireError> {
        self.find(param_type::HIP_TRANSFORM)
            .map(|t| TransformList::from_contents(t.param_type, &t.contents))
            .transpose()
    }

    pub fn esp_transform(&self) -> Result<Option<TransformList>, WireError> {
        self.find(param_type::ESP_TRANSFORM)
            .map(|t| TransformList::from_contents(t.param_type, &t.contents))
            .transpose()
    }

    pub fn esp_info(&self) -> Result<Option<EspInfo>, WireError> {
        self.find(param_type::ESP_INFO)
            .map(|t| EspInfo::from_contents(&t.contents))
            .transpose()
    }

    pub fn encrypted(&self, iv_len: usize) -> Result<Option<Encrypted>, WireError> {
        self.find(param_type::ENCRYPTED)
            .map(|t| Encrypted::from_contents(&t.contents, iv_len))
            .transpose()
    }

    pub fn host_id(&self) -> Result<Option<HostId>, WireError> {
        self.find(param_type::HOST_ID)
            .map(|t| HostId::from_contents(&t.contents))
            .transpose()
    }

    pub fn hmac(&self) -> Option<HmacParam> {
        self.find(param_type::HMAC)
            .map(|t| HmacParam::from_contents(t.param_type, &t.contents))
    }

    pub fn hmac2(&self) -> Option<HmacParam> {
        self.find(param_type::HMAC2)
            .map(|t| HmacParam::from_contents(t.param_type, &t.contents))
    }

    pub fn signature(&self) -> Result<Option<SignatureParam>, WireError> {
        self.find(param_type::SIGNATURE)
            .map(|t| SignatureParam::from_contents(t.param_type, &t.contents))
            .transpose()
    }

    pub fn signature2(&self) -> Result<Option<SignatureParam>, WireError> {
        self.find(param_type::SIGNATURE2)
            .map(|t| SignatureParam::from_contents(t.param_type, &t.contents))
            .transpose()
    }

    pub fn esp_prot_transforms(&self) -> Option<EspProtTransforms> {
        self.find(param_type::ESP_PROT_TRANSFORMS)
            .map(|t| EspProtTransforms::from_contents(&t.contents))
    }

    pub fn esp_prot_anchor(&self) -> Result<Option<EspProtAnchor>, WireError> {
        self.find(param_type::ESP_PROT_ANCHOR)
            .map(|t| EspProtAnchor::from_contents(&t.contents))
            .transpose()
    }

    /// True if any TLV in this message has an unrecognized type AND is
    /// critical.
    pub fn has_unsupported_critical(&self) -> Option<u16> {
        self.params
            .iter()
            .find(|t| !param_type::is_known(t.param_type) && t.is_critical())
            .map(|t| t.param_type)
    }
}
