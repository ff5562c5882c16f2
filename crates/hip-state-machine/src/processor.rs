//! Ties the decision logic in this crate to the HADB, local host
//! identities, the puzzle cache, and the SA manager: the pieces that turn
//! "here is an I2" into a derived key set, installed SAs, and a signed R2.

use std::net::IpAddr;
use std::time::Instant;

use hip_crypto::dh::SharedSecret;
use hip_crypto::hash::{constant_time_eq, hmac_sha1};
use hip_crypto::keymat::{draw_all, KeymatSlot, KeymatStream};
use hip_crypto::sign::{HostKeyPair, HostPublicKey, SignatureAlgorithm};
use hip_crypto::symmetric::SymmetricTransform;
use hip_hadb::Hadb;
use hip_puzzle::{PuzzleCache, PuzzleVerifyError};
use hip_sa::{Direction, SaEntry, SaManager};
use hip_types::{HipState, Hit};
use hip_wire::header::{HipHeader, PacketType};
use hip_wire::params::{EspInfo, HiAlgo, HmacParam, HostId, SignatureParam, TransformList};
use hip_wire::serialize::serialize;
use hip_wire::{param_type, Message};
use rand::RngCore;

use crate::collision::{resolve_i2_collision, CollisionAction};
use crate::errors::ControlPlaneError;
use crate::outcome::{priority, HandlerOutcome, HandlerStep, Phase};

/// Handle an incoming I1: the responder doesn't create a host association
/// yet (no state is committed until I2 proves the initiator owns its
/// claimed address), it only hands back a puzzle challenge.
pub fn handle_i1(puzzle_cache: &mut PuzzleCache, now: Instant) -> (u64, u8) {
    puzzle_cache.generate(now)
}

/// The responder's own identity and offered transforms, carried into I2
/// processing so the Send phase can build and sign an R2.
pub struct LocalIdentity {
    pub keypair: HostKeyPair,
    pub host_id: HostId,
    pub hip_transforms: Vec<u16>,
    pub esp_transforms: Vec<u16>,
}

/// Outcome of processing an incoming I2.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum I2Outcome {
    /// A new association was created (or yielded to after losing an I2/I2
    /// collision as initiator), moved to R2_SENT, and a signed R2 was
    /// built in response.
    Accepted(HipState, Vec<u8>),
    /// This I2 lost an I2/I2 collision against an association this host
    /// already has in I2_SENT as initiator; dropped.
    LostCollision,
    /// A retransmission of an I2 already fully processed past R2_SENT;
    /// the existing state is returned unchanged rather than reprocessed.
    DuplicateRetransmission(HipState),
}

/// Context threaded through the I2 handler chain: the parsed message, the
/// association being created or taken over, and the crypto material later
/// steps derive from earlier ones.
struct I2Context<'a> {
    message: &'a Message,
    local_identity: &'a LocalIdentity,
    puzzle_cache: &'a PuzzleCache,
    sa_manager: &'a mut SaManager,
    ha: &'a mut hip_hadb::HostAssociation,
    local_addr: IpAddr,
    peer_addr: IpAddr,
    solution_i: u64,
    solution_j: u64,
    hip_transform: Option<SymmetricTransform>,
    esp_transform: Option<SymmetricTransform>,
    shared_secret: Option<SharedSecret>,
    keys: Option<[Vec<u8>; 8]>,
    response: Option<Vec<u8>>,
}

fn key(keys: &[Vec<u8>; 8], slot: KeymatSlot) -> &[u8] {
    let idx = KeymatSlot::ORDER.iter().position(|s| *s == slot).expect("slot present in draw order");
    &keys[idx]
}

fn signature_algorithm_for(algo: HiAlgo) -> SignatureAlgorithm {
    match algo {
        HiAlgo::Dsa => SignatureAlgorithm::Dsa,
        HiAlgo::Rsa => SignatureAlgorithm::Rsa,
        HiAlgo::EcdsaP256 => SignatureAlgorithm::EcdsaP256,
        HiAlgo::EcdsaP384 => SignatureAlgorithm::EcdsaP384,
    }
}

/// Strip the given TLVs (by param type) out of a copy of `message` and
/// reserialize — used to recompute the exact bytes an HMAC or signature
/// was taken over.
fn serialize_without(message: &Message, excluded: &[u16]) -> Vec<u8> {
    let mut copy = message.clone();
    copy.params.retain(|t| !excluded.contains(&t.param_type));
    serialize(&copy)
}

/// Check phase: the puzzle solution must match a live challenge this host
/// actually issued.
struct VerifyPuzzleSolution;

impl HandlerStep<I2Context<'_>> for VerifyPuzzleSolution {
    fn phase(&self) -> Phase {
        Phase::Check
    }
    fn priority(&self) -> u32 {
        priority::CHECK_BAND
    }
    fn run(&self, ctx: &mut I2Context<'_>) -> Result<HandlerOutcome, ControlPlaneError> {
        ctx.puzzle_cache
            .verify(ctx.ha.peer_hit, ctx.solution_i, ctx.solution_j, Instant::now())
            .map_err(|err| match err {
                PuzzleVerifyError::UnknownOrExpired => ControlPlaneError::ReplayWindow,
                PuzzleVerifyError::WrongSolution => ControlPlaneError::AuthFailed,
            })?;
        Ok(HandlerOutcome::Continue)
    }
}

/// Check phase: DH shared secret, then the eight KEYMAT keys, derived
/// before anything can be authenticated.
struct DeriveSharedMaterial;

impl HandlerStep<I2Context<'_>> for DeriveSharedMaterial {
    fn phase(&self) -> Phase {
        Phase::Check
    }
    fn priority(&self) -> u32 {
        priority::CHECK_BAND + 10
    }
    fn run(&self, ctx: &mut I2Context<'_>) -> Result<HandlerOutcome, ControlPlaneError> {
        let dh_param = ctx
            .message
            .diffie_hellman()
            .map_err(|_| ControlPlaneError::Malformed)?
            .ok_or(ControlPlaneError::Malformed)?;
        let hip_transform_list = ctx
            .message
            .hip_transform()
            .map_err(|_| ControlPlaneError::Malformed)?
            .ok_or(ControlPlaneError::Malformed)?;
        let esp_transform_list = ctx
            .message
            .esp_transform()
            .map_err(|_| ControlPlaneError::Malformed)?
            .ok_or(ControlPlaneError::Malformed)?;
        let hip_suite = *hip_transform_list.suite_ids.first().ok_or(ControlPlaneError::Malformed)?;
        let esp_suite = *esp_transform_list.suite_ids.first().ok_or(ControlPlaneError::Malformed)?;
        let hip_transform =
            SymmetricTransform::from_transform_id(hip_suite).ok_or(ControlPlaneError::UnsupportedCritical)?;
        let esp_transform =
            SymmetricTransform::from_transform_id(esp_suite).ok_or(ControlPlaneError::UnsupportedCritical)?;

        let our_dh = ctx.puzzle_cache.dh_for(ctx.solution_i).ok_or(ControlPlaneError::ReplayWindow)?;
        let shared = our_dh
            .compute_shared(&dh_param.public_value)
            .map_err(|_| ControlPlaneError::AuthFailed)?;

        let (first, second) = if ctx.ha.local_hit < ctx.ha.peer_hit {
            (ctx.ha.local_hit, ctx.ha.peer_hit)
        } else {
            (ctx.ha.peer_hit, ctx.ha.local_hit)
        };
        let mut sorted_hits = Vec::with_capacity(32);
        sorted_hits.extend_from_slice(first.as_bytes());
        sorted_hits.extend_from_slice(second.as_bytes());

        let mut stream = KeymatStream::new(
            shared.as_bytes(),
            &sorted_hits,
            &ctx.solution_i.to_be_bytes(),
            &ctx.solution_j.to_be_bytes(),
        );
        let keys = draw_all(&mut stream, hip_transform.key_len(), hip_transform.mac_key_len());

        ctx.hip_transform = Some(hip_transform);
        ctx.esp_transform = Some(esp_transform);
        ctx.shared_secret = Some(shared);
        ctx.keys = Some(keys);
        Ok(HandlerOutcome::Continue)
    }
}

/// Check phase: the HMAC over the packet, keyed on the initiator-to-
/// responder control-plane auth key.
struct VerifyHmac;

impl HandlerStep<I2Context<'_>> for VerifyHmac {
    fn phase(&self) -> Phase {
        Phase::Check
    }
    fn priority(&self) -> u32 {
        priority::CHECK_BAND + 20
    }
    fn run(&self, ctx: &mut I2Context<'_>) -> Result<HandlerOutcome, ControlPlaneError> {
        let hmac_param = ctx.message.hmac().ok_or(ControlPlaneError::Malformed)?;
        let keys = ctx.keys.as_ref().expect("keys derived before HMAC is checked");
        let auth_key = key(keys, KeymatSlot::HipAuthIR);
        let input = serialize_without(ctx.message, &[param_type::HMAC, param_type::SIGNATURE]);
        let expected = hmac_sha1(auth_key, &input, hmac_param.digest.len());
        if !constant_time_eq(&expected, &hmac_param.digest) {
            return Err(ControlPlaneError::AuthFailed);
        }
        Ok(HandlerOutcome::Continue)
    }
}

/// Check phase: the HOST_ID signature, verified against the peer's own
/// claimed public key.
struct VerifySignature;

impl HandlerStep<I2Context<'_>> for VerifySignature {
    fn phase(&self) -> Phase {
        Phase::Check
    }
    fn priority(&self) -> u32 {
        priority::CHECK_BAND + 30
    }
    fn run(&self, ctx: &mut I2Context<'_>) -> Result<HandlerOutcome, ControlPlaneError> {
        let sig_param = ctx
            .message
            .signature()
            .map_err(|_| ControlPlaneError::Malformed)?
            .ok_or(ControlPlaneError::Malformed)?;
        let peer_host_id = ctx
            .message
            .host_id()
            .map_err(|_| ControlPlaneError::Malformed)?
            .ok_or(ControlPlaneError::Malformed)?;
        let peer_key = HostPublicKey::from_host_id(signature_algorithm_for(peer_host_id.algo), &peer_host_id.key_bytes)
            .map_err(|_| ControlPlaneError::AuthFailed)?;
        let input = serialize_without(ctx.message, &[param_type::SIGNATURE]);
        peer_key
            .verify(&input, &sig_param.signature)
            .map_err(|_| ControlPlaneError::AuthFailed)?;
        Ok(HandlerOutcome::Continue)
    }
}

/// Handle phase: commit the derived keys, transforms, and shared secret
/// onto the association and move it to R2_SENT.
struct CommitKeysAndState;

impl HandlerStep<I2Context<'_>> for CommitKeysAndState {
    fn phase(&self) -> Phase {
        Phase::Handle
    }
    fn priority(&self) -> u32 {
        priority::HANDLE_BAND
    }
    fn run(&self, ctx: &mut I2Context<'_>) -> Result<HandlerOutcome, ControlPlaneError> {
        let keys = ctx.keys.as_ref().expect("keys derived during Check");
        ctx.ha.keys.hip_encrypt_ir = key(keys, KeymatSlot::HipEncryptIR).to_vec();
        ctx.ha.keys.hip_auth_ir = key(keys, KeymatSlot::HipAuthIR).to_vec();
        ctx.ha.keys.hip_encrypt_ri = key(keys, KeymatSlot::HipEncryptRI).to_vec();
        ctx.ha.keys.hip_auth_ri = key(keys, KeymatSlot::HipAuthRI).to_vec();
        ctx.ha.keys.esp_encrypt_ir = key(keys, KeymatSlot::EspEncryptIR).to_vec();
        ctx.ha.keys.esp_auth_ir = key(keys, KeymatSlot::EspAuthIR).to_vec();
        ctx.ha.keys.esp_encrypt_ri = key(keys, KeymatSlot::EspEncryptRI).to_vec();
        ctx.ha.keys.esp_auth_ri = key(keys, KeymatSlot::EspAuthRI).to_vec();

        ctx.ha.dh_shared_secret = ctx.shared_secret.take();
        ctx.ha.hip_transform = ctx.hip_transform.map(|t| t.transform_id());
        ctx.ha.esp_transform = ctx.esp_transform.map(|t| t.transform_id());
        ctx.ha.peer_ip = Some(ctx.peer_addr);
        ctx.ha.local_ip = Some(ctx.local_addr);
        ctx.ha.birthday += 1;
        ctx.ha.state = HipState::R2Sent;
        Ok(HandlerOutcome::Continue)
    }
}

/// Handle phase: install the inbound SA (traffic from the initiator to us)
/// under a freshly allocated SPI.
struct InstallInboundSa;

impl HandlerStep<I2Context<'_>> for InstallInboundSa {
    fn phase(&self) -> Phase {
        Phase::Handle
    }
    fn priority(&self) -> u32 {
        priority::HANDLE_BAND + 10
    }
    fn run(&self, ctx: &mut I2Context<'_>) -> Result<HandlerOutcome, ControlPlaneError> {
        let esp_transform = ctx.esp_transform.expect("esp transform negotiated during Check");
        let spi = rand::thread_rng().next_u32();
        let sa = SaEntry::new(
            spi,
            Direction::Inbound,
            esp_transform,
            ctx.ha.keys.esp_encrypt_ir.clone(),
            ctx.ha.keys.esp_auth_ir.clone(),
            ctx.ha.local_hit,
            ctx.ha.peer_hit,
            ctx.local_addr,
            ctx.peer_addr,
        );
        ctx.sa_manager.add_sa(sa).map_err(|_| ControlPlaneError::ResourceExhausted)?;
        ctx.ha.inbound_spi.current = spi;
        Ok(HandlerOutcome::Continue)
    }
}

/// Handle phase: install the outbound SA (traffic from us to the
/// initiator) under the SPI the initiator proposed in its ESP_INFO.
struct InstallOutboundSa;

impl HandlerStep<I2Context<'_>> for InstallOutboundSa {
    fn phase(&self) -> Phase {
        Phase::Handle
    }
    fn priority(&self) -> u32 {
        priority::HANDLE_BAND + 20
    }
    fn run(&self, ctx: &mut I2Context<'_>) -> Result<HandlerOutcome, ControlPlaneError> {
        let esp_transform = ctx.esp_transform.expect("esp transform negotiated during Check");
        let esp_info = ctx
            .message
            .esp_info()
            .map_err(|_| ControlPlaneError::Malformed)?
            .ok_or(ControlPlaneError::Malformed)?;
        let sa = SaEntry::new(
            esp_info.new_spi,
            Direction::Outbound,
            esp_transform,
            ctx.ha.keys.esp_encrypt_ri.clone(),
            ctx.ha.keys.esp_auth_ri.clone(),
            ctx.ha.local_hit,
            ctx.ha.peer_hit,
            ctx.local_addr,
            ctx.peer_addr,
        );
        ctx.sa_manager.add_sa(sa).map_err(|_| ControlPlaneError::ResourceExhausted)?;
        ctx.ha.outbound_spi.current = esp_info.new_spi;
        Ok(HandlerOutcome::Continue)
    }
}

/// Send phase: build R2 (ESP_INFO, HIP_TRANSFORM, ESP_TRANSFORM, HMAC2,
/// SIGNATURE2) and serialize it.
struct BuildAndSignR2;

impl HandlerStep<I2Context<'_>> for BuildAndSignR2 {
    fn phase(&self) -> Phase {
        Phase::Send
    }
    fn priority(&self) -> u32 {
        priority::SEND_BAND
    }
    fn run(&self, ctx: &mut I2Context<'_>) -> Result<HandlerOutcome, ControlPlaneError> {
        let header = HipHeader {
            next_header: 0,
            header_length: 0,
            packet_type: PacketType::R2,
            version: 1,
            checksum: 0,
            controls: 0,
            sender_hit: ctx.ha.local_hit,
            receiver_hit: ctx.ha.peer_hit,
        };
        let mut message = Message::new(header);
        message.push(
            EspInfo {
                old_spi: 0,
                new_spi: ctx.ha.inbound_spi.current,
                keymat_index: 0,
            }
            .to_tlv(),
        );
        message.push(TransformList::hip(ctx.local_identity.hip_transforms.clone()).to_tlv());
        message.push(TransformList::esp(ctx.local_identity.esp_transforms.clone()).to_tlv());

        let keys = ctx.keys.as_ref().expect("keys derived during Check");
        let hmac2_input = serialize(&{
            let mut pseudo = message.clone();
            pseudo.push(ctx.local_identity.host_id.to_tlv());
            pseudo
        });
        let hmac2 = hmac_sha1(key(keys, KeymatSlot::HipAuthRI), &hmac2_input, 20);
        message.push(HmacParam::hmac2(hmac2).to_tlv());

        let sig_input = serialize(&message);
        let signature = ctx
            .local_identity
            .keypair
            .sign(&sig_input)
            .map_err(|_| ControlPlaneError::Fatal)?;
        message.push(SignatureParam::signature2(ctx.local_identity.keypair.algorithm().algo_id(), signature).to_tlv());

        ctx.response = Some(serialize(&message));
        Ok(HandlerOutcome::Continue)
    }
}

fn i2_chain<'a>() -> Vec<Box<dyn HandlerStep<I2Context<'a>>>> {
    vec![
        Box::new(VerifyPuzzleSolution),
        Box::new(DeriveSharedMaterial),
        Box::new(VerifyHmac),
        Box::new(VerifySignature),
        Box::new(CommitKeysAndState),
        Box::new(InstallInboundSa),
        Box::new(InstallOutboundSa),
        Box::new(BuildAndSignR2),
    ]
}

/// Process an incoming I2 for `(local_hit, peer_hit)`: verify its puzzle
/// solution, apply the I2/I2 collision rule if a local exchange is already
/// in flight, then — for a fresh or yielded-to association — derive
/// KEYMAT, verify HMAC and signature, install both SAs, and build a
/// signed R2.
#[allow(clippy::too_many_arguments)]
pub fn handle_i2(
    hadb: &mut Hadb,
    puzzle_cache: &PuzzleCache,
    sa_manager: &mut SaManager,
    local_identity: &LocalIdentity,
    message: &Message,
    local_hit: Hit,
    peer_hit: Hit,
    local_addr: IpAddr,
    peer_addr: IpAddr,
) -> Result<I2Outcome, ControlPlaneError> {
    let solution = message
        .solution()
        .map_err(|_| ControlPlaneError::Malformed)?
        .ok_or(ControlPlaneError::Malformed)?;

    if let Some(existing) = hadb.find_by_hits(local_hit, peer_hit) {
        match existing.state {
            HipState::I2Sent => match resolve_i2_collision(&local_hit, &peer_hit) {
                CollisionAction::KeepExisting => return Ok(I2Outcome::LostCollision),
                CollisionAction::YieldToIncoming => {}
            },
            other => return Ok(I2Outcome::DuplicateRetransmission(other)),
        }
    } else {
        hadb.create(local_hit, peer_hit).map_err(|_| ControlPlaneError::ResourceExhausted)?;
    }

    let ha = hadb.find_by_hits_mut(local_hit, peer_hit).expect("just created or yielded to above");

    let mut ctx = I2Context {
        message,
        local_identity,
        puzzle_cache,
        sa_manager,
        ha,
        local_addr,
        peer_addr,
        solution_i: solution.i,
        solution_j: solution.j,
        hip_transform: None,
        esp_transform: None,
        shared_secret: None,
        keys: None,
        response: None,
    };

    let steps = i2_chain();
    let outcome = crate::outcome::run_chain(&steps, &mut ctx)?;

    match outcome {
        HandlerOutcome::Continue => {
            let state = ctx.ha.state;
            let response = ctx.response.take().expect("Send phase always builds a response on success");
            Ok(I2Outcome::Accepted(state, response))
        }
        HandlerOutcome::Abort | HandlerOutcome::Cancel => Err(ControlPlaneError::AuthFailed),
    }
}
