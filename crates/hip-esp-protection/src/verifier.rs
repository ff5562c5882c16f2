//! Per-direction verification state for one ESP SA's protection tokens.
//!
//! All variants share the same window discipline: a disclosed token for
//! sequence number `seq` is only accepted if `0 < seq - last_seen <=
//! window_size`, bounding how much forward-hashing a single verification
//! has to do and how much loss the receiver tolerates before falling back
//! to an anchor update.

use std::collections::VecDeque;

use hip_crypto::hashchain::verify_link;
use hip_crypto::hashtree::verify_branch;

use crate::errors::EspProtectionError;
use crate::transform::{EspProtTransform, TransformConfig};

type Digest = [u8; 20];

struct ChainState {
    last_verified: Digest,
    last_seen_seq: u32,
}

pub enum PacketVerifier {
    Unused,
    Plain { state: ChainState, window_size: u32 },
    Parallel { chains: Vec<ChainState>, window_size: u32 },
    Cumulative { ring: VecDeque<(u32, Digest)>, capacity: usize, window_size: u32 },
    Tree { root: Digest, leaf_count: usize },
}

impl PacketVerifier {
    /// Start verification for a direction whose anchor was just installed
    /// (from the base exchange, or the most recent anchor update).
    pub fn new(config: &TransformConfig, anchor: Digest, start_seq: u32) -> Self {
        match config.transform {
            EspProtTransform::Unused => PacketVerifier::Unused,
            EspProtTransform::Plain => PacketVerifier::Plain {
                state: ChainState { last_verified: anchor, last_seen_seq: start_seq },
                window_size: config.window_size,
            },
            EspProtTransform::Parallel => {
                let chains = (0..config.num_hchains)
                    .map(|_| ChainState { last_verified: anchor, last_seen_seq: start_seq })
                    .collect();
                PacketVerifier::Parallel { chains, window_size: config.window_size }
            }
            // PARA_CUMUL verifies through a single cumulative ring;
            // `num_hchains` is unused in this state.
            EspProtTransform::Cumulative | EspProtTransform::ParaCumul => {
                let mut ring = VecDeque::with_capacity(config.ring_buffer_size.max(1) as usize);
                ring.push_back((start_seq, anchor));
                PacketVerifier::Cumulative {
                    ring,
                    capacity: config.ring_buffer_size.max(1) as usize,
                    window_size: config.window_size,
                }
            }
            EspProtTransform::Tree => PacketVerifier::Tree { root: anchor, leaf_count: config.tree_leaf_count },
        }
    }

    /// Verify a non-tree disclosed token for an incoming packet's sequence
    /// number, advancing the verifier's state on success.
    pub fn verify_token(&mut self, seq: u32, token: &Digest) -> Result<(), EspProtectionError> {
        match self {
            PacketVerifier::Unused => Err(EspProtectionError::TransformUnused),
            PacketVerifier::Plain { state, window_size } => verify_chain_state(state, *window_size, seq, token),
            PacketVerifier::Parallel { chains, window_size } => {
                let num_chains = chains.len() as u32;
                let idx = (seq % num_chains) as usize;
                let chain = &mut chains[idx];
                let hop_window = window_size.div_ceil(num_chains).max(1);
                verify_chain_state_with_step(chain, hop_window, num_chains, seq, token)
            }
            PacketVerifier::Cumulative { ring, capacity, window_size } => {
                let anchor_entry = ring
                    .iter()
                    .rev()
                    .find(|(s, _)| *s < seq)
                    .copied()
                    .ok_or(EspProtectionError::OutOfWindow { seq, last_seen: 0, window: *window_size })?;
                let w = seq - anchor_entry.0;
                if w == 0 || w > *window_size {
                    return Err(EspProtectionError::OutOfWindow { seq, last_seen: anchor_entry.0, window: *window_size });
                }
                if !verify_link(&anchor_entry.1, token, w) {
                    return Err(EspProtectionError::TokenMismatch);
                }
                if ring.len() >= *capacity {
                    ring.pop_front();
                }
                ring.push_back((seq, *token));
                Ok(())
            }
            PacketVerifier::Tree { .. } => Err(EspProtectionError::TransformUnused),
        }
    }

    /// Verify a disclosed tree leaf and branch for the TREE transform.
    pub fn verify_tree_leaf(
        &self,
        leaf: &[u8],
        index: usize,
        branch: &[Digest],
    ) -> Result<(), EspProtectionError> {
        match self {
            PacketVerifier::Tree { root, leaf_count } => {
                if index >= *leaf_count {
                    return Err(EspProtectionError::BranchMismatch);
                }
                if verify_branch(leaf, index, branch, root) {
                    Ok(())
                } else {
                    Err(EspProtectionError::BranchMismatch)
                }
            }
            _ => Err(EspProtectionError::TransformUnused),
        }
    }
}

fn verify_chain_state(state: &mut ChainState, window_size: u32, seq: u32, token: &Digest) -> Result<(), EspProtectionError> {
    verify_chain_state_with_step(state, window_size, 1, seq, token)
}

/// Shared core for PLAIN (`step` = 1) and per-chain PARALLEL (`step` =
/// number of parallel chains) verification: `hops` is the packet-sequence
/// distance divided by `step`, since only every `step`th sequence number
/// lands on this chain.
fn verify_chain_state_with_step(
    state: &mut ChainState,
    window_size: u32,
    step: u32,
    seq: u32,
    token: &Digest,
) -> Result<(), EspProtectionError> {
    if seq <= state.last_seen_seq {
        return Err(EspProtectionError::OutOfWindow { seq, last_seen: state.last_seen_seq, window: window_size });
    }
    let raw_diff = seq - state.last_seen_seq;
    if raw_diff > window_size * step.max(1) {
        return Err(EspProtectionError::OutOfWindow { seq, last_seen: state.last_seen_seq, window: window_size });
    }
    let hops = raw_diff.div_ceil(step.max(1));
    if !verify_link(&state.last_verified, token, hops) {
        return Err(EspProtectionError::TokenMismatch);
    }
    state.last_verified = *token;
    state.last_seen_seq = seq;
    Ok(())
}
