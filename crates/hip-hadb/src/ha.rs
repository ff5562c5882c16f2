//! The host association record: per-(local-HIT, peer-HIT) mutable state.

use std::net::IpAddr;
use std::time::{Duration, Instant};

use hip_crypto::SharedSecret;
use hip_types::{HipState, HipVersion, Hit, Lsi, NatMode};

use crate::retransmission::RetransmissionRing;

/// Eight derived keys drawn from KEYMAT, in the fixed order
/// `hip_crypto::keymat::KeymatSlot::ORDER`.
#[derive(Default)]
pub struct DerivedKeys {
    pub hip_encrypt_ir: Vec<u8>,
    pub hip_auth_ir: Vec<u8>,
    pub hip_encrypt_ri: Vec<u8>,
    pub hip_auth_ri: Vec<u8>,
    pub esp_encrypt_ir: Vec<u8>,
    pub esp_auth_ir: Vec<u8>,
    pub esp_encrypt_ri: Vec<u8>,
    pub esp_auth_ri: Vec<u8>,
}

/// SPI bookkeeping for one direction: the active SPI plus the old one
/// being drained and the new one being installed during a rekey.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpiSet {
    pub current: u32,
    pub old: u32,
    pub new: u32,
}

impl SpiSet {
    pub fn is_installed(&self) -> bool {
        self.current != 0
    }
}

/// The pending puzzle challenge/solution for an in-progress base exchange.
#[derive(Debug, Clone, Copy)]
pub struct PendingPuzzle {
    pub i: u64,
    pub j: Option<u64>,
}

/// ESP-protection transform and anchor state carried on the HA (mirrored
/// into the connection tracker's ESP-tuple once SAs are installed).
#[derive(Debug, Clone, Default)]
pub struct EspProtectionState {
    pub transform: u8,
    pub local_active_anchor: Vec<u8>,
    pub local_next_anchor: Vec<u8>,
    pub peer_active_anchor: Vec<u8>,
    pub peer_next_anchor: Vec<u8>,
}

/// Present but unexercised in this core: the daemon never schedules a
/// heartbeat tick, so these counters stay at zero. Carried because HA
/// teardown logging reports them alongside the birthday counter.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeartbeatStats {
    pub sent: u32,
    pub received: u32,
}

/// A single retransmission slot: the raw packet bytes plus backoff state.
#[derive(Debug, Clone)]
pub struct RetransmitSlot {
    pub packet_type: hip_wire::PacketType,
    pub bytes: Vec<u8>,
    pub attempts: u32,
    pub next_deadline: Instant,
}

pub struct HostAssociation {
    pub local_hit: Hit,
    pub peer_hit: Hit,
    pub local_lsi: Option<Lsi>,
    pub peer_lsi: Option<Lsi>,

    pub state: HipState,
    pub version: HipVersion,

    pub hip_transform: Option<u16>,
    pub esp_transform: Option<u16>,

    pub keymat_cursor: usize,
    pub keys: DerivedKeys,

    pub dh_shared_secret: Option<SharedSecret>,
    pub peer_public_key: Option<Vec<u8>>,

    pub peer_ip: Option<IpAddr>,
    pub local_ip: Option<IpAddr>,
    pub nat_mode: NatMode,
    pub local_udp_port: Option<u16>,
    pub peer_udp_port: Option<u16>,

    pub inbound_spi: SpiSet,
    pub outbound_spi: SpiSet,

    pub pending_puzzle: Option<PendingPuzzle>,
    pub peer_controls: u16,

    pub esp_protection: EspProtectionState,

    pub retransmissions: RetransmissionRing,

    pub last_seen: Option<Instant>,
    /// Detects stale retransmitted I2/R2 referencing an outdated DH
    /// secret: bumped every time a fresh DH exchange completes.
    pub birthday: u32,
    pub heartbeats: HeartbeatStats,

    pub is_loopback: bool,
    /// True when SA installation for this HA is administratively disabled
    /// (e.g. ESP-protection fallback to UNUSED after `ResourceExhausted`);
    /// distinct from "keys not yet derived".
    pub disable_sas: bool,

    pub purge_timeout: Duration,
}

impl HostAssociation {
    pub fn new(local_hit: Hit, peer_hit: Hit) -> Self {
        HostAssociation {
            local_hit,
            peer_hit,
            local_lsi: None,
            peer_lsi: None,
            state: HipState::Unassociated,
            version: HipVersion::V2,
            hip_transform: None,
            esp_transform: None,
            keymat_cursor: 0,
            keys: DerivedKeys::default(),
            dh_shared_secret: None,
            peer_public_key: None,
            peer_ip: None,
            local_ip: None,
            nat_mode: NatMode::default(),
            local_udp_port: None,
            peer_udp_port: None,
            inbound_spi: SpiSet::default(),
            outbound_spi: SpiSet::default(),
            pending_puzzle: None,
            peer_controls: 0,
            esp_protection: EspProtectionState::default(),
            retransmissions: RetransmissionRing::new(),
            last_seen: None,
            birthday: 0,
            heartbeats: HeartbeatStats::default(),
            is_loopback: false,
            disable_sas: false,
            purge_timeout: Duration::from_secs(120),
        }
    }

    /// Keys are present iff state is one where the base exchange's key
    /// derivation has already run (mirrors `HipState::has_keys`).
    pub fn has_keys(&self) -> bool {
        self.state.has_keys()
    }

    pub fn has_esp_sas(&self) -> bool {
        self.inbound_spi.is_installed() && self.outbound_spi.is_installed()
    }

    /// Check the invariant that SPIs are both-or-neither installed.
    pub fn check_spi_invariant(&self) -> bool {
        self.inbound_spi.is_installed() == self.outbound_spi.is_installed()
    }
}
