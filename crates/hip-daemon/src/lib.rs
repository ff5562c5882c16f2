//! The control-plane daemon: a single-threaded event loop that owns the
//! host identity store, the host association database, installed SAs, and
//! per-identity puzzle caches, and drives them from incoming HIP traffic.

mod config;

pub use config::DaemonConfig;

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use anyhow::Result;
use tokio::net::UdpSocket;
use tokio::time::interval;
use tracing::{debug, info, warn};

use hip_hadb::Hadb;
use hip_hid::{HidEntry, HidError, HidStore};
use hip_puzzle::{PuzzleCache, R1Signer};
use hip_sa::SaManager;
use hip_state_machine::{handle_i1, handle_i2, I2Outcome, LocalIdentity};
use hip_types::Hit;
use hip_wire::params::HostId;
use hip_wire::{parse, PacketType};

/// Largest single HIP packet the daemon will attempt to parse. Oversized
/// reads are truncated by the UDP read itself; this just bounds the
/// buffer.
const MAX_PACKET_LEN: usize = 4096;
const SWEEP_INTERVAL: Duration = Duration::from_secs(5);

pub struct Daemon {
    config: DaemonConfig,
    hid: HidStore,
    hadb: Hadb,
    sa_manager: SaManager,
    puzzle_caches: HashMap<Hit, PuzzleCache>,
}

impl Daemon {
    pub fn new(config: DaemonConfig) -> Self {
        Daemon {
            config,
            hid: HidStore::new(),
            hadb: Hadb::new(),
            sa_manager: SaManager::new(),
            puzzle_caches: HashMap::new(),
        }
    }

    /// Register a local host identity the daemon will answer I1s for.
    pub fn add_identity(&mut self, host_id: HostId, keypair: hip_crypto::HostKeyPair) -> Result<Hit, HidError> {
        self.hid.insert(host_id, keypair)
    }

    /// Bind the UDP control-plane socket and run the event loop until the
    /// process receives a shutdown signal. Everything below this point
    /// runs on the current task; no handler ever blocks or spawns.
    pub async fn run(mut self) -> Result<()> {
        let socket = UdpSocket::bind(("0.0.0.0", self.config.udp_port)).await?;
        let local_addr = socket.local_addr()?.ip();
        info!(port = self.config.udp_port, "hipd listening");

        let mut sweep_tick = interval(SWEEP_INTERVAL);
        let mut buf = [0u8; MAX_PACKET_LEN];

        loop {
            tokio::select! {
                recv = socket.recv_from(&mut buf) => {
                    match recv {
                        Ok((len, src)) => {
                            if let Some(response) = self.handle_datagram(&buf[..len], src, local_addr) {
                                if let Err(err) = socket.send_to(&response, src).await {
                                    warn!(%src, %err, "failed to send HIP response");
                                }
                            }
                        }
                        Err(err) => warn!(%err, "UDP recv error"),
                    }
                }
                _ = sweep_tick.tick() => {
                    self.sweep();
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("shutdown signal received");
                    break;
                }
            }
        }
        Ok(())
    }

    /// Build the `R1Signer`/`LocalIdentity` an incoming packet's
    /// `local_hit` needs, from whichever identity this daemon holds under
    /// that HIT.
    fn identity(&self, local_hit: Hit) -> Option<&HidEntry> {
        self.hid.lookup(&local_hit)
    }

    fn local_identity(&self, entry: &HidEntry) -> LocalIdentity {
        LocalIdentity {
            keypair: entry.keypair.clone(),
            host_id: entry.host_id.clone(),
            hip_transforms: self.config.hip_transforms.clone(),
            esp_transforms: self.config.esp_transforms.clone(),
        }
    }

    fn puzzle_cache_for(&mut self, local_hit: Hit) -> Option<&mut PuzzleCache> {
        if !self.puzzle_caches.contains_key(&local_hit) {
            let entry = self.identity(local_hit)?;
            let signer = R1Signer {
                keypair: entry.keypair.clone(),
                host_id: entry.host_id.clone(),
                dh_group: self.config.dh_group,
                hip_transforms: self.config.hip_transforms.clone(),
                esp_transforms: self.config.esp_transforms.clone(),
            };
            self.puzzle_caches.insert(local_hit, PuzzleCache::with_signer(local_hit, signer));
        }
        self.puzzle_caches.get_mut(&local_hit)
    }

    /// Handle one received datagram, returning the bytes to send back to
    /// `src` (an R1 for an I1, an R2 for an accepted I2), if any.
    fn handle_datagram(&mut self, bytes: &[u8], src: SocketAddr, local_addr: IpAddr) -> Option<Vec<u8>> {
        let message = match parse(bytes) {
            Ok(message) => message,
            Err(err) => {
                debug!(%src, %err, "dropping malformed HIP packet");
                return None;
            }
        };

        let local_hit = message.header.receiver_hit;
        let peer_hit = message.header.sender_hit;

        match message.header.packet_type {
            PacketType::I1 => {
                let cache = match self.puzzle_cache_for(local_hit) {
                    Some(cache) => cache,
                    None => {
                        debug!(%src, ?local_hit, "I1 addressed to an identity we don't hold");
                        return None;
                    }
                };
                let (i, k) = handle_i1(cache, now());
                debug!(%src, ?peer_hit, i, k, "issued puzzle challenge for I1");
                cache.r1_bytes_for(i, peer_hit)
            }
            PacketType::I2 => {
                let Some(entry) = self.identity(local_hit) else {
                    debug!(%src, ?local_hit, "I2 addressed to an identity we don't hold");
                    return None;
                };
                let identity = self.local_identity(entry);
                let Some(cache) = self.puzzle_caches.get(&local_hit) else {
                    debug!(%src, "I2 for a local identity with no outstanding puzzles");
                    return None;
                };
                match handle_i2(
                    &mut self.hadb,
                    cache,
                    &mut self.sa_manager,
                    &identity,
                    &message,
                    local_hit,
                    peer_hit,
                    local_addr,
                    src.ip(),
                ) {
                    Ok(I2Outcome::Accepted(state, r2)) => {
                        debug!(%src, ?state, "I2 accepted, sending R2");
                        Some(r2)
                    }
                    Ok(I2Outcome::LostCollision) => {
                        debug!(%src, "I2 lost I2/I2 collision");
                        None
                    }
                    Ok(I2Outcome::DuplicateRetransmission(state)) => {
                        debug!(%src, ?state, "I2 retransmission, association already past R2_SENT");
                        None
                    }
                    Err(err) => {
                        debug!(%src, %err, "I2 rejected");
                        None
                    }
                }
            }
            other => {
                debug!(%src, ?other, "packet type not yet handled by this event loop");
                None
            }
        }
    }

    fn sweep(&mut self) {
        let now = now();
        for cache in self.puzzle_caches.values_mut() {
            cache.sweep(now);
        }
    }
}

fn now() -> std::time::Instant {
    std::time::Instant::now()
}
