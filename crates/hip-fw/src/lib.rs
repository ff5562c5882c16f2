//! A HIP-aware middlebox: tracks base-exchange progress per host-identity
//! tuple and, independent of any SA key material, verifies the
//! hop-by-hop ESP-protection tokens carried on data-plane traffic.

mod config;
mod errors;

pub use config::FirewallConfig;
pub use errors::FirewallError;

use std::collections::HashMap;

use hip_esp_protection::{EspProtTransform, PacketVerifier, TransformConfig};
use hip_firewall::{ConnState, ConnectionTracker, HipTuple};
use hip_wire::PacketType;

pub struct Firewall {
    tracker: ConnectionTracker,
    esp_verifiers: HashMap<u32, PacketVerifier>,
}

impl Firewall {
    pub fn new() -> Self {
        Firewall {
            tracker: ConnectionTracker::new(),
            esp_verifiers: HashMap::new(),
        }
    }

    /// Feed an observed HIP control-plane packet into the connection
    /// tracker, returning the resulting per-tuple state.
    pub fn observe_control(&mut self, tuple: HipTuple, packet_type: PacketType) -> Option<ConnState> {
        self.tracker.observe(tuple, packet_type)
    }

    pub fn tracker(&self) -> &ConnectionTracker {
        &self.tracker
    }

    /// Install a verifier for an SPI once its ESP-protection anchor has
    /// been observed in the base exchange (or a subsequent anchor update).
    pub fn install_verifier(&mut self, spi: u32, config: &TransformConfig, anchor: [u8; 20], start_seq: u32) {
        if config.transform == EspProtTransform::Unused {
            self.esp_verifiers.remove(&spi);
            return;
        }
        self.esp_verifiers.insert(spi, PacketVerifier::new(config, anchor, start_seq));
    }

    pub fn remove_verifier(&mut self, spi: u32) {
        self.esp_verifiers.remove(&spi);
    }

    /// Verify a disclosed ESP-protection token for `spi`/`seq` without
    /// needing the SA's encryption or authentication keys.
    pub fn verify_esp_token(&mut self, spi: u32, seq: u32, token: &[u8; 20]) -> Result<(), FirewallError> {
        let verifier = self.esp_verifiers.get_mut(&spi).ok_or(FirewallError::UnknownSpi(spi))?;
        verifier.verify_token(seq, token)?;
        Ok(())
    }
}

impl Default for Firewall {
    fn default() -> Self {
        Self::new()
    }
}
