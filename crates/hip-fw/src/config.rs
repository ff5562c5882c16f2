/// Firewall configuration. Loaded from defaults today; a config-file loader
/// would hang off the same struct without changing the rest of the process.
pub struct FirewallConfig {
    /// Local port the firewall listens on for HIP control-plane traffic.
    pub listen_port: u16,
    /// Address the daemon's own control-plane socket is reachable at, once
    /// a packet has been classified and should be let through.
    pub upstream_addr: String,
}

impl Default for FirewallConfig {
    fn default() -> Self {
        Self {
            listen_port: 10500,
            upstream_addr: "127.0.0.1:10501".to_string(),
        }
    }
}
