use hip_crypto::dh::DhGroup;
use hip_crypto::symmetric::SymmetricTransform;

/// Daemon configuration. Loaded from defaults today; a config-file loader
/// would hang off the same struct without changing the rest of the daemon.
pub struct DaemonConfig {
    /// UDP port HIP control-plane traffic (and UDP-encapsulated ESP) is
    /// received on.
    pub udp_port: u16,
    /// Path to the Unix control socket the local client/firewall use to
    /// query or steer host associations.
    pub control_socket_path: String,
    /// Directory persisted host identities are read from and written to.
    pub data_dir: String,
    /// Puzzle difficulty switches to the loaded value once more than this
    /// many I1s arrive within one sweep interval.
    pub i1_load_threshold: u32,
    /// DH group offered in R1 and used to answer the I2 it provokes.
    pub dh_group: DhGroup,
    /// HIP_TRANSFORM suites offered in R1, most preferred first.
    pub hip_transforms: Vec<u16>,
    /// ESP_TRANSFORM suites offered in R1, most preferred first.
    pub esp_transforms: Vec<u16>,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            udp_port: 10500,
            control_socket_path: "/var/run/hipd.sock".to_string(),
            data_dir: "/var/lib/hipd".to_string(),
            i1_load_threshold: 50,
            dh_group: DhGroup::NistP256,
            hip_transforms: vec![SymmetricTransform::AesCbc.transform_id()],
            esp_transforms: vec![SymmetricTransform::AesCbc.transform_id()],
        }
    }
}
