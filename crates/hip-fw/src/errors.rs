use thiserror::Error;

#[derive(Debug, Error)]
pub enum FirewallError {
    #[error("no ESP-protection verifier installed for SPI {0:#x}")]
    UnknownSpi(u32),
    #[error(transparent)]
    Protection(#[from] hip_esp_protection::EspProtectionError),
}
