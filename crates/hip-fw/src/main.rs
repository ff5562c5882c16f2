use std::net::IpAddr;

use anyhow::Result;
use tokio::net::UdpSocket;
use tracing::{debug, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use hip_firewall::HipTuple;
use hip_fw::{Firewall, FirewallConfig};
use hip_wire::parse;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = FirewallConfig::default();
    let mut firewall = Firewall::new();

    let inbound = UdpSocket::bind(("0.0.0.0", config.listen_port)).await?;
    let outbound = UdpSocket::bind("0.0.0.0:0").await?;
    info!(port = config.listen_port, upstream = %config.upstream_addr, "hipfw listening");

    let mut buf = [0u8; 4096];
    loop {
        tokio::select! {
            recv = inbound.recv_from(&mut buf) => {
                let (len, src) = match recv {
                    Ok(pair) => pair,
                    Err(err) => {
                        warn!(%err, "UDP recv error");
                        continue;
                    }
                };
                let bytes = &buf[..len];
                let message = match parse(bytes) {
                    Ok(message) => message,
                    Err(err) => {
                        debug!(%src, %err, "dropping malformed HIP packet");
                        continue;
                    }
                };

                let tuple = HipTuple {
                    local_hit: message.header.receiver_hit,
                    peer_hit: message.header.sender_hit,
                    local_addr: local_listen_addr(),
                    peer_addr: src.ip(),
                };
                let state = firewall.observe_control(tuple, message.header.packet_type);
                debug!(%src, ?state, packet_type = ?message.header.packet_type, "observed HIP packet");

                if let Err(err) = outbound.send_to(bytes, &config.upstream_addr).await {
                    warn!(%err, "failed to forward packet upstream");
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("shutdown signal received");
                break;
            }
        }
    }
    Ok(())
}

fn local_listen_addr() -> IpAddr {
    "0.0.0.0".parse().expect("valid literal")
}
