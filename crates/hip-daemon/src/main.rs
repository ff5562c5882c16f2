use anyhow::Result;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use hip_daemon::{Daemon, DaemonConfig};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("hipd starting");

    let config = DaemonConfig::default();
    let daemon = Daemon::new(config);
    daemon.run().await
}
