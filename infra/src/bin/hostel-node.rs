//! Runs a hostel node until Ctrl-C.

use anyhow::Context;
use tracing::info;

use hb_infra::{init_tracing, HostelNode};
use hb_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env();
    init_tracing(&config.logging).context("failed to initialise logging")?;

    let mut node = HostelNode::initialize(config)
        .await
        .context("failed to open the data directory")?;
    node.start_background_tasks();
    info!(tasks = ?node.running_tasks(), "Hostel node running, press Ctrl-C to stop");

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    node.shutdown().await;
    Ok(())
}
