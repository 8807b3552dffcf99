//! Start a single node.

use anyhow::{Context, Result};
use ring_node::{spawn_udp_node, Config};
use ring_types::NodeId;

use super::wait_for_shutdown;

/// Run the node command.
pub async fn run(config: Config, id: u32) -> Result<()> {
    config.validate().context("Invalid ring configuration")?;

    let handle = spawn_udp_node(&config, NodeId::new(id))
        .await
        .with_context(|| format!("Failed to start node {}", id))?;

    wait_for_shutdown(std::slice::from_ref(&handle)).await
}
