//! Queue a message at a running node.

use anyhow::{Context, Result};
use ring_node::{AdminClient, Config};
use ring_types::NodeId;

/// Run the send command.
pub async fn run(config: &Config, node: u32, dest: u32, payload: &str) -> Result<()> {
    let client = AdminClient::from_config(config);
    client
        .enqueue(NodeId::new(node), NodeId::new(dest), payload)
        .await
        .with_context(|| format!("Failed to reach node {}", node))?;

    println!("Queued {:?} at node {} for node {}", payload, node, dest);
    Ok(())
}
