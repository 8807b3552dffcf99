//! Make a running node lose the next token.

use anyhow::{Context, Result};
use ring_node::{AdminClient, Config};
use ring_types::NodeId;

/// Run the drop command.
pub async fn run(config: &Config, node: u32) -> Result<()> {
    AdminClient::from_config(config)
        .simulate_drop(NodeId::new(node))
        .await
        .with_context(|| format!("Failed to reach node {}", node))?;

    println!("Node {} will drop the next token", node);
    Ok(())
}
