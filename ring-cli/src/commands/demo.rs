//! Start a ring and drive it with a scripted controller.
//!
//! Every second, round `j` addresses node `j mod N`. Every fifth round makes
//! that node lose the token; the others queue `data_j` at that node,
//! destined for the node itself, so the message makes a full lap.

use anyhow::{Context, Result};
use ring_node::{
    spawn_memory_ring, spawn_udp_ring, AdminClient, Channel, Config, MemoryNetwork, NodeHandle,
};
use ring_types::{NodeId, ServiceCommand};
use std::time::Duration;

use super::print_metrics;

/// Interval between driver rounds.
const ROUND_INTERVAL: Duration = Duration::from_secs(1);

/// How the driver reaches the nodes' administrative channels.
enum Controller {
    Udp(AdminClient),
    Memory(MemoryNetwork),
}

impl Controller {
    async fn send(&self, node: NodeId, command: &ServiceCommand) -> Result<()> {
        match self {
            Controller::Udp(client) => client.send(node, command).await?,
            Controller::Memory(network) => {
                network.inject(Channel::Admin, node, command.to_bytes()?)?
            }
        }
        Ok(())
    }
}

/// Command issued in round `round` of a ring of `size` nodes.
pub fn scripted_command(round: u32, size: u32) -> (NodeId, ServiceCommand) {
    let target = NodeId::new(round % size);
    let command = if round % 5 == 0 {
        ServiceCommand::simulate_drop()
    } else {
        ServiceCommand::enqueue(target, format!("data_{}", round))
    };
    (target, command)
}

/// Run the demo command.
pub async fn run(config: Config, rounds: u32, memory: bool) -> Result<()> {
    config.validate().context("Invalid ring configuration")?;

    let (handles, controller) = start(&config, memory).await?;
    let size = config.ring.size;

    for round in 1..=rounds {
        tokio::time::sleep(ROUND_INTERVAL).await;

        let (target, command) = scripted_command(round, size);
        tracing::info!("Round {}: {:?} at node {}", round, command.kind, target);
        if let Err(e) = controller.send(target, &command).await {
            tracing::warn!("Round {}: command not delivered: {}", round, e);
        }
    }

    // Let the last message finish its lap and a possible regeneration happen.
    tokio::time::sleep(config.recv_timeout() * 3).await;
    print_metrics(&handles);
    Ok(())
}

async fn start(config: &Config, memory: bool) -> Result<(Vec<NodeHandle>, Controller)> {
    if memory {
        let network = MemoryNetwork::new();
        let handles =
            spawn_memory_ring(config, &network).context("Failed to start in-memory ring")?;
        Ok((handles, Controller::Memory(network)))
    } else {
        let handles = spawn_udp_ring(config)
            .await
            .context("Failed to start ring")?;
        Ok((handles, Controller::Udp(AdminClient::from_config(config))))
    }
}
