//! Start every node of the ring in this process.

use anyhow::{Context, Result};
use ring_node::{spawn_memory_ring, spawn_udp_ring, Config, MemoryNetwork};

use super::wait_for_shutdown;

/// Run the run command.
pub async fn run(config: Config, memory: bool) -> Result<()> {
    config.validate().context("Invalid ring configuration")?;

    let handles = if memory {
        spawn_memory_ring(&config, &MemoryNetwork::new())
            .context("Failed to start in-memory ring")?
    } else {
        spawn_udp_ring(&config)
            .await
            .context("Failed to start ring")?
    };

    tracing::info!(
        "Ring of {} nodes running (hold {} ms, timeout {} ms){}",
        config.ring.size,
        config.timing.hold_ms,
        config.timing.recv_timeout_ms,
        if memory { " in memory" } else { "" }
    );
    if !memory {
        tracing::info!(
            "Service commands accepted on {}:{}..",
            config.network.host,
            config.network.base_admin_port
        );
    }

    wait_for_shutdown(&handles).await
}
