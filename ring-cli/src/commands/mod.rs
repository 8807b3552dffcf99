//! CLI command implementations.

pub mod demo;
pub mod drop;
pub mod node;
pub mod run;
pub mod send;

use anyhow::{Context, Result};
use clap::Args;
use ring_node::{Config, NodeHandle};
use std::path::Path;

/// Ring settings that can be overridden on the command line.
#[derive(Args, Debug, Clone, Default)]
pub struct RingOverrides {
    /// Number of nodes
    #[arg(long = "nodes", short = 'n')]
    pub size: Option<u32>,

    /// Per-token hold in milliseconds
    #[arg(long = "hold-ms", short = 't')]
    pub hold_ms: Option<u64>,
}

impl RingOverrides {
    /// Apply the overrides on top of `config`.
    pub fn apply(self, mut config: Config) -> Config {
        if let Some(size) = self.size {
            config.ring.size = size;
        }
        if let Some(hold_ms) = self.hold_ms {
            config.timing.hold_ms = hold_ms;
        }
        config
    }
}

/// Load the configuration file, or the defaults when none is given.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            Config::from_file(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))
        }
        None => {
            tracing::debug!("Using default configuration");
            Ok(Config::default())
        }
    }
}

/// Block until Ctrl-C, then print every node's counters.
pub async fn wait_for_shutdown(handles: &[NodeHandle]) -> Result<()> {
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;
    tracing::info!("Shutting down");
    print_metrics(handles);
    Ok(())
}

/// Print one line of counters per node.
pub fn print_metrics(handles: &[NodeHandle]) {
    for handle in handles {
        println!("node {}: {}", handle.id(), handle.metrics().snapshot());
    }
}
