//! # tokenring
//!
//! CLI for running and driving a simulated token ring.
//!
//! ## Commands
//!
//! - `run`: Start every node of the ring in this process
//! - `node`: Start a single node (one process per node)
//! - `send`: Queue a message at a node
//! - `drop`: Make a node lose the next token
//! - `demo`: Start a ring and drive it with a scripted controller
//!
//! ## Example
//!
//! ```bash
//! # Three nodes, 200 ms hold (one lap takes 600 ms, under the 1 s timeout)
//! tokenring run -n 3 -t 200
//!
//! # From another terminal: node 0 sends "hello" to node 2
//! tokenring send --node 0 --dest 2 --payload hello
//!
//! # Lose the token at node 1
//! tokenring drop --node 1
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{demo, drop, node, run, send, RingOverrides};

/// Simulated token ring over UDP.
#[derive(Parser, Debug)]
#[command(name = "tokenring")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Ring configuration file (TOML)
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level (ignored when RUST_LOG is set)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start all nodes of the ring in this process
    Run {
        #[command(flatten)]
        ring: RingOverrides,

        /// Use an in-process network instead of UDP sockets. Nothing outside
        /// the process can reach it, so the ring stays idle; use
        /// `demo --memory` to see traffic
        #[arg(long)]
        memory: bool,
    },

    /// Start a single node
    Node {
        /// Node id (0-based)
        #[arg(long)]
        id: u32,
    },

    /// Queue a message at a node
    Send {
        /// Node that queues the message
        #[arg(long)]
        node: u32,

        /// Destination node
        #[arg(long)]
        dest: u32,

        /// Message payload
        #[arg(long)]
        payload: String,
    },

    /// Make a node discard the next token it receives
    Drop {
        /// Node that loses the token
        #[arg(long)]
        node: u32,
    },

    /// Start a ring and drive it with scripted commands
    Demo {
        #[command(flatten)]
        ring: RingOverrides,

        /// Number of driver rounds (one per second)
        #[arg(long, default_value = "19")]
        rounds: u32,

        /// Use an in-process network instead of UDP sockets
        #[arg(long)]
        memory: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Run { ring, memory } => {
            run::run(ring.apply(config), memory).await?;
        }
        Commands::Node { id } => {
            node::run(config, id).await?;
        }
        Commands::Send {
            node,
            dest,
            payload,
        } => {
            send::run(&config, node, dest, &payload).await?;
        }
        Commands::Drop { node } => {
            drop::run(&config, node).await?;
        }
        Commands::Demo {
            ring,
            rounds,
            memory,
        } => {
            demo::run(ring.apply(config), rounds, memory).await?;
        }
    }

    Ok(())
}

/// Install the log subscriber. `RUST_LOG` wins over `--verbose`.
fn setup_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "info" }));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
