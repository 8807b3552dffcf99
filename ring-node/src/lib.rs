//! # ring-node
//!
//! Runtime for tokenring nodes.
//!
//! This crate runs the pure state machines from `ring-core` against real
//! datagram I/O:
//! - Binds one ring socket and one administrative socket per node
//! - Holds, transforms and forwards the circulating token
//! - Regenerates the last token after prolonged inbound silence
//! - Applies service commands from an external controller
//!
//! ## Architecture
//!
//! ```text
//!            ring channel (base_ring_port + i)
//!   ┌──────────────────────────────────────────────┐
//!   ▼                                              │
//! node 0 ──────► node 1 ──────► ... ──────► node N-1
//!   ▲              ▲                          ▲
//!   │              │                          │
//!   └──────────────┴── admin channel ─────────┘
//!                 (base_admin_port + i)
//!                        ▲
//!                   AdminClient
//! ```
//!
//! ## Tasks
//!
//! Every node runs exactly two tasks (see [`node`]):
//! - the protocol engine ([`engine::run_engine`])
//! - the administrative listener ([`listener::run_listener`])
//!
//! They share only the node's outbound queue and drop flag.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod admin;
pub mod config;
pub mod engine;
pub mod error;
pub mod listener;
pub mod metrics;
pub mod node;
pub mod transport;

pub use admin::AdminClient;
pub use config::{Config, ConfigError};
pub use engine::{run_engine, EngineSettings};
pub use error::{CommandError, NodeError, Result, TransportError};
pub use listener::{apply_command, run_listener};
pub use metrics::{MetricsSnapshot, NodeMetrics};
pub use node::{
    spawn_memory_ring, spawn_udp_node, spawn_udp_ring, Node, NodeHandle, SharedControl,
};
pub use transport::{Channel, MemoryNetwork, MemoryTransport, Sent, Transport, UdpTransport};
