//! Datagram transport abstraction for ring nodes.
//!
//! Each node owns two transports, one per channel:
//! - the ring channel, on which it receives tokens from its predecessor and
//!   sends tokens to its successor
//! - the administrative channel, on which it receives service commands
//!
//! # Design
//!
//! The transport trait is async and connectionless:
//! - `send_to()` transmits one datagram to a node on the same channel
//! - `recv()` waits for the next datagram addressed to this endpoint
//!
//! Receive timeouts are applied by the caller with `tokio::time::timeout`.
//!
//! Two implementations are provided: [`UdpTransport`] for real deployments
//! and [`MemoryNetwork`] for tests and single-process demos.

mod memory;
mod udp;

pub use memory::{Channel, MemoryNetwork, MemoryTransport, Sent};
pub use udp::{UdpTransport, MAX_DATAGRAM};
pub(crate) use udp::address_of;

pub use crate::error::TransportError;

use async_trait::async_trait;
use ring_types::NodeId;
use std::time::Duration;

/// Pause after a failed receive before trying again.
pub const RECV_ERROR_BACKOFF: Duration = Duration::from_millis(50);

/// Transport trait for exchanging datagrams between ring nodes.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send one datagram to `node` on this transport's channel.
    async fn send_to(&self, node: NodeId, data: &[u8]) -> Result<(), TransportError>;

    /// Receive the next datagram.
    ///
    /// Blocks until data is available or the channel closes.
    async fn recv(&self) -> Result<Vec<u8>, TransportError>;
}

/// Transport whose every operation fails, for exercising error paths.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct FailingTransport {
    pub(crate) recv_calls: std::sync::atomic::AtomicU64,
}

#[cfg(test)]
#[async_trait]
impl Transport for FailingTransport {
    async fn send_to(&self, node: NodeId, _data: &[u8]) -> Result<(), TransportError> {
        Err(TransportError::Unreachable(node))
    }

    async fn recv(&self) -> Result<Vec<u8>, TransportError> {
        self.recv_calls.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        Err(TransportError::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            "interface down",
        )))
    }
}
