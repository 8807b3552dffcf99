//! Client for the administrative channel.
//!
//! Used by an external controller (the CLI, or a test driver) to inject
//! work into a running ring. Each command is one datagram sent from an
//! ephemeral socket; there is no reply.

use crate::config::Config;
use crate::error::{Result, TransportError};
use crate::transport::address_of;
use ring_types::{NodeId, ServiceCommand};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use tokio::net::UdpSocket;

/// Sends service commands to nodes' administrative ports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdminClient {
    host: IpAddr,
    base_admin_port: u16,
}

impl AdminClient {
    /// Create a client for nodes at `host:base_admin_port + node`.
    pub fn new(host: IpAddr, base_admin_port: u16) -> Self {
        Self {
            host,
            base_admin_port,
        }
    }

    /// Create a client for the ring described by `config`.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.network.host, config.network.base_admin_port)
    }

    /// Send one command to `node`.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails or the datagram cannot be sent.
    pub async fn send(&self, node: NodeId, command: &ServiceCommand) -> Result<()> {
        let dest = address_of(self.host, self.base_admin_port, node)?;
        let bytes = command.to_bytes()?;

        let local = match self.host {
            IpAddr::V4(_) => SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0),
            IpAddr::V6(_) => SocketAddr::new(IpAddr::V6(Ipv6Addr::UNSPECIFIED), 0),
        };
        let socket = UdpSocket::bind(local)
            .await
            .map_err(TransportError::from)?;
        socket
            .send_to(&bytes, dest)
            .await
            .map_err(TransportError::from)?;

        tracing::debug!("Sent {:?} command to node {} at {}", command.kind, node, dest);
        Ok(())
    }

    /// Queue `payload` at `node` for delivery to `destination`.
    pub async fn enqueue(
        &self,
        node: NodeId,
        destination: NodeId,
        payload: impl Into<String>,
    ) -> Result<()> {
        self.send(node, &ServiceCommand::enqueue(destination, payload))
            .await
    }

    /// Make `node` discard the next token it receives.
    pub async fn simulate_drop(&self, node: NodeId) -> Result<()> {
        self.send(node, &ServiceCommand::simulate_drop()).await
    }
}
