//! UDP transport.
//!
//! [`UdpTransport`] is a thin wrapper around `tokio::net::UdpSocket` that
//! maps node ids to ports. All protocol logic lives elsewhere; this module
//! owns only byte I/O.

use std::net::{IpAddr, SocketAddr};

use async_trait::async_trait;
use ring_types::NodeId;
use tokio::net::UdpSocket;

use super::{Transport, TransportError};

/// Largest datagram accepted (maximum UDP payload over IPv4).
pub const MAX_DATAGRAM: usize = 65_507;

/// A UDP endpoint for one node on one channel.
///
/// Node `i` of the channel is reachable at `host:base_port + i`.
#[derive(Debug)]
pub struct UdpTransport {
    socket: UdpSocket,
    host: IpAddr,
    base_port: u16,
}

impl UdpTransport {
    /// Bind the endpoint of `node` on the channel starting at `base_port`.
    pub async fn bind(host: IpAddr, base_port: u16, node: NodeId) -> Result<Self, TransportError> {
        let local = address_of(host, base_port, node)?;
        let socket = UdpSocket::bind(local).await?;
        Ok(Self {
            socket,
            host,
            base_port,
        })
    }

    /// Address this socket is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, TransportError> {
        Ok(self.socket.local_addr()?)
    }
}

/// Socket address of `node` on the channel starting at `base_port`.
pub(crate) fn address_of(
    host: IpAddr,
    base_port: u16,
    node: NodeId,
) -> Result<SocketAddr, TransportError> {
    let port = u16::try_from(node.index())
        .ok()
        .and_then(|offset| base_port.checked_add(offset))
        .ok_or(TransportError::Unreachable(node))?;
    Ok(SocketAddr::new(host, port))
}

#[async_trait]
impl Transport for UdpTransport {
    async fn send_to(&self, node: NodeId, data: &[u8]) -> Result<(), TransportError> {
        let dest = address_of(self.host, self.base_port, node)?;
        self.socket.send_to(data, dest).await?;
        Ok(())
    }

    async fn recv(&self) -> Result<Vec<u8>, TransportError> {
        let mut buf = vec![0u8; MAX_DATAGRAM];
        let (n, _from) = self.socket.recv_from(&mut buf).await?;
        buf.truncate(n);
        Ok(buf)
    }
}
