//! In-process network for testing.
//!
//! Every endpoint gets an unbounded inbox. Successful sends are captured in
//! a tap for verification, and individual nodes can be severed to simulate
//! an unreachable destination.

use super::{Transport, TransportError};
use async_trait::async_trait;
use ring_types::{NodeId, Token};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc;

/// Which of a node's two channels a datagram travels on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Token traffic between neighbours.
    Ring,
    /// Service commands from a controller.
    Admin,
}

/// A datagram captured by the network tap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sent {
    /// Channel it travelled on.
    pub channel: Channel,
    /// Sending endpoint (`None` for injected datagrams).
    pub from: Option<NodeId>,
    /// Receiving node.
    pub to: NodeId,
    /// Raw bytes.
    pub bytes: Vec<u8>,
}

impl Sent {
    /// Decode the datagram as a token, if it is one.
    pub fn token(&self) -> Option<Token> {
        Token::from_bytes(&self.bytes).ok()
    }
}

#[derive(Debug, Default)]
struct NetworkInner {
    inboxes: HashMap<(Channel, NodeId), mpsc::UnboundedSender<Vec<u8>>>,
    severed: HashSet<NodeId>,
    tap: Vec<Sent>,
}

/// Shared in-memory network.
///
/// Cloning yields another handle to the same network.
#[derive(Debug, Clone, Default)]
pub struct MemoryNetwork {
    inner: Arc<Mutex<NetworkInner>>,
}

impl MemoryNetwork {
    /// Create an empty network.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, NetworkInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Register the endpoint of `node` on `channel`.
    ///
    /// Registering the same endpoint twice replaces the earlier inbox.
    pub fn endpoint(&self, channel: Channel, node: NodeId) -> MemoryTransport {
        let (tx, rx) = mpsc::unbounded_channel();
        self.lock().inboxes.insert((channel, node), tx);
        MemoryTransport {
            network: self.clone(),
            channel,
            node,
            inbox: tokio::sync::Mutex::new(rx),
        }
    }

    /// Deliver raw bytes to an endpoint without a sender (not tapped).
    ///
    /// Used to play the external controller, or to feed malformed data.
    pub fn inject(
        &self,
        channel: Channel,
        node: NodeId,
        bytes: Vec<u8>,
    ) -> Result<(), TransportError> {
        let inner = self.lock();
        let inbox = inner
            .inboxes
            .get(&(channel, node))
            .ok_or(TransportError::Unreachable(node))?;
        inbox.send(bytes).map_err(|_| TransportError::Closed)
    }

    /// Make `node` unreachable on every channel.
    pub fn sever(&self, node: NodeId) {
        self.lock().severed.insert(node);
    }

    /// Make a severed node reachable again.
    pub fn restore(&self, node: NodeId) {
        self.lock().severed.remove(&node);
    }

    /// All datagrams sent through endpoints so far, in send order.
    pub fn sent(&self) -> Vec<Sent> {
        self.lock().tap.clone()
    }

    /// Tokens sent on the ring channel so far, as `(from, to, token)`.
    pub fn ring_traffic(&self) -> Vec<(NodeId, NodeId, Token)> {
        self.lock()
            .tap
            .iter()
            .filter(|s| s.channel == Channel::Ring)
            .filter_map(|s| Some((s.from?, s.to, s.token()?)))
            .collect()
    }

    fn deliver(&self, sent: Sent) -> Result<(), TransportError> {
        let mut inner = self.lock();
        if inner.severed.contains(&sent.to) {
            return Err(TransportError::Unreachable(sent.to));
        }
        let inbox = inner
            .inboxes
            .get(&(sent.channel, sent.to))
            .ok_or(TransportError::Unreachable(sent.to))?;
        inbox
            .send(sent.bytes.clone())
            .map_err(|_| TransportError::Unreachable(sent.to))?;
        inner.tap.push(sent);
        Ok(())
    }
}

/// One endpoint of a [`MemoryNetwork`].
#[derive(Debug)]
pub struct MemoryTransport {
    network: MemoryNetwork,
    channel: Channel,
    node: NodeId,
    inbox: tokio::sync::Mutex<mpsc::UnboundedReceiver<Vec<u8>>>,
}

impl MemoryTransport {
    /// The node this endpoint belongs to.
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// The channel this endpoint listens on.
    pub fn channel(&self) -> Channel {
        self.channel
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn send_to(&self, node: NodeId, data: &[u8]) -> Result<(), TransportError> {
        self.network.deliver(Sent {
            channel: self.channel,
            from: Some(self.node),
            to: node,
            bytes: data.to_vec(),
        })
    }

    async fn recv(&self) -> Result<Vec<u8>, TransportError> {
        let mut inbox = self.inbox.lock().await;
        inbox.recv().await.ok_or(TransportError::Closed)
    }
}
