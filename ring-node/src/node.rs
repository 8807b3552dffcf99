//! Node assembly.
//!
//! A node is two concurrent tasks sharing one [`Control`] block:
//!
//! ```text
//!              admin channel                    ring channel
//! controller ───────────────► listener      predecessor ───► engine ───► successor
//!                                │                             │
//!                                └──────► Control ◄────────────┘
//!                                   (queue + drop flag)
//! ```

use crate::config::Config;
use crate::engine::{run_engine, EngineSettings};
use crate::error::Result;
use crate::listener::run_listener;
use crate::metrics::NodeMetrics;
use crate::transport::{Channel, MemoryNetwork, Transport, UdpTransport};
use ring_core::{Control, Engine, OutboundQueue};
use ring_types::NodeId;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// Control block shared by a node's listener and engine.
pub type SharedControl = Arc<Mutex<Control>>;

/// Entry point for starting nodes.
#[derive(Debug)]
pub struct Node;

impl Node {
    /// Start node `id` on the given transports.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or `id` is not part
    /// of the configured ring.
    pub fn spawn(
        config: &Config,
        id: NodeId,
        ring_transport: Arc<dyn Transport>,
        admin_transport: Arc<dyn Transport>,
    ) -> Result<NodeHandle> {
        config.validate()?;
        let ring = config.ring()?;
        let initiator = id.index() == config.ring.initiator;
        let engine = Engine::new(id, &ring, initiator)?;

        let control: SharedControl = Arc::new(Mutex::new(Control::new(OutboundQueue::new(
            config.queue.capacity,
        ))));
        let metrics = Arc::new(NodeMetrics::default());
        let settings = EngineSettings {
            hold: config.hold(),
            recv_timeout: config.recv_timeout(),
            policy: config.regeneration_policy(),
        };

        tracing::info!(
            "Starting node {} (successor {}{})",
            id,
            engine.successor(),
            if initiator { ", initiator" } else { "" }
        );

        let engine_task = tokio::spawn(run_engine(
            engine,
            ring_transport,
            control.clone(),
            settings,
            metrics.clone(),
        ));
        let listener_task = tokio::spawn(run_listener(
            id,
            ring,
            admin_transport,
            control.clone(),
            metrics.clone(),
        ));

        Ok(NodeHandle {
            id,
            control,
            metrics,
            engine_task,
            listener_task,
        })
    }
}

/// Handle to a running node. Dropping it stops both tasks.
#[derive(Debug)]
pub struct NodeHandle {
    id: NodeId,
    control: SharedControl,
    metrics: Arc<NodeMetrics>,
    engine_task: JoinHandle<()>,
    listener_task: JoinHandle<()>,
}

impl NodeHandle {
    /// The node's id.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The node's counters.
    pub fn metrics(&self) -> &Arc<NodeMetrics> {
        &self.metrics
    }

    /// The node's control block.
    pub fn control(&self) -> &SharedControl {
        &self.control
    }

    /// Stop both tasks.
    pub fn abort(&self) {
        self.engine_task.abort();
        self.listener_task.abort();
    }

    /// True once both tasks have stopped.
    pub fn is_finished(&self) -> bool {
        self.engine_task.is_finished() && self.listener_task.is_finished()
    }
}

impl Drop for NodeHandle {
    fn drop(&mut self) {
        self.abort();
    }
}

/// Bind UDP sockets for node `id` and start it.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or a port cannot be bound.
pub async fn spawn_udp_node(config: &Config, id: NodeId) -> Result<NodeHandle> {
    config.validate()?;
    let net = &config.network;
    let ring_transport = UdpTransport::bind(net.host, net.base_ring_port, id).await?;
    let admin_transport = UdpTransport::bind(net.host, net.base_admin_port, id).await?;
    Node::spawn(config, id, Arc::new(ring_transport), Arc::new(admin_transport))
}

/// Start every node of the configured ring on UDP.
///
/// # Errors
///
/// Returns the first error; nodes started before it are stopped.
pub async fn spawn_udp_ring(config: &Config) -> Result<Vec<NodeHandle>> {
    let ring = config.ring()?;
    let mut handles = Vec::with_capacity(ring.size() as usize);
    for id in ring.nodes() {
        handles.push(spawn_udp_node(config, id).await?);
    }
    Ok(handles)
}

/// Start every node of the configured ring on an in-memory network.
///
/// # Errors
///
/// Returns an error if the configuration is invalid.
pub fn spawn_memory_ring(config: &Config, network: &MemoryNetwork) -> Result<Vec<NodeHandle>> {
    config.validate()?;
    let ring = config.ring()?;
    ring.nodes()
        .map(|id| {
            let ring_transport = Arc::new(network.endpoint(Channel::Ring, id));
            let admin_transport = Arc::new(network.endpoint(Channel::Admin, id));
            Node::spawn(config, id, ring_transport, admin_transport)
        })
        .collect()
}
