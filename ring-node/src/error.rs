//! Error types for ring nodes.

use ring_types::NodeId;

/// Main error type for node startup and administration.
///
/// Errors raised while the ring is running are absorbed by the node tasks
/// and only surface in the logs; this type covers what happens before that.
#[derive(Debug, thiserror::Error)]
pub enum NodeError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    /// Topology error.
    #[error("topology error: {0}")]
    Topology(#[from] ring_core::TopologyError),

    /// Transport error.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Wire codec error.
    #[error("codec error: {0}")]
    Codec(#[from] ring_types::CodecError),
}

/// Transport layer errors.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// I/O error from the socket.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Destination has no reachable address.
    #[error("node {0} is unreachable")]
    Unreachable(NodeId),

    /// The channel was shut down.
    #[error("channel closed")]
    Closed,
}

/// Reasons a service command is refused.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// Enqueue without a destination.
    #[error("enqueue command has no destination")]
    MissingDestination,

    /// Enqueue for a node that is not part of the ring.
    #[error("destination {destination} is outside a ring of {size} nodes")]
    UnknownDestination {
        /// Requested destination.
        destination: NodeId,
        /// Ring size.
        size: u32,
    },

    /// Outbound queue is at capacity.
    #[error(transparent)]
    QueueFull(#[from] ring_core::QueueError),
}

/// Result type alias for node operations.
pub type Result<T> = std::result::Result<T, NodeError>;
