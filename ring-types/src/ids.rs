//! Identity types for tokenring.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a node in the ring.
///
/// Nodes are numbered `0..n_nodes`; the number doubles as the offset used to
/// derive the node's ports.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(u32);

impl NodeId {
    /// Create a NodeId from its index in the ring.
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// The index of this node in the ring.
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl From<u32> for NodeId {
    fn from(index: u32) -> Self {
        Self(index)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}
