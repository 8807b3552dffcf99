//! Ring topology.
//!
//! Every node forwards to exactly one successor, `(node + 1) mod n_nodes`.
//! The relation is fixed for the lifetime of the ring. A token's
//! `destination` field is logical only and never picks a physical peer.

use ring_types::NodeId;
use thiserror::Error;

/// Invalid ring configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TopologyError {
    /// A ring needs at least one node.
    #[error("ring must contain at least one node")]
    EmptyRing,

    /// Node index is outside `0..size`.
    #[error("node {node} is outside a ring of {size} nodes")]
    NodeOutOfRange {
        /// The offending node.
        node: NodeId,
        /// Number of nodes in the ring.
        size: u32,
    },
}

/// Successor of `node` in a ring of `n_nodes` nodes.
pub fn successor(n_nodes: u32, node: NodeId) -> Result<NodeId, TopologyError> {
    Ring::new(n_nodes)?.successor(node)
}

/// A validated ring of `size` nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ring {
    size: u32,
}

impl Ring {
    /// Create a ring, rejecting `size == 0`.
    pub fn new(size: u32) -> Result<Self, TopologyError> {
        if size == 0 {
            return Err(TopologyError::EmptyRing);
        }
        Ok(Self { size })
    }

    /// Number of nodes.
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Check whether `node` belongs to this ring.
    pub fn contains(&self, node: NodeId) -> bool {
        node.index() < self.size
    }

    /// The node that `node` forwards to.
    pub fn successor(&self, node: NodeId) -> Result<NodeId, TopologyError> {
        if !self.contains(node) {
            return Err(TopologyError::NodeOutOfRange {
                node,
                size: self.size,
            });
        }
        // node < size, so node + 1 <= size <= u32::MAX
        Ok(NodeId::new((node.index() + 1) % self.size))
    }

    /// All nodes in index order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> {
        (0..self.size).map(NodeId::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn successor_is_next_index_mod_size() {
        for size in 1..=16u32 {
            for node in 0..size {
                let next = successor(size, NodeId::new(node)).unwrap();
                assert_eq!(next.index(), (node + 1) % size);
            }
        }
    }

    #[test]
    fn successor_cycles_through_every_node_once() {
        for size in 1..=16u32 {
            let ring = Ring::new(size).unwrap();
            let mut seen = HashSet::new();
            let mut current = NodeId::new(0);

            for _ in 0..size {
                assert!(seen.insert(current), "node {} visited twice", current);
                current = ring.successor(current).unwrap();
            }

            assert_eq!(current, NodeId::new(0));
            assert_eq!(seen.len(), size as usize);
        }
    }

    #[test]
    fn single_node_ring_points_to_itself() {
        assert_eq!(successor(1, NodeId::new(0)).unwrap(), NodeId::new(0));
    }

    #[test]
    fn empty_ring_is_rejected() {
        assert_eq!(Ring::new(0), Err(TopologyError::EmptyRing));
        assert_eq!(
            successor(0, NodeId::new(0)),
            Err(TopologyError::EmptyRing)
        );
    }

    #[test]
    fn node_outside_ring_is_rejected() {
        let err = successor(3, NodeId::new(3)).unwrap_err();
        assert_eq!(
            err,
            TopologyError::NodeOutOfRange {
                node: NodeId::new(3),
                size: 3
            }
        );
        assert_eq!(err.to_string(), "node 3 is outside a ring of 3 nodes");
    }

    #[test]
    fn largest_ring_wraps_without_overflow() {
        let ring = Ring::new(u32::MAX).unwrap();
        let last = NodeId::new(u32::MAX - 1);
        assert_eq!(ring.successor(last).unwrap(), NodeId::new(0));
    }

    #[test]
    fn nodes_lists_every_member() {
        let ring = Ring::new(4).unwrap();
        let nodes: Vec<u32> = ring.nodes().map(NodeId::index).collect();
        assert_eq!(nodes, vec![0, 1, 2, 3]);
        assert!(ring.contains(NodeId::new(3)));
        assert!(!ring.contains(NodeId::new(4)));
    }
}
