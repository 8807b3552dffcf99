//! Token - the single mobile unit of the ring protocol.

use serde::{Deserialize, Serialize};

use crate::{CodecError, NodeId};

/// What a token currently carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    /// Free token, available for any node to claim
    Empty,
    /// Carries an application payload toward its destination
    Message,
    /// Delivery acknowledgment returning to the message's originator
    Notification,
}

/// The token circulating around the ring.
///
/// Every node that receives a token rewrites it according to the transition
/// table and sends it on to its successor, unless told to drop it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// What the token carries
    pub kind: TokenKind,
    /// Node that most recently transmitted this token (updated every hop)
    pub sender: NodeId,
    /// Node that created the carried payload
    pub origin: NodeId,
    /// Logical target; `None` for tokens addressed nowhere
    #[serde(deserialize_with = "Option::deserialize")]
    pub destination: Option<NodeId>,
    /// Opaque payload, empty for [`TokenKind::Empty`]
    pub payload: String,
}

impl Token {
    /// A free token stamped by `node` and addressed nowhere.
    pub fn empty(node: NodeId) -> Self {
        Self {
            kind: TokenKind::Empty,
            sender: node,
            origin: node,
            destination: None,
            payload: String::new(),
        }
    }

    /// A token carrying `payload` from `origin` to `destination`.
    pub fn message(origin: NodeId, destination: NodeId, payload: impl Into<String>) -> Self {
        Self {
            kind: TokenKind::Message,
            sender: origin,
            origin,
            destination: Some(destination),
            payload: payload.into(),
        }
    }

    /// A delivery acknowledgment from `origin` back to `destination`.
    pub fn notification(origin: NodeId, destination: NodeId, payload: impl Into<String>) -> Self {
        Self {
            kind: TokenKind::Notification,
            sender: origin,
            origin,
            destination: Some(destination),
            payload: payload.into(),
        }
    }

    /// Returns true if the token is free.
    pub fn is_empty(&self) -> bool {
        self.kind == TokenKind::Empty
    }

    /// Returns true if the token is logically addressed to `node`.
    pub fn is_for(&self, node: NodeId) -> bool {
        self.destination == Some(node)
    }

    /// Serialize to JSON bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, CodecError> {
        serde_json::to_vec(self).map_err(CodecError::Encode)
    }

    /// Deserialize from JSON bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CodecError> {
        serde_json::from_slice(bytes).map_err(CodecError::Decode)
    }
}
