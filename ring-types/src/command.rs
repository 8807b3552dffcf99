//! Service commands sent to a node's administrative channel.

use serde::{Deserialize, Serialize};

use crate::{CodecError, NodeId};

/// Command discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    /// Queue an outgoing message at the addressed node
    Enqueue,
    /// Make the addressed node discard the next token it receives
    SimulateDrop,
}

/// An out-of-band control message from an external controller.
///
/// Consumed immediately by the addressed node, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceCommand {
    /// What to do
    pub kind: CommandKind,
    /// Destination of the queued message (only meaningful for `Enqueue`)
    #[serde(deserialize_with = "Option::deserialize")]
    pub destination: Option<NodeId>,
    /// Payload of the queued message (only meaningful for `Enqueue`)
    pub payload: String,
}

impl ServiceCommand {
    /// Queue `payload` for delivery to `destination`.
    pub fn enqueue(destination: NodeId, payload: impl Into<String>) -> Self {
        Self {
            kind: CommandKind::Enqueue,
            destination: Some(destination),
            payload: payload.into(),
        }
    }

    /// Discard the next token that arrives.
    pub fn simulate_drop() -> Self {
        Self {
            kind: CommandKind::SimulateDrop,
            destination: None,
            payload: String::new(),
        }
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
