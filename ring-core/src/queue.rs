//! Outbound queue for tokenring.
//!
//! This module provides the per-node FIFO of application messages waiting
//! for a free token, plus the [`Control`] block that bundles the queue with
//! the drop flag. `Control` is the only state a node's administrative
//! listener and its protocol engine share.
//!
//! Messages are enqueued by the listener and dequeued by the engine, one per
//! claimed `Empty` token. Insertion order is delivery-attempt order.

use ring_types::NodeId;
use std::collections::VecDeque;

/// Error type for queue operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueError {
    /// Queue is at capacity.
    Full {
        /// Current queue capacity.
        capacity: usize,
    },
}

impl std::fmt::Display for QueueError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueueError::Full { capacity } => {
                write!(f, "outbound queue full (capacity: {})", capacity)
            }
        }
    }
}

impl std::error::Error for QueueError {}

/// A message waiting for a free token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedMessage {
    /// Node the message is destined for.
    pub destination: NodeId,
    /// Opaque application payload.
    pub payload: String,
}

impl QueuedMessage {
    /// Create a new queued message.
    pub fn new(destination: NodeId, payload: impl Into<String>) -> Self {
        Self {
            destination,
            payload: payload.into(),
        }
    }
}

/// FIFO of pending outgoing messages.
#[derive(Debug, Clone)]
pub struct OutboundQueue {
    /// Maximum number of queued messages (`None` = unbounded).
    capacity: Option<usize>,
    /// Messages waiting for a free token.
    queue: VecDeque<QueuedMessage>,
}

impl OutboundQueue {
    /// Create a queue holding at most `capacity` messages.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: Some(capacity),
            queue: VecDeque::new(),
        }
    }

    /// Create a queue without a size limit.
    pub fn unbounded() -> Self {
        Self {
            capacity: None,
            queue: VecDeque::new(),
        }
    }

    /// Append a message to the back of the queue.
    ///
    /// Returns an error if the queue is at capacity.
    pub fn enqueue(&mut self, msg: QueuedMessage) -> Result<(), QueueError> {
        if let Some(capacity) = self.capacity {
            if self.queue.len() >= capacity {
                return Err(QueueError::Full { capacity });
            }
        }
        self.queue.push_back(msg);
        Ok(())
    }

    /// Remove and return the oldest message.
    pub fn dequeue(&mut self) -> Option<QueuedMessage> {
        self.queue.pop_front()
    }

    /// Number of queued messages.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Check if the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Maximum number of messages, if bounded.
    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }
}

impl Default for OutboundQueue {
    fn default() -> Self {
        Self::unbounded()
    }
}

/// State shared between a node's administrative listener and its engine.
///
/// Every method is a single field access, so callers can keep the lock
/// around it as short as the access itself.
#[derive(Debug, Default)]
pub struct Control {
    /// Messages waiting for a free token.
    pub queue: OutboundQueue,
    /// Discard the next arriving token.
    pub drop_pending: bool,
}

impl Control {
    /// Create a control block around the given queue.
    pub fn new(queue: OutboundQueue) -> Self {
        Self {
            queue,
            drop_pending: false,
        }
    }

    /// Queue a message (listener side).
    pub fn enqueue(&mut self, msg: QueuedMessage) -> Result<(), QueueError> {
        self.queue.enqueue(msg)
    }

    /// Arm the drop flag (listener side).
    pub fn request_drop(&mut self) {
        self.drop_pending = true;
    }

    /// Read and clear the drop flag (engine side).
    pub fn take_drop(&mut self) -> bool {
        std::mem::take(&mut self.drop_pending)
    }

    /// Dequeue the next message (engine side).
    pub fn next_message(&mut self) -> Option<QueuedMessage> {
        self.queue.dequeue()
    }
}
