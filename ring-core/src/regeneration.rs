//! Token regeneration policy.
//!
//! A node gets no acknowledgment from its successor. It infers that the
//! token may have been lost from its own inbound silence, and re-sends the
//! last token it transmitted. The decision lives behind
//! [`RegenerationPolicy`] so it can be exercised with synthetic timestamps.

use ring_types::Token;
use std::time::Duration;

/// Decides whether a silent node should re-inject its last token.
pub trait RegenerationPolicy {
    /// `waiting` is true while the node's last send has not been followed
    /// by any arrival; `elapsed` is the time since that send.
    fn should_regenerate(&self, waiting: bool, elapsed: Duration, last_sent: &Token) -> bool;
}

/// Regenerate once the node has been silent for longer than `timeout`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SilenceTimeout {
    /// Silence threshold (the receive timeout).
    pub timeout: Duration,
}

impl SilenceTimeout {
    /// Create a policy with the given threshold.
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl RegenerationPolicy for SilenceTimeout {
    fn should_regenerate(&self, waiting: bool, elapsed: Duration, _last_sent: &Token) -> bool {
        waiting && elapsed > self.timeout
    }
}
