//! Per-node operational counters.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Operational metrics for one node.
///
/// Counters only grow and start from zero when the node starts. Both node
/// tasks update them without locking.
#[derive(Debug, Default)]
pub struct NodeMetrics {
    /// Tokens decoded from the ring channel.
    pub tokens_received: AtomicU64,
    /// Tokens handed to the transport successfully.
    pub tokens_sent: AtomicU64,
    /// Last tokens re-sent after inbound silence (seeding not included).
    pub regenerations: AtomicU64,
    /// Tokens discarded because a drop was pending.
    pub tokens_discarded: AtomicU64,
    /// Free tokens claimed for a queued message.
    pub messages_claimed: AtomicU64,
    /// Messages that reached this node as their destination.
    pub messages_delivered: AtomicU64,
    /// Notifications that returned to this node as origin.
    pub acknowledgments: AtomicU64,
    /// Datagrams that failed to decode (either channel).
    pub decode_errors: AtomicU64,
    /// Transmissions the transport refused.
    pub send_errors: AtomicU64,
    /// Service commands applied.
    pub commands_accepted: AtomicU64,
    /// Service commands refused.
    pub commands_rejected: AtomicU64,
}

impl NodeMetrics {
    /// Increment a counter by one.
    pub(crate) fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Copy the current values.
    pub fn snapshot(&self) -> MetricsSnapshot {
        let load = |c: &AtomicU64| c.load(Ordering::Relaxed);
        MetricsSnapshot {
            tokens_received: load(&self.tokens_received),
            tokens_sent: load(&self.tokens_sent),
            regenerations: load(&self.regenerations),
            tokens_discarded: load(&self.tokens_discarded),
            messages_claimed: load(&self.messages_claimed),
            messages_delivered: load(&self.messages_delivered),
            acknowledgments: load(&self.acknowledgments),
            decode_errors: load(&self.decode_errors),
            send_errors: load(&self.send_errors),
            commands_accepted: load(&self.commands_accepted),
            commands_rejected: load(&self.commands_rejected),
        }
    }
}

/// Plain copy of [`NodeMetrics`] at one point in time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct MetricsSnapshot {
    pub tokens_received: u64,
    pub tokens_sent: u64,
    pub regenerations: u64,
    pub tokens_discarded: u64,
    pub messages_claimed: u64,
    pub messages_delivered: u64,
    pub acknowledgments: u64,
    pub decode_errors: u64,
    pub send_errors: u64,
    pub commands_accepted: u64,
    pub commands_rejected: u64,
}

impl fmt::Display for MetricsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rx={} tx={} regen={} discarded={} claimed={} delivered={} acked={} \
             decode_errors={} send_errors={} commands={}/{}",
            self.tokens_received,
            self.tokens_sent,
            self.regenerations,
            self.tokens_discarded,
            self.messages_claimed,
            self.messages_delivered,
            self.acknowledgments,
            self.decode_errors,
            self.send_errors,
            self.commands_accepted,
            self.commands_rejected,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_reflects_counters() {
        let metrics = NodeMetrics::default();
        NodeMetrics::bump(&metrics.tokens_sent);
        NodeMetrics::bump(&metrics.tokens_sent);
        NodeMetrics::bump(&metrics.regenerations);

        let snap = metrics.snapshot();
        assert_eq!(snap.tokens_sent, 2);
        assert_eq!(snap.regenerations, 1);
        assert_eq!(snap.tokens_received, 0);
    }

    #[test]
    fn snapshot_display_is_one_line() {
        let snap = MetricsSnapshot {
            tokens_sent: 5,
            commands_accepted: 2,
            commands_rejected: 1,
            ..Default::default()
        };
        let text = snap.to_string();
        assert!(!text.contains('\n'));
        assert!(text.contains("tx=5"));
        assert!(text.contains("commands=2/1"));
    }
}
