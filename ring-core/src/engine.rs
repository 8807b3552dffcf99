//! Protocol engine state machine for tokenring.
//!
//! This module provides a pure, side-effect-free state machine for one node
//! of the ring. It decides what to do with every arriving token and when a
//! silent node should re-inject its last token.
//!
//! The actual I/O (receiving with a timeout, holding the token, sending to
//! the successor) is performed by ring-node, not by this module. Time is
//! passed in as [`Instant`] values, so tests can run on a synthetic clock.
//!
//! One receive attempt maps onto the engine like this:
//!
//! ```text
//! timeout ──► on_silence() ──► Some(resend) ──► send ──┐
//!                                                      │
//! token ──► on_arrival(drop) ──► Discard               │
//!                           └──► Process ──► hold ──► transition() ──► send ──► record_sent()
//! ```

use ring_types::{NodeId, Token, TokenKind};
use std::time::Instant;

use crate::queue::QueuedMessage;
use crate::regeneration::RegenerationPolicy;
use crate::topology::{Ring, TopologyError};

/// Payload of the delivery acknowledgment sent back to a message's origin.
pub const REPLY_PAYLOAD: &str = "reply";

/// Per-node protocol state - NO I/O, just bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeState {
    /// True after this node sent a token and has not received anything since.
    pub waiting_for_echo: bool,
    /// Copy of the most recently transmitted token, kept for regeneration.
    pub last_sent_token: Token,
    /// When `last_sent_token` went out (`None` before the first send).
    pub last_sent_at: Option<Instant>,
    /// One-shot flag: seed the ring on the first silent receive attempt.
    pub initiator: bool,
}

impl NodeState {
    fn new(node: NodeId, initiator: bool) -> Self {
        Self {
            waiting_for_echo: false,
            last_sent_token: Token::empty(node),
            last_sent_at: None,
            initiator,
        }
    }
}

/// Outcome of a token arrival, before the hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arrival {
    /// A drop was pending: hold, then forward nothing.
    Discard,
    /// Hold, then apply the transition table.
    Process,
}

/// Why a silent node re-sent its last token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResendReason {
    /// The designated initiator seeding the ring.
    Seed,
    /// The regeneration policy inferred a lost token.
    Silence,
}

/// A token re-sent unchanged after inbound silence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resend {
    /// Copy of the last sent token.
    pub token: Token,
    /// What triggered the resend.
    pub reason: ResendReason,
}

/// Which row of the transition table produced an outgoing token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Free token claimed for a queued message.
    Claimed,
    /// Free token passed on, nothing queued.
    Passed,
    /// Busy token addressed elsewhere, relayed with only `sender` updated.
    Relayed,
    /// Message reached its destination; acknowledgment issued.
    Delivered,
    /// Notification returned to its origin; token freed.
    Acknowledged,
}

/// The token to transmit after a processed arrival.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outgoing {
    /// Token for the successor.
    pub token: Token,
    /// Transition that produced it.
    pub effect: Effect,
}

/// Protocol engine for a single node.
#[derive(Debug, Clone)]
pub struct Engine {
    node: NodeId,
    successor: NodeId,
    state: NodeState,
}

impl Engine {
    /// Create the engine for `node` in `ring`.
    ///
    /// Exactly one node per ring should be created with `initiator = true`.
    pub fn new(node: NodeId, ring: &Ring, initiator: bool) -> Result<Self, TopologyError> {
        Ok(Self {
            node,
            successor: ring.successor(node)?,
            state: NodeState::new(node, initiator),
        })
    }

    /// This node's id.
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// The node every transmission goes to.
    pub fn successor(&self) -> NodeId {
        self.successor
    }

    /// Current protocol state.
    pub fn state(&self) -> &NodeState {
        &self.state
    }

    /// A receive attempt timed out.
    ///
    /// Returns the token to re-send if this node is the initiator on its
    /// first silent attempt, or if `policy` infers the token was lost. The
    /// resend is recorded as sent at `now`.
    pub fn on_silence<P>(&mut self, now: Instant, policy: &P) -> Option<Resend>
    where
        P: RegenerationPolicy + ?Sized,
    {
        let elapsed = self
            .state
            .last_sent_at
            .map(|at| now.saturating_duration_since(at))
            .unwrap_or_default();

        let reason = if self.state.initiator {
            ResendReason::Seed
        } else if policy.should_regenerate(
            self.state.waiting_for_echo,
            elapsed,
            &self.state.last_sent_token,
        ) {
            ResendReason::Silence
        } else {
            return None;
        };

        self.state.initiator = false;
        let token = self.state.last_sent_token.clone();
        self.record_sent(token.clone(), now);

        Some(Resend { token, reason })
    }

    /// A token arrived. `drop_pending` is the (already cleared) drop flag.
    pub fn on_arrival(&mut self, drop_pending: bool) -> Arrival {
        self.state.waiting_for_echo = false;
        if drop_pending {
            Arrival::Discard
        } else {
            Arrival::Process
        }
    }

    /// Apply the transition table to an arrived token.
    ///
    /// `next_message` is called at most once, and only for free tokens, so
    /// the caller can lock its queue for exactly one dequeue.
    pub fn transition<F>(&self, token: &Token, next_message: F) -> Outgoing
    where
        F: FnOnce() -> Option<QueuedMessage>,
    {
        let me = self.node;

        match token.kind {
            TokenKind::Empty => match next_message() {
                Some(msg) => Outgoing {
                    token: Token::message(me, msg.destination, msg.payload),
                    effect: Effect::Claimed,
                },
                None => Outgoing {
                    token: Token::empty(me),
                    effect: Effect::Passed,
                },
            },
            _ if !token.is_for(me) => Outgoing {
                token: Token {
                    sender: me,
                    ..token.clone()
                },
                effect: Effect::Relayed,
            },
            TokenKind::Notification => Outgoing {
                token: Token::empty(me),
                effect: Effect::Acknowledged,
            },
            TokenKind::Message => Outgoing {
                token: Token::notification(me, token.origin, REPLY_PAYLOAD),
                effect: Effect::Delivered,
            },
        }
    }

    /// Remember a transmitted token for regeneration.
    pub fn record_sent(&mut self, token: Token, now: Instant) {
        self.state.last_sent_token = token;
        self.state.last_sent_at = Some(now);
        self.state.waiting_for_echo = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::{Control, OutboundQueue};
    use crate::regeneration::SilenceTimeout;
    use std::collections::VecDeque;
    use std::time::Duration;

    const T_RECV: Duration = Duration::from_secs(1);

    fn n(i: u32) -> NodeId {
        NodeId::new(i)
    }

    fn engine(node: u32, size: u32, initiator: bool) -> Engine {
        Engine::new(n(node), &Ring::new(size).unwrap(), initiator).unwrap()
    }

    fn nothing_queued() -> Option<QueuedMessage> {
        None
    }

    // ===========================================
    // Initial state
    // ===========================================

    #[test]
    fn starts_idle_with_empty_last_token() {
        let engine = engine(1, 3, false);
        let state = engine.state();

        assert!(!state.waiting_for_echo);
        assert!(!state.initiator);
        assert_eq!(state.last_sent_at, None);
        assert_eq!(state.last_sent_token, Token::empty(n(1)));
        assert_eq!(engine.successor(), n(2));
    }

    #[test]
    fn engine_rejects_node_outside_ring() {
        let ring = Ring::new(2).unwrap();
        assert!(Engine::new(n(2), &ring, false).is_err());
    }

    // ===========================================
    // Silence handling
    // ===========================================

    #[test]
    fn initiator_seeds_once() {
        let mut engine = engine(0, 3, true);
        let policy = SilenceTimeout::new(T_RECV);
        let t0 = Instant::now();

        let resend = engine.on_silence(t0, &policy).unwrap();
        assert_eq!(resend.reason, ResendReason::Seed);
        assert_eq!(resend.token, Token::empty(n(0)));
        assert!(engine.state().waiting_for_echo);
        assert!(!engine.state().initiator);

        // Second silent attempt, still within the timeout: nothing
        assert!(engine.on_silence(t0 + T_RECV, &policy).is_none());
    }

    #[test]
    fn idle_node_never_regenerates() {
        let mut engine = engine(1, 3, false);
        let policy = SilenceTimeout::new(T_RECV);
        let t0 = Instant::now();

        for secs in 1..10 {
            assert!(engine
                .on_silence(t0 + Duration::from_secs(secs), &policy)
                .is_none());
        }
    }

    #[test]
    fn waiting_node_regenerates_after_timeout() {
        let mut engine = engine(0, 2, false);
        let policy = SilenceTimeout::new(T_RECV);
        let t0 = Instant::now();
        let sent = Token::message(n(0), n(1), "data");
        engine.record_sent(sent.clone(), t0);

        assert!(engine.on_silence(t0 + T_RECV, &policy).is_none());

        let later = t0 + T_RECV + Duration::from_millis(1);
        let resend = engine.on_silence(later, &policy).unwrap();
        assert_eq!(resend.reason, ResendReason::Silence);
        assert_eq!(resend.token, sent);
        assert_eq!(engine.state().last_sent_at, Some(later));

        // The resend restarts the silence window
        assert!(engine.on_silence(later + T_RECV, &policy).is_none());
    }

    #[test]
    fn arrival_stops_waiting() {
        let mut engine = engine(0, 2, false);
        let policy = SilenceTimeout::new(T_RECV);
        let t0 = Instant::now();
        engine.record_sent(Token::empty(n(0)), t0);

        assert_eq!(engine.on_arrival(false), Arrival::Process);
        assert!(!engine.state().waiting_for_echo);
        assert!(engine.on_silence(t0 + T_RECV * 5, &policy).is_none());
    }

    #[test]
    fn late_duplicate_after_regeneration_is_forwarded() {
        let policy = SilenceTimeout::new(T_RECV);
        let t0 = Instant::now();
        let original = Token::empty(n(0));

        let mut sender = engine(0, 2, false);
        sender.record_sent(original.clone(), t0);
        let resend = sender.on_silence(t0 + T_RECV * 2, &policy).unwrap();
        assert_eq!(resend.token, original);

        // The successor gets the regenerated copy, then the delayed original.
        // Nothing tells them apart, so both are passed on.
        let mut receiver = engine(1, 2, false);
        for copy in [&resend.token, &original] {
            assert_eq!(receiver.on_arrival(false), Arrival::Process);
            let out = receiver.transition(copy, nothing_queued);
            assert_eq!(out.effect, Effect::Passed);
            assert_eq!(out.token, Token::empty(n(1)));
        }
    }

    struct Never;

    impl RegenerationPolicy for Never {
        fn should_regenerate(&self, _: bool, _: Duration, _: &Token) -> bool {
            false
        }
    }

    #[test]
    fn custom_policy_is_consulted() {
        let mut engine = engine(0, 2, false);
        let t0 = Instant::now();
        engine.record_sent(Token::empty(n(0)), t0);

        assert!(engine.on_silence(t0 + T_RECV * 100, &Never).is_none());
    }

    #[test]
    fn seed_ignores_policy() {
        let mut engine = engine(0, 2, true);
        let resend = engine.on_silence(Instant::now(), &Never).unwrap();
        assert_eq!(resend.reason, ResendReason::Seed);
    }

    // ===========================================
    // Drop handling
    // ===========================================

    #[test]
    fn drop_discards_exactly_one_arrival() {
        let mut engine = engine(1, 2, false);
        let mut control = Control::default();
        control.request_drop();

        assert_eq!(engine.on_arrival(control.take_drop()), Arrival::Discard);
        assert!(!control.drop_pending);
        assert_eq!(engine.on_arrival(control.take_drop()), Arrival::Process);
    }

    // ===========================================
    // Transition table
    // ===========================================

    #[test]
    fn empty_token_with_queue_is_claimed() {
        let engine = engine(0, 3, false);
        let out = engine.transition(&Token::empty(n(2)), || {
            Some(QueuedMessage::new(n(2), "data_1"))
        });

        assert_eq!(out.effect, Effect::Claimed);
        assert_eq!(
            out.token,
            Token {
                kind: TokenKind::Message,
                sender: n(0),
                origin: n(0),
                destination: Some(n(2)),
                payload: "data_1".into(),
            }
        );
    }

    #[test]
    fn empty_token_without_queue_is_passed() {
        let engine = engine(1, 3, false);
        let out = engine.transition(&Token::empty(n(0)), nothing_queued);

        assert_eq!(out.effect, Effect::Passed);
        assert_eq!(out.token, Token::empty(n(1)));
    }

    #[test]
    fn busy_token_for_other_node_is_relayed() {
        let engine = engine(1, 3, false);
        let incoming = Token::message(n(0), n(2), "data_1");
        let out = engine.transition(&incoming, || panic!("queue must not be consulted"));

        assert_eq!(out.effect, Effect::Relayed);
        assert_eq!(out.token.kind, TokenKind::Message);
        assert_eq!(out.token.sender, n(1));
        assert_eq!(out.token.origin, n(0));
        assert_eq!(out.token.destination, Some(n(2)));
        assert_eq!(out.token.payload, "data_1");
    }

    #[test]
    fn notification_for_other_node_is_relayed() {
        let engine = engine(1, 3, false);
        let incoming = Token::notification(n(2), n(0), REPLY_PAYLOAD);
        let out = engine.transition(&incoming, nothing_queued);

        assert_eq!(out.effect, Effect::Relayed);
        assert_eq!(out.token.kind, TokenKind::Notification);
        assert_eq!(out.token.sender, n(1));
        assert_eq!(out.token.origin, n(2));
    }

    #[test]
    fn message_for_self_becomes_notification() {
        let engine = engine(2, 3, false);
        let mut incoming = Token::message(n(0), n(2), "data_1");
        incoming.sender = n(1);
        let out = engine.transition(&incoming, || panic!("queue must not be consulted"));

        assert_eq!(out.effect, Effect::Delivered);
        assert_eq!(
            out.token,
            Token {
                kind: TokenKind::Notification,
                sender: n(2),
                origin: n(2),
                destination: Some(n(0)),
                payload: "reply".into(),
            }
        );
    }

    #[test]
    fn notification_for_self_frees_token() {
        let engine = engine(0, 3, false);
        let incoming = Token::notification(n(2), n(0), REPLY_PAYLOAD);
        let out = engine.transition(&incoming, || panic!("queue must not be consulted"));

        assert_eq!(out.effect, Effect::Acknowledged);
        assert_eq!(out.token, Token::empty(n(0)));
    }

    #[test]
    fn busy_token_without_destination_keeps_circulating() {
        let engine = engine(0, 3, false);
        let incoming = Token {
            kind: TokenKind::Message,
            sender: n(2),
            origin: n(1),
            destination: None,
            payload: "lost".into(),
        };
        let out = engine.transition(&incoming, nothing_queued);
        assert_eq!(out.effect, Effect::Relayed);
    }

    #[test]
    fn queue_is_drained_in_fifo_order() {
        let engine = engine(0, 3, false);
        let mut control = Control::new(OutboundQueue::new(8));
        control.enqueue(QueuedMessage::new(n(1), "p1")).unwrap();
        control.enqueue(QueuedMessage::new(n(2), "p2")).unwrap();

        let first = engine.transition(&Token::empty(n(2)), || control.next_message());
        let second = engine.transition(&Token::empty(n(2)), || control.next_message());

        assert_eq!(first.token, Token::message(n(0), n(1), "p1"));
        assert_eq!(second.token, Token::message(n(0), n(2), "p2"));
        assert!(control.queue.is_empty());
    }

    #[test]
    fn claimed_message_to_self_travels_full_circle() {
        // A message destined for its own origin is delivered only after a
        // full lap, then acknowledged after a second one.
        let engine = engine(0, 2, false);
        let out = engine.transition(&Token::empty(n(1)), || {
            Some(QueuedMessage::new(n(0), "loop"))
        });
        assert_eq!(out.token.destination, Some(n(0)));

        let delivered = engine.transition(&out.token, nothing_queued);
        assert_eq!(delivered.effect, Effect::Delivered);
        assert_eq!(delivered.token.destination, Some(n(0)));

        let freed = engine.transition(&delivered.token, nothing_queued);
        assert_eq!(freed.effect, Effect::Acknowledged);
    }

    // ===========================================
    // Whole-ring runs on a synthetic clock
    // ===========================================

    /// Deterministic single-token ring: one receive attempt per tick.
    struct SimRing {
        engines: Vec<Engine>,
        controls: Vec<Control>,
        inboxes: Vec<VecDeque<Token>>,
        policy: SilenceTimeout,
        now: Instant,
        wire: Vec<(NodeId, NodeId, Token)>,
    }

    impl SimRing {
        fn new(size: u32) -> Self {
            let ring = Ring::new(size).unwrap();
            Self {
                engines: ring
                    .nodes()
                    .map(|node| Engine::new(node, &ring, node.index() == 0).unwrap())
                    .collect(),
                controls: ring.nodes().map(|_| Control::default()).collect(),
                inboxes: ring.nodes().map(|_| VecDeque::new()).collect(),
                policy: SilenceTimeout::new(T_RECV),
                now: Instant::now(),
                wire: Vec::new(),
            }
        }

        fn send(&mut self, from: usize, token: Token) {
            let to = self.engines[from].successor();
            self.wire.push((n(from as u32), to, token.clone()));
            self.inboxes[to.index() as usize].push_back(token);
        }

        /// Advance one receive timeout; every node makes one attempt.
        fn tick(&mut self) {
            self.now += T_RECV;
            for i in 0..self.engines.len() {
                match self.inboxes[i].pop_front() {
                    None => {
                        let resend = self.engines[i].on_silence(self.now, &self.policy);
                        if let Some(resend) = resend {
                            self.send(i, resend.token);
                        }
                    }
                    Some(token) => {
                        let dropped = self.controls[i].take_drop();
                        if self.engines[i].on_arrival(dropped) == Arrival::Discard {
                            continue;
                        }
                        let control = &mut self.controls[i];
                        let out = self.engines[i].transition(&token, || control.next_message());
                        self.engines[i].record_sent(out.token.clone(), self.now);
                        self.send(i, out.token);
                    }
                }
            }
        }
    }

    #[test]
    fn idle_ring_circulates_empty_tokens() {
        let mut ring = SimRing::new(3);
        for _ in 0..12 {
            ring.tick();
        }

        assert!(ring.wire.len() >= 9);
        assert!(ring.wire.iter().all(|(_, _, t)| t.kind == TokenKind::Empty));
        for (from, to, token) in &ring.wire {
            assert_eq!(token.sender, *from);
            assert_eq!(to.index(), (from.index() + 1) % 3);
        }
    }

    #[test]
    fn queued_message_completes_a_round_trip() {
        let mut ring = SimRing::new(3);
        ring.controls[0]
            .enqueue(QueuedMessage::new(n(2), "data_1"))
            .unwrap();

        for _ in 0..12 {
            ring.tick();
        }

        let kinds: Vec<(u32, TokenKind)> = ring
            .wire
            .iter()
            .map(|(from, _, t)| (from.index(), t.kind))
            .collect();

        let start = kinds
            .iter()
            .position(|k| *k == (0, TokenKind::Message))
            .unwrap();
        assert_eq!(
            &kinds[start..start + 4],
            &[
                (0, TokenKind::Message),
                (1, TokenKind::Message),
                (2, TokenKind::Notification),
                (0, TokenKind::Empty),
            ]
        );
        assert_eq!(
            ring.wire[start + 2].2,
            Token::notification(n(2), n(0), REPLY_PAYLOAD)
        );
    }

    #[test]
    fn dropped_token_is_regenerated_by_sender() {
        let mut ring = SimRing::new(2);
        ring.controls[1].request_drop();

        for _ in 0..8 {
            ring.tick();
        }

        // Node 0 seeds, node 1 discards, node 0 re-sends after its silence
        // exceeds the timeout, then the ring carries on.
        assert_eq!(ring.wire[0].0, n(0));
        assert_eq!(ring.wire[1].0, n(0));
        assert_eq!(ring.wire[1].2, ring.wire[0].2);
        assert!(ring.wire.iter().any(|(from, _, _)| *from == n(1)));
        assert!(!ring.controls[1].drop_pending);
    }
}
