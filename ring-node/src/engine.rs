//! Protocol engine task.
//!
//! Drives a [`ring_core::Engine`] with real I/O: one receive attempt per
//! iteration, bounded by the receive timeout. Silence (a timeout, an
//! undecodable datagram or a receive error) may trigger seeding or
//! regeneration; an arrival is held for the configured duration, run
//! through the transition table and forwarded to the successor.

use crate::metrics::NodeMetrics;
use crate::node::SharedControl;
use crate::transport::{Transport, TransportError, RECV_ERROR_BACKOFF};
use ring_core::{Arrival, Effect, Engine, ResendReason, SilenceTimeout};
use ring_types::Token;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Timing of the engine loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineSettings {
    /// How long every arriving token is held before it is forwarded.
    pub hold: Duration,
    /// Bound on a single receive attempt.
    pub recv_timeout: Duration,
    /// When a silent node re-sends its last token.
    pub policy: SilenceTimeout,
}

impl EngineSettings {
    /// Settings with the regeneration threshold equal to the receive timeout.
    pub fn new(hold: Duration, recv_timeout: Duration) -> Self {
        Self {
            hold,
            recv_timeout,
            policy: SilenceTimeout::new(recv_timeout),
        }
    }
}

/// Run the engine until its ring channel closes.
pub async fn run_engine(
    mut engine: Engine,
    transport: Arc<dyn Transport>,
    control: SharedControl,
    settings: EngineSettings,
    metrics: Arc<NodeMetrics>,
) {
    let node = engine.node();
    tracing::debug!("Node {} engine started (successor {})", node, engine.successor());

    loop {
        let received = tokio::time::timeout(settings.recv_timeout, transport.recv()).await;

        let token = match received {
            Ok(Ok(bytes)) => match Token::from_bytes(&bytes) {
                Ok(token) => Some(token),
                Err(e) => {
                    NodeMetrics::bump(&metrics.decode_errors);
                    tracing::warn!("Node {} discarded undecodable token: {}", node, e);
                    None
                }
            },
            Ok(Err(TransportError::Closed)) => {
                tracing::info!("Node {} ring channel closed, engine stopping", node);
                return;
            }
            Ok(Err(e)) => {
                tracing::warn!("Node {} receive error: {}", node, e);
                tokio::time::sleep(RECV_ERROR_BACKOFF).await;
                None
            }
            Err(_) => {
                tracing::debug!("Node {} receive timed out", node);
                None
            }
        };

        match token {
            Some(token) => {
                on_token(&mut engine, &*transport, &control, &settings, &metrics, token).await
            }
            None => on_silence(&mut engine, &*transport, &settings, &metrics).await,
        }
    }
}

async fn on_silence(
    engine: &mut Engine,
    transport: &dyn Transport,
    settings: &EngineSettings,
    metrics: &NodeMetrics,
) {
    let node = engine.node();
    let now = Instant::now().into_std();
    let Some(resend) = engine.on_silence(now, &settings.policy) else {
        return;
    };

    match resend.reason {
        ResendReason::Seed => {
            tracing::info!("Node {} seeding the ring with an empty token", node);
        }
        ResendReason::Silence => {
            NodeMetrics::bump(&metrics.regenerations);
            tracing::warn!(
                "Node {} regenerating {:?} token after {:?} of silence",
                node,
                resend.token.kind,
                settings.policy.timeout
            );
        }
    }

    transmit(engine, transport, metrics, &resend.token).await;
}

async fn on_token(
    engine: &mut Engine,
    transport: &dyn Transport,
    control: &SharedControl,
    settings: &EngineSettings,
    metrics: &NodeMetrics,
    token: Token,
) {
    let node = engine.node();
    NodeMetrics::bump(&metrics.tokens_received);
    tracing::debug!(
        "Node {} received {:?} token from {} (origin {}, destination {:?})",
        node,
        token.kind,
        token.sender,
        token.origin,
        token.destination
    );

    let drop_pending = control.lock().await.take_drop();
    let arrival = engine.on_arrival(drop_pending);

    tokio::time::sleep(settings.hold).await;

    if arrival == Arrival::Discard {
        NodeMetrics::bump(&metrics.tokens_discarded);
        tracing::warn!("Node {} dropped {:?} token from {}", node, token.kind, token.sender);
        return;
    }

    let outgoing = {
        let mut control = control.lock().await;
        engine.transition(&token, || control.next_message())
    };

    let out = &outgoing.token;
    match outgoing.effect {
        Effect::Claimed => {
            NodeMetrics::bump(&metrics.messages_claimed);
            tracing::info!(
                "Node {} claimed free token for message to {:?}: {}",
                node,
                out.destination,
                out.payload
            );
        }
        Effect::Passed => {
            tracing::debug!("Node {} passing free token to {}", node, engine.successor());
        }
        Effect::Relayed => {
            tracing::info!(
                "Node {} relaying {:?} token from {} to {:?}",
                node,
                out.kind,
                out.origin,
                out.destination
            );
        }
        Effect::Delivered => {
            NodeMetrics::bump(&metrics.messages_delivered);
            tracing::info!(
                "Node {} received message from {}: {}",
                node,
                token.origin,
                token.payload
            );
        }
        Effect::Acknowledged => {
            NodeMetrics::bump(&metrics.acknowledgments);
            tracing::info!(
                "Node {} got acknowledgment from {}, freeing token",
                node,
                token.origin
            );
        }
    }

    transmit(engine, transport, metrics, out).await;
    engine.record_sent(outgoing.token, Instant::now().into_std());
}

/// Encode and send a token to the successor. Failures are logged only.
async fn transmit(
    engine: &Engine,
    transport: &dyn Transport,
    metrics: &NodeMetrics,
    token: &Token,
) {
    let node = engine.node();
    let successor = engine.successor();

    let bytes = match token.to_bytes() {
        Ok(bytes) => bytes,
        Err(e) => {
            NodeMetrics::bump(&metrics.send_errors);
            tracing::warn!("Node {} failed to encode token: {}", node, e);
            return;
        }
    };

    match transport.send_to(successor, &bytes).await {
        Ok(()) => NodeMetrics::bump(&metrics.tokens_sent),
        Err(e) => {
            NodeMetrics::bump(&metrics.send_errors);
            tracing::warn!("Node {} failed to send token to {}: {}", node, successor, e);
        }
    }
}
