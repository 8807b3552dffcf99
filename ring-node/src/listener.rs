//! Administrative listener task.
//!
//! Receives [`ServiceCommand`]s on a node's administrative channel and
//! applies them to the shared control block. The listener never touches
//! ring traffic; its only effect on the protocol is through the queue and
//! the drop flag.

use crate::error::CommandError;
use crate::metrics::NodeMetrics;
use crate::node::SharedControl;
use crate::transport::{Transport, TransportError, RECV_ERROR_BACKOFF};
use ring_core::{Control, QueuedMessage, Ring};
use ring_types::{CommandKind, NodeId, ServiceCommand};
use std::sync::Arc;

/// Run the listener until its administrative channel closes.
pub async fn run_listener(
    node: NodeId,
    ring: Ring,
    transport: Arc<dyn Transport>,
    control: SharedControl,
    metrics: Arc<NodeMetrics>,
) {
    tracing::debug!("Node {} admin listener started", node);

    loop {
        let bytes = match transport.recv().await {
            Ok(bytes) => bytes,
            Err(TransportError::Closed) => {
                tracing::info!("Node {} admin channel closed, listener stopping", node);
                return;
            }
            Err(e) => {
                tracing::warn!("Node {} admin receive error: {}", node, e);
                tokio::time::sleep(RECV_ERROR_BACKOFF).await;
                continue;
            }
        };

        let command = match ServiceCommand::from_bytes(&bytes) {
            Ok(command) => command,
            Err(e) => {
                NodeMetrics::bump(&metrics.decode_errors);
                tracing::warn!("Node {} ignored undecodable command: {}", node, e);
                continue;
            }
        };

        let result = {
            let mut control = control.lock().await;
            apply_command(&ring, &mut control, &command)
        };

        match result {
            Ok(()) => {
                NodeMetrics::bump(&metrics.commands_accepted);
                match command.kind {
                    CommandKind::Enqueue => tracing::info!(
                        "Node {} queued message for {:?}: {}",
                        node,
                        command.destination,
                        command.payload
                    ),
                    CommandKind::SimulateDrop => {
                        tracing::info!("Node {} will drop the next token", node)
                    }
                }
            }
            Err(e) => {
                NodeMetrics::bump(&metrics.commands_rejected);
                tracing::warn!("Node {} rejected {:?} command: {}", node, command.kind, e);
            }
        }
    }
}

/// Apply one command to a node's control block.
///
/// # Errors
///
/// Enqueue commands are refused when the destination is missing, outside
/// `ring`, or the queue is full. Drop requests always succeed.
pub fn apply_command(
    ring: &Ring,
    control: &mut Control,
    command: &ServiceCommand,
) -> Result<(), CommandError> {
    match command.kind {
        CommandKind::Enqueue => {
            let destination = command.destination.ok_or(CommandError::MissingDestination)?;
            if !ring.contains(destination) {
                return Err(CommandError::UnknownDestination {
                    destination,
                    size: ring.size(),
                });
            }
            control.enqueue(QueuedMessage::new(destination, command.payload.clone()))?;
        }
        CommandKind::SimulateDrop => control.request_drop(),
    }
    Ok(())
}
