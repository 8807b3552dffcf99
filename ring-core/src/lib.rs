//! # ring-core
//!
//! Pure protocol logic for tokenring (no I/O, instant tests).
//!
//! This crate implements the per-node state machine and the structures it
//! works on without any network I/O, sleeping or clock reads, enabling fast
//! unit tests.
//!
//! ## Design Philosophy
//!
//! All modules in this crate are **pure** - they take input and produce output
//! without side effects. This enables:
//! - Instant unit tests (no mocks, no async)
//! - Deterministic behavior (timestamps are parameters, not clock reads)
//! - Easy reasoning about state transitions
//!
//! The actual I/O (datagrams, hold delays, receive timeouts) is performed by
//! `ring-node`, which drives these state machines.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod engine;
pub mod queue;
pub mod regeneration;
pub mod topology;

pub use engine::{Arrival, Effect, Engine, NodeState, Outgoing, Resend, ResendReason, REPLY_PAYLOAD};
pub use queue::{Control, OutboundQueue, QueueError, QueuedMessage};
pub use regeneration::{RegenerationPolicy, SilenceTimeout};
pub use topology::{successor, Ring, TopologyError};
