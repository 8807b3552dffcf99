//! # ring-types
//!
//! Wire format types for the tokenring protocol.
//!
//! This crate provides the foundational types used across all tokenring crates:
//! - [`NodeId`] - Position of a node in the ring
//! - [`Token`] - The single mobile unit circulating between nodes
//! - [`ServiceCommand`] - Out-of-band control messages for a node
//! - [`CodecError`] - Encode/decode errors
//!
//! Both wire entities are encoded as JSON records so that traffic can be
//! inspected with ordinary tools (`tcpdump -A`, `nc -u`).

#![warn(missing_docs)]
#![warn(clippy::all)]

mod command;
mod error;
mod ids;
mod token;

pub use command::{CommandKind, ServiceCommand};
pub use error::CodecError;
pub use ids::NodeId;
pub use token::{Token, TokenKind};
