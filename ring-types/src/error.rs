//! Error types for the tokenring wire format.

use thiserror::Error;

/// Errors that can occur while encoding or decoding wire entities.
#[derive(Debug, Error)]
pub enum CodecError {
    /// JSON serialization failed
    #[error("serialization failed: {0}")]
    Encode(#[source] serde_json::Error),

    /// JSON deserialization failed (malformed, truncated or incomplete record)
    #[error("deserialization failed: {0}")]
    Decode(#[source] serde_json::Error),
}
