//! Error types for huddle-core

use thiserror::Error;

/// Errors produced while decoding a protocol frame
///
/// Neither variant is fatal: receivers log and drop the frame.
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("Malformed frame: {0}")]
    MalformedFrame(#[source] serde_json::Error),

    #[error("Unknown message type: {0}")]
    UnknownMessageType(String),
}

impl ProtocolError {
    /// Whether the frame was well-formed but carried a type this side does not know
    pub fn is_unknown_type(&self) -> bool {
        matches!(self, ProtocolError::UnknownMessageType(_))
    }
}
