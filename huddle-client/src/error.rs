//! Error types for huddle-client

use thiserror::Error;

/// Errors surfaced by the session client
///
/// Connection drops are not errors; they only schedule a reconnection.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Invalid origin {origin:?}: {reason}")]
    InvalidOrigin { origin: String, reason: String },

    #[error("Failed to connect to {url}")]
    Connect {
        url: String,
        #[source]
        source: tokio_tungstenite::tungstenite::Error,
    },
}
