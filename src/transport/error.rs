//! Error types for the transport boundary.

use thiserror::Error;

/// A failed unary or streaming call.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The server or the gRPC stack rejected the call.
    #[error("gRPC error: {0}")]
    Status(#[from] tonic::Status),

    /// The channel was closed before or during the call.
    #[error("channel closed")]
    Closed,
}

impl TransportError {
    /// Best-effort readable cause.
    ///
    /// Prefers the status message the server attached to the call, falling back to the
    /// rendered error.
    pub fn detail(&self) -> String {
        match self {
            Self::Status(status) if !status.message().is_empty() => status.message().to_string(),
            other => other.to_string(),
        }
    }
}
