//! Error types for subscription listener tasks.

use thiserror::Error;

use crate::transport::TransportError;

/// Why a subscription stopped delivering messages.
///
/// Every variant is fatal to the subscription and closes its channel.
#[derive(Debug, Error)]
pub enum SubscriptionError {
    /// Opening or reading the message stream failed.
    #[error("message stream failed")]
    Transport(#[from] TransportError),

    /// A message payload was not valid JSON.
    #[error("message {seq} has an invalid payload")]
    Decode {
        seq: String,
        #[source]
        source: serde_json::Error,
    },

    /// The message handler panicked.
    #[error("message handler panicked")]
    HandlerPanic,
}
