use thiserror::Error;

/// A failed action call: the action name that was attempted and a readable cause.
///
/// Every request/response operation on a [`Channel`](crate::Channel) reports failure through
/// this type, whether the transport failed, the channel was closed, or a payload was not
/// valid JSON.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("action '{name}' failed: {error}")]
pub struct ActionError {
    pub name: String,
    pub error: String,
}

impl ActionError {
    pub fn new(name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            error: error.into(),
        }
    }
}

/// Errors raised while establishing a channel to the server.
#[derive(Debug, Error)]
pub enum ConnectError {
    /// The server url could not be parsed.
    #[error("invalid server url '{url}'")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// Only plaintext and TLS gRPC are supported.
    #[error("unsupported url scheme '{0}', expected http or https")]
    UnsupportedScheme(String),

    /// The gRPC endpoint could not be built or connected.
    #[error("gRPC transport error")]
    Transport(#[from] tonic::transport::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_error_display() {
        let err = ActionError::new("model:deploy", "connection refused");
        assert_eq!(
            err.to_string(),
            "action 'model:deploy' failed: connection refused"
        );
    }
}
