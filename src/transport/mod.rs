//! The boundary between a [`Channel`](crate::Channel) and the wire.
//!
//! A [`Transport`] offers the two calls of the `acts.ActsService` gRPC service plus a close
//! switch. [`GrpcTransport`] is the tonic implementation; anything else implementing the trait
//! (an in-memory double, a proxy) can be wrapped with
//! [`Channel::with_transport`](crate::Channel::with_transport).
//!
//! Correlation is carried by the call itself: [`unary`](Transport::unary) resolves with the reply
//! to the request it was given, so no table of in-flight sequence ids is kept. A transport that
//! multiplexes replies out of order would need to keep one, keyed by the request `seq`, inserting
//! on send and removing on the matched reply or a timeout.

pub mod error;
mod grpc;
#[cfg(test)]
pub(crate) mod testing;

use std::pin::Pin;

use futures::Stream;

use crate::acts_proto::{Message, MessageOptions};

pub use self::error::TransportError;
pub use self::grpc::GrpcTransport;

/// Server-pushed messages. Ends with `None` when the server closes the stream cleanly.
pub type MessageStream = Pin<Box<dyn Stream<Item = Result<Message, TransportError>> + Send>>;

#[tonic::async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Send one request and wait for its reply.
    async fn unary(&self, request: Message) -> Result<Message, TransportError>;

    /// Open the server stream for the given filter.
    async fn open_stream(&self, filter: MessageOptions) -> Result<MessageStream, TransportError>;

    /// Release the connection. Calling this more than once is a no-op.
    fn close(&self);

    fn is_closed(&self) -> bool;
}
