//! In-memory transport for unit tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use futures::stream;

use super::{MessageStream, Transport, TransportError};
use crate::acts_proto::{Message, MessageOptions};

/// How the mock answers unary calls.
pub(crate) enum Reply {
    /// Reply with the request's `data`.
    Echo,
    /// Reply with fixed bytes.
    Data(&'static [u8]),
    /// Fail every non-ack call with the given status message.
    Fail(&'static str),
    /// Fail only acknowledgments, echo everything else.
    FailAcks,
}

pub(crate) struct MockTransport {
    reply: Reply,
    requests: Mutex<Vec<Message>>,
    filters: Mutex<Vec<MessageOptions>>,
    script: Mutex<Option<Vec<Result<Message, TransportError>>>>,
    closed: AtomicBool,
    /// Ordered log of acknowledgments (`ack:<seq>`), shared with test handlers.
    pub(crate) events: Arc<Mutex<Vec<String>>>,
}

impl MockTransport {
    pub(crate) fn new(reply: Reply) -> Self {
        Self {
            reply,
            requests: Mutex::new(Vec::new()),
            filters: Mutex::new(Vec::new()),
            script: Mutex::new(None),
            closed: AtomicBool::new(false),
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Items the next opened stream yields, in order. The stream ends after the last one.
    pub(crate) fn with_stream(self, items: Vec<Result<Message, TransportError>>) -> Self {
        *self.script.lock().unwrap() = Some(items);
        self
    }

    pub(crate) fn requests(&self) -> Vec<Message> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn filters(&self) -> Vec<MessageOptions> {
        self.filters.lock().unwrap().clone()
    }
}

pub(crate) fn stream_message(seq: &str, json: &str) -> Message {
    Message {
        seq: seq.to_string(),
        data: Some(Bytes::copy_from_slice(json.as_bytes())),
        ..Default::default()
    }
}

#[tonic::async_trait]
impl Transport for MockTransport {
    async fn unary(&self, request: Message) -> Result<Message, TransportError> {
        if self.is_closed() {
            return Err(TransportError::Closed);
        }

        self.requests.lock().unwrap().push(request.clone());

        if let Some(target) = &request.ack {
            self.events.lock().unwrap().push(format!("ack:{target}"));
        }

        let data = match (&self.reply, request.ack.is_some()) {
            (Reply::FailAcks, true) => {
                return Err(tonic::Status::internal("ack rejected").into());
            }
            (Reply::Fail(message), false) => {
                return Err(tonic::Status::unavailable(*message).into());
            }
            (Reply::Data(bytes), false) => Some(Bytes::from_static(*bytes)),
            _ => request.data,
        };

        Ok(Message {
            seq: request.seq,
            data,
            ..Default::default()
        })
    }

    async fn open_stream(&self, filter: MessageOptions) -> Result<MessageStream, TransportError> {
        if self.is_closed() {
            return Err(TransportError::Closed);
        }

        self.filters.lock().unwrap().push(filter);
        let items = self.script.lock().unwrap().take().unwrap_or_default();
        Ok(Box::pin(stream::iter(items)))
    }

    fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}
