//! Request/response access to an acts server.
//!
//! A [`Channel`] owns one [`Transport`] and is a cheap handle over it: clones share the same
//! connection, which is how a subscription's listener task and the caller issue calls side by
//! side.
//!
//! ```ignore
//! use acts_channel::Channel;
//! use serde_json::json;
//!
//! let chan = Channel::connect("127.0.0.1:10080").await?;
//!
//! let model = chan.send("model:get", &json!({ "id": "test", "fmt": "tree" })).await?;
//! println!("{}", model["data"]);
//!
//! chan.close();
//! ```

pub mod actions;

use std::sync::Arc;

use bytes::Bytes;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::debug;

use crate::acts_proto::Message;
use crate::config::ChannelConfig;
use crate::error::{ActionError, ConnectError};
use crate::seq::SeqId;
use crate::transport::{GrpcTransport, Transport};

use self::actions::ACK_ACTION;

/// Client handle to an acts server.
pub struct Channel<T = GrpcTransport> {
    transport: Arc<T>,
}

impl<T> Clone for Channel<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Channel<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Channel")
            .field("transport", &self.transport)
            .finish()
    }
}

impl Channel<GrpcTransport> {
    /// Connect to the server at `url` with default settings.
    pub async fn connect(url: &str) -> Result<Self, ConnectError> {
        Self::connect_with(ChannelConfig::from(url)).await
    }

    /// Connect using an explicit configuration.
    pub async fn connect_with(config: ChannelConfig) -> Result<Self, ConnectError> {
        let transport = GrpcTransport::connect(&config).await?;
        Ok(Self::with_transport(transport))
    }
}

impl<T: Transport> Channel<T> {
    /// Wrap an existing transport.
    pub fn with_transport(transport: T) -> Self {
        Self {
            transport: Arc::new(transport),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Send the action `name` with a JSON `payload` and return the decoded reply.
    ///
    /// A payload that serializes to `null` (such as `&()`) is sent as `{}`.
    ///
    /// # Errors
    ///
    /// Returns an [`ActionError`] carrying `name` if the payload cannot be encoded, the call fails,
    /// the channel is closed, or the reply is not valid JSON.
    pub async fn send<P>(&self, name: &str, payload: &P) -> Result<Value, ActionError>
    where
        P: Serialize + ?Sized,
    {
        let data = encode_payload(payload).map_err(|e| ActionError::new(name, e.to_string()))?;
        let seq = SeqId::generate();

        debug!(action = %name, seq = %seq, "Sending action");

        let request = Message {
            seq: seq.into(),
            name: name.to_string(),
            ack: None,
            data: Some(data),
        };

        let reply = self.transport.unary(request).await.map_err(|e| {
            debug!(action = %name, error = %e, "Action failed");
            ActionError::new(name, e.detail())
        })?;

        decode_payload(reply.data.as_deref()).map_err(|e| ActionError::new(name, e.to_string()))
    }

    /// Like [`send`](Self::send), deserializing the reply into `R`.
    pub async fn send_as<R, P>(&self, name: &str, payload: &P) -> Result<R, ActionError>
    where
        R: DeserializeOwned,
        P: Serialize + ?Sized,
    {
        let value = self.send(name, payload).await?;
        serde_json::from_value(value).map_err(|e| ActionError::new(name, e.to_string()))
    }

    /// Acknowledge the stream message with sequence id `seq`.
    ///
    /// Subscriptions acknowledge automatically unless started with `ack` disabled, in which case
    /// the handler calls this with [`Delivery::seq`](crate::Delivery::seq) once it is done.
    pub async fn ack(&self, seq: impl AsRef<str>) -> Result<(), ActionError> {
        let target = seq.as_ref();
        let request = Message {
            seq: SeqId::generate().into(),
            name: ACK_ACTION.to_string(),
            ack: Some(target.to_string()),
            data: None,
        };

        self.transport
            .unary(request)
            .await
            .map(|_| ())
            .map_err(|e| ActionError::new(ACK_ACTION, e.detail()))
    }

    /// Release the connection. Later calls fail with a "channel closed" [`ActionError`] and open
    /// subscriptions end. Closing twice is a no-op.
    pub fn close(&self) {
        self.transport.close();
    }

    pub fn is_closed(&self) -> bool {
        self.transport.is_closed()
    }
}

pub(crate) fn encode_payload<P>(payload: &P) -> serde_json::Result<Bytes>
where
    P: Serialize + ?Sized,
{
    let value = match serde_json::to_value(payload)? {
        Value::Null => Value::Object(Map::new()),
        value => value,
    };
    serde_json::to_vec(&value).map(Bytes::from)
}

/// Decode a JSON body. An absent or empty body is an error, like any other invalid document.
pub(crate) fn decode_payload(data: Option<&[u8]>) -> serde_json::Result<Value> {
    serde_json::from_slice(data.unwrap_or_default())
}
