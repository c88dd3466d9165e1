//! Server-pushed message subscriptions.
//!
//! [`Channel::subscribe`] opens the `OnMessage` stream in a spawned task and feeds every message
//! to a handler, one at a time and in delivery order. By default each message is acknowledged
//! before its handler runs; with `ack` disabled the handler acknowledges through
//! [`Channel::ack`] using [`Delivery::seq`].
//!
//! ```ignore
//! use acts_channel::{Channel, SubscribeOptions};
//! use serde_json::Map;
//!
//! let chan = Channel::connect("127.0.0.1:10080").await?;
//!
//! chan.subscribe(
//!     "client-1",
//!     |chan, delivery| async move {
//!         if delivery.payload["key"] == "abc" {
//!             let pid = delivery.payload["pid"].as_str().unwrap_or_default();
//!             let tid = delivery.payload["tid"].as_str().unwrap_or_default();
//!             let _ = chan.act("complete", pid, tid, Map::new()).await;
//!         }
//!     },
//!     Some(SubscribeOptions::builder().message_type("act").build()),
//! );
//! ```
//!
//! A listener ends when the stream ends or fails, a payload cannot be decoded, or the handler
//! panics. In all of these cases the channel is closed; there is no reconnect. Further calls on the
//! channel fail, which is how callers notice.

pub mod error;

use std::future::Future;
use std::panic::AssertUnwindSafe;

use bon::Builder;
use futures::{FutureExt, StreamExt};
use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::acts_proto::MessageOptions;
use crate::channel::{Channel, decode_payload};
use crate::seq::SeqId;
use crate::transport::Transport;

use self::error::SubscriptionError;

/// Glob pattern matching every value.
pub const MATCH_ALL: &str = "*";

/// Filters and delivery policy for a subscription.
///
/// Unset (or empty) patterns match everything.
#[derive(Debug, Clone, Default, Builder)]
pub struct SubscribeOptions {
    /// Glob over the message type, e.g. `step`, `act`.
    #[builder(into)]
    pub message_type: Option<String>,

    /// Glob over the message state, e.g. `created`, `completed`.
    #[builder(into)]
    pub state: Option<String>,

    /// Glob over the model or step tag.
    #[builder(into)]
    pub tag: Option<String>,

    /// Glob over the model or step key.
    #[builder(into)]
    pub key: Option<String>,

    /// Glob over the package an act uses, e.g. `acts.core.*`.
    #[builder(into)]
    pub uses: Option<String>,

    /// Acknowledge each message before its handler runs. Defaults to `true`.
    pub ack: Option<bool>,
}

impl SubscribeOptions {
    /// The stream filter for `client_id`.
    pub fn filter(&self, client_id: &str) -> MessageOptions {
        MessageOptions {
            client_id: client_id.to_string(),
            r#type: glob(&self.message_type),
            state: glob(&self.state),
            tag: glob(&self.tag),
            key: glob(&self.key),
            uses: glob(&self.uses),
        }
    }

    pub fn auto_ack(&self) -> bool {
        self.ack.unwrap_or(true)
    }
}

fn glob(pattern: &Option<String>) -> String {
    match pattern.as_deref() {
        Some(pattern) if !pattern.is_empty() => pattern.to_string(),
        _ => MATCH_ALL.to_string(),
    }
}

/// A message handed to a subscription handler.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    /// Sequence id of the stream message, for manual acknowledgment.
    pub seq: SeqId,
    /// The decoded JSON payload.
    pub payload: Value,
}

/// How a subscription's listener task finished.
#[derive(Debug)]
pub enum StreamEnd {
    /// The server ended the stream.
    Completed,
    /// The subscription failed.
    Failed(SubscriptionError),
    /// The task was stopped through [`Subscription::abort`].
    Aborted,
}

/// Handle to a running subscription.
///
/// Dropping the handle detaches the listener task, which keeps running until its stream ends or
/// its channel is closed.
#[derive(Debug)]
pub struct Subscription {
    client_id: String,
    task: JoinHandle<StreamEnd>,
}

impl Subscription {
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stop the listener task. The channel stays open.
    pub fn abort(&self) {
        self.task.abort();
    }

    /// Wait for the listener task to finish.
    pub async fn join(self) -> StreamEnd {
        match self.task.await {
            Ok(end) => end,
            Err(e) if e.is_cancelled() => StreamEnd::Aborted,
            Err(_) => StreamEnd::Failed(SubscriptionError::HandlerPanic),
        }
    }
}

impl<T: Transport> Channel<T> {
    /// Subscribe to server messages for `client_id`, calling `handler` for each one.
    ///
    /// Returns immediately; the stream is opened and read on a spawned task, so this must be
    /// called from within a tokio runtime. Messages are handled strictly one after another: the
    /// next message is not read until the handler's future completes.
    pub fn subscribe<F, Fut>(
        &self,
        client_id: &str,
        handler: F,
        options: Option<SubscribeOptions>,
    ) -> Subscription
    where
        F: Fn(Channel<T>, Delivery) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let options = options.unwrap_or_default();
        let filter = options.filter(client_id);
        let auto_ack = options.auto_ack();

        info!(
            client_id = %client_id,
            message_type = %filter.r#type,
            state = %filter.state,
            tag = %filter.tag,
            key = %filter.key,
            uses = %filter.uses,
            auto_ack,
            "Starting subscription"
        );

        let task = tokio::spawn(listen(self.clone(), filter, auto_ack, handler));

        Subscription {
            client_id: client_id.to_string(),
            task,
        }
    }
}

async fn listen<T, F, Fut>(
    channel: Channel<T>,
    filter: MessageOptions,
    auto_ack: bool,
    handler: F,
) -> StreamEnd
where
    T: Transport,
    F: Fn(Channel<T>, Delivery) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let client_id = filter.client_id.clone();

    let end = match deliver(&channel, filter, auto_ack, &handler).await {
        Ok(()) => {
            info!(client_id = %client_id, "Message stream closed");
            StreamEnd::Completed
        }
        Err(e) => {
            warn!(client_id = %client_id, error = ?e, "Subscription failed");
            StreamEnd::Failed(e)
        }
    };

    channel.close();
    end
}

async fn deliver<T, F, Fut>(
    channel: &Channel<T>,
    filter: MessageOptions,
    auto_ack: bool,
    handler: &F,
) -> Result<(), SubscriptionError>
where
    T: Transport,
    F: Fn(Channel<T>, Delivery) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let mut stream = channel.transport().open_stream(filter).await?;

    while let Some(message) = stream.next().await {
        let message = message?;
        let seq = SeqId::from(message.seq);

        debug!(seq = %seq, "Received message");

        if auto_ack {
            if let Err(e) = channel.ack(&seq).await {
                warn!(seq = %seq, error = %e.error, "Failed to acknowledge message");
            }
        }

        let payload =
            decode_payload(message.data.as_deref()).map_err(|source| SubscriptionError::Decode {
                seq: seq.to_string(),
                source,
            })?;

        let delivery = Delivery { seq, payload };
        AssertUnwindSafe(async { handler(channel.clone(), delivery).await })
            .catch_unwind()
            .await
            .map_err(|_| SubscriptionError::HandlerPanic)?;
    }

    Ok(())
}
