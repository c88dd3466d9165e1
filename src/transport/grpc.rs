use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tonic::transport::{Channel as TonicChannel, Endpoint};
use tracing::{debug, info};

use super::{MessageStream, Transport, TransportError};
use crate::acts_proto::acts_service_client::ActsServiceClient;
use crate::acts_proto::{Message, MessageOptions};
use crate::config::ChannelConfig;
use crate::error::ConnectError;

/// [`Transport`] over a tonic channel to `acts.ActsService`.
///
/// Closing drops the client, so the connection is released once the last in-flight call
/// finishes, and signals every open stream to end with [`TransportError::Closed`].
pub struct GrpcTransport {
    client: Mutex<Option<ActsServiceClient<TonicChannel>>>,
    closed: watch::Sender<bool>,
    timeout: Option<Duration>,
}

impl std::fmt::Debug for GrpcTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GrpcTransport")
            .field("client", &"<ActsServiceClient>")
            .field("closed", &self.is_closed())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl GrpcTransport {
    /// Connect to the server described by `config`.
    ///
    /// Unless `config.lazy` is set the connection is established before returning.
    pub async fn connect(config: &ChannelConfig) -> Result<Self, ConnectError> {
        let url = config.endpoint_url()?;
        let endpoint = Endpoint::from_shared(url.as_str().trim_end_matches('/').to_string())?
            .connect_timeout(config.connect_timeout);

        let channel = if config.lazy {
            endpoint.connect_lazy()
        } else {
            endpoint.connect().await?
        };

        info!(url = %url, lazy = config.lazy, "Connected to acts server");

        Ok(Self::from_channel(channel, config.timeout))
    }

    /// Wrap an already configured tonic channel.
    pub fn from_channel(channel: TonicChannel, timeout: Option<Duration>) -> Self {
        let (closed, _) = watch::channel(false);
        Self {
            client: Mutex::new(Some(ActsServiceClient::new(channel))),
            closed,
            timeout,
        }
    }

    fn client(&self) -> Result<ActsServiceClient<TonicChannel>, TransportError> {
        self.client
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(TransportError::Closed)
    }
}

#[tonic::async_trait]
impl Transport for GrpcTransport {
    async fn unary(&self, request: Message) -> Result<Message, TransportError> {
        let mut client = self.client()?;

        let mut request = tonic::Request::new(request);
        if let Some(timeout) = self.timeout {
            request.set_timeout(timeout);
        }

        let response = client.send(request).await?;
        Ok(response.into_inner())
    }

    async fn open_stream(&self, filter: MessageOptions) -> Result<MessageStream, TransportError> {
        let mut client = self.client()?;
        let mut closed = self.closed.subscribe();
        let client_id = filter.client_id.clone();

        let mut inbound = client.on_message(filter).await?.into_inner();

        debug!(client_id = %client_id, "Message stream opened");

        let stream = async_stream::stream! {
            loop {
                let next = tokio::select! {
                    biased;
                    () = wait_closed(&mut closed) => Err(TransportError::Closed),
                    next = inbound.message() => next.map_err(TransportError::from),
                };

                match next {
                    Ok(Some(message)) => yield Ok(message),
                    Ok(None) => break,
                    Err(e) => {
                        yield Err(e);
                        break;
                    }
                }
            }
        };

        Ok(Box::pin(stream))
    }

    fn close(&self) {
        let client = self
            .client
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        self.closed.send_replace(true);

        if client.is_some() {
            info!("Channel closed");
        }
    }

    fn is_closed(&self) -> bool {
        *self.closed.borrow()
    }
}

/// Resolves once the transport is closed or dropped.
async fn wait_closed(closed: &mut watch::Receiver<bool>) {
    loop {
        if *closed.borrow_and_update() {
            return;
        }
        if closed.changed().await.is_err() {
            return;
        }
    }
}
