//! # acts-channel
//!
//! Client for the acts workflow server over gRPC.
//!
//! A [`Channel`] sends named actions with JSON payloads and returns the decoded replies, and
//! subscribes to the server's message stream with glob filters, acknowledging each message before
//! handing it to a handler.
//!
//! ```ignore
//! use acts_channel::Channel;
//! use serde_json::Map;
//!
//! let chan = Channel::connect("127.0.0.1:10080").await?;
//!
//! chan.deploy(MODEL_YAML, None).await?;
//! chan.subscribe("client-1", |_chan, delivery| async move {
//!     println!("{}", delivery.payload);
//! }, None);
//! let pid = chan.start("test", Map::new()).await?;
//! ```

pub mod channel;
pub mod config;
pub mod error;
pub mod seq;
pub mod subscription;
pub mod transport;

pub mod acts_proto {
    include!(concat!(env!("OUT_DIR"), "/acts.rs"));
}

pub use channel::Channel;
pub use channel::actions::Package;
pub use config::ChannelConfig;
pub use error::{ActionError, ConnectError};
pub use seq::SeqId;
pub use subscription::error::SubscriptionError;
pub use subscription::{Delivery, StreamEnd, SubscribeOptions, Subscription};
pub use transport::{GrpcTransport, Transport, TransportError};
