use acts_channel::{Channel, ChannelConfig, StreamEnd, SubscribeOptions};
use anyhow::Result;
use tracing::{info, warn};
use uuid::Uuid;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let config = ChannelConfig::from_env();
    let client_id = std::env::var("ACTS_CLIENT_ID").unwrap_or_else(|_| Uuid::new_v4().to_string());
    let auto_ack = std::env::var("ACTS_ACK")
        .map(|v| v != "false" && v != "0")
        .unwrap_or(true);

    let options = SubscribeOptions::builder()
        .maybe_message_type(std::env::var("ACTS_TYPE").ok())
        .maybe_state(std::env::var("ACTS_STATE").ok())
        .maybe_tag(std::env::var("ACTS_TAG").ok())
        .maybe_key(std::env::var("ACTS_KEY").ok())
        .maybe_uses(std::env::var("ACTS_USES").ok())
        .ack(auto_ack)
        .build();

    info!(url = %config.url, client_id = %client_id, auto_ack, "Connecting to acts server");

    let chan = Channel::connect_with(config).await?;

    let subscription = chan.subscribe(
        &client_id,
        move |chan, delivery| async move {
            info!(seq = %delivery.seq, message = %delivery.payload, "Received message");

            if !auto_ack {
                if let Err(e) = chan.ack(&delivery.seq).await {
                    warn!(seq = %delivery.seq, error = %e, "Failed to acknowledge message");
                }
            }
        },
        Some(options),
    );

    tokio::select! {
        end = subscription.join() => match end {
            StreamEnd::Completed => info!("Message stream closed"),
            StreamEnd::Failed(e) => warn!(error = ?e, "Subscription failed"),
            StreamEnd::Aborted => info!("Subscription aborted"),
        },
        _ = tokio::signal::ctrl_c() => {
            info!("Caught ctrl-c");
            chan.close();
        }
    }

    Ok(())
}
