use std::time::Duration;

use acts_channel::{Channel, ChannelConfig, Delivery};
use anyhow::Result;
use serde_json::{Map, json};
use tracing::{info, warn};
use uuid::Uuid;

const MODEL: &str = r#"
id: test
name: workflow in rust
steps:
    - name: step 1
      id: step1
      acts:
          - uses: acts.core.irq
            key: abc
"#;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let config = ChannelConfig::from_env();
    let client_id = std::env::var("ACTS_CLIENT_ID").unwrap_or_else(|_| Uuid::new_v4().to_string());

    info!(url = %config.url, client_id = %client_id, "Connecting to acts server");

    let chan = Channel::connect_with(config).await?;

    let deployed = chan.deploy(MODEL, None).await?;
    info!(result = %deployed, "Model deployed");

    let model = chan
        .send("model:get", &json!({ "id": "test", "fmt": "tree" }))
        .await?;
    info!(tree = %model["data"], "Fetched model");

    // Dropped handle: the listener runs until the channel is closed.
    chan.subscribe(&client_id, on_message, None);

    let mut vars = Map::new();
    vars.insert("custom".to_string(), json!("aaa"));
    let pid = chan.start("test", vars).await?;
    info!(pid = %pid, "Process started");

    info!("Waiting for messages...");

    tokio::select! {
        _ = tokio::signal::ctrl_c() => info!("Caught ctrl-c"),
        _ = tokio::time::sleep(Duration::from_secs(5)) => {}
    }

    chan.close();
    Ok(())
}

async fn on_message(chan: Channel, delivery: Delivery) {
    info!(seq = %delivery.seq, message = %delivery.payload, "Received message");

    if delivery.payload["key"] == "abc" {
        let pid = delivery.payload["pid"].as_str().unwrap_or_default();
        let tid = delivery.payload["tid"].as_str().unwrap_or_default();

        if let Err(e) = chan.act("complete", pid, tid, Map::new()).await {
            warn!(pid = %pid, tid = %tid, error = %e, "Failed to complete act");
        }
    }
}
