//! Typed wrappers over [`Channel::send`] for the common server actions.
//!
//! Each wrapper only shapes its JSON payload and returns the reply unchanged. Payload containers
//! are taken by value so every call sends its own document.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use super::Channel;
use crate::error::ActionError;
use crate::transport::Transport;

pub const PUBLISH_ACTION: &str = "pack:publish";
pub const DEPLOY_ACTION: &str = "model:deploy";
pub const START_ACTION: &str = "proc:start";
pub const ACK_ACTION: &str = "msg:ack";

/// Action name for executing the act `name` on a running task, e.g. `act:complete`.
pub fn act_action(name: &str) -> String {
    format!("act:{name}")
}

/// A package of reusable workflow logic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    pub id: String,
    pub name: String,
    pub body: String,
}

impl<T: Transport> Channel<T> {
    /// Publish a package to the server.
    pub async fn publish(&self, package: &Package) -> Result<Value, ActionError> {
        self.send(PUBLISH_ACTION, package).await
    }

    /// Deploy a model given as YAML. Pass `mid` to replace the model with that id.
    pub async fn deploy(&self, model: &str, mid: Option<&str>) -> Result<Value, ActionError> {
        self.send(DEPLOY_ACTION, &json!({ "model": model, "mid": mid }))
            .await
    }

    /// Start a process from the deployed model `mid` with the input `vars`.
    ///
    /// The reply carries the new process id.
    pub async fn start(&self, mid: &str, mut vars: Map<String, Value>) -> Result<Value, ActionError> {
        vars.insert("id".to_string(), Value::from(mid));
        self.send(START_ACTION, &vars).await
    }

    /// Execute the act `name` (e.g. `complete`, `submit`, `abort`) on task `tid` of process `pid`.
    pub async fn act(
        &self,
        name: &str,
        pid: &str,
        tid: &str,
        mut options: Map<String, Value>,
    ) -> Result<Value, ActionError> {
        options.insert("pid".to_string(), Value::from(pid));
        options.insert("tid".to_string(), Value::from(tid));
        self.send(&act_action(name), &options).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::testing::{MockTransport, Reply};

    fn sent_json(chan: &Channel<MockTransport>) -> Value {
        let requests = chan.transport().requests();
        let data = requests.last().unwrap().data.clone().unwrap();
        serde_json::from_slice(&data).unwrap()
    }

    #[tokio::test]
    async fn test_publish() {
        let chan = Channel::with_transport(MockTransport::new(Reply::Echo));
        let package = Package {
            id: "pack1".to_string(),
            name: "package 1".to_string(),
            body: "console.log('hi')".to_string(),
        };

        chan.publish(&package).await.unwrap();

        assert_eq!(chan.transport().requests()[0].name, PUBLISH_ACTION);
        assert_eq!(
            sent_json(&chan),
            json!({"id": "pack1", "name": "package 1", "body": "console.log('hi')"})
        );
    }

    #[tokio::test]
    async fn test_deploy_without_mid() {
        let chan = Channel::with_transport(MockTransport::new(Reply::Echo));

        chan.deploy("id: test", None).await.unwrap();

        assert_eq!(chan.transport().requests()[0].name, DEPLOY_ACTION);
        assert_eq!(sent_json(&chan), json!({"model": "id: test", "mid": null}));
    }

    #[tokio::test]
    async fn test_start_injects_model_id() {
        let chan = Channel::with_transport(MockTransport::new(Reply::Echo));
        let mut vars = Map::new();
        vars.insert("custom".to_string(), json!("aaa"));

        chan.start("test", vars).await.unwrap();

        assert_eq!(chan.transport().requests()[0].name, START_ACTION);
        assert_eq!(sent_json(&chan), json!({"custom": "aaa", "id": "test"}));
    }

    #[tokio::test]
    async fn test_act_injects_process_and_task() {
        let chan = Channel::with_transport(MockTransport::new(Reply::Echo));

        chan.act("complete", "pid-1", "tid-1", Map::new())
            .await
            .unwrap();

        assert_eq!(chan.transport().requests()[0].name, "act:complete");
        assert_eq!(sent_json(&chan), json!({"pid": "pid-1", "tid": "tid-1"}));
    }

    #[tokio::test]
    async fn test_separate_calls_do_not_share_payloads() {
        let chan = Channel::with_transport(MockTransport::new(Reply::Echo));

        chan.act("submit", "p1", "t1", Map::new()).await.unwrap();
        chan.start("m1", Map::new()).await.unwrap();

        assert_eq!(sent_json(&chan), json!({"id": "m1"}));
    }
}
