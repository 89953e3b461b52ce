// Kafka Connect reachability probe

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde_json::Value;

use super::{Probe, ProbeOutcome};

/// Lists connectors on the Kafka Connect REST API
pub struct ConnectorManagerProbe {
    client: Client,
    url: String,
}

impl ConnectorManagerProbe {
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            url: format!("{}/connectors", base_url.trim_end_matches('/')),
        }
    }
}

#[async_trait]
impl Probe for ConnectorManagerProbe {
    fn name(&self) -> &'static str {
        "kafka-connect"
    }

    async fn check(&self) -> ProbeOutcome {
        let response = match self
            .client
            .get(&self.url)
            .send()
            .await
            .and_then(Response::error_for_status)
        {
            Ok(response) => response,
            Err(e) => return ProbeOutcome::Failed(e.to_string()),
        };

        match response.json::<Vec<Value>>().await {
            Ok(connectors) => {
                ProbeOutcome::Healthy(format!("running ({} connectors)", connectors.len()))
            }
            Err(e) => ProbeOutcome::Failed(format!("unexpected connector listing: {}", e)),
        }
    }

    /// Only reachability is exposed for the message broker
    fn failure_status(&self, _cause: &str) -> String {
        "not reachable".to_string()
    }
}
