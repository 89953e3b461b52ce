// OpenSearch reachability probe

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde_json::Value;

use super::{Probe, ProbeOutcome};

/// Reads the cluster name from the search engine's root endpoint
pub struct SearchEngineProbe {
    client: Client,
    url: String,
}

impl SearchEngineProbe {
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            url: base_url.to_string(),
        }
    }
}

/// Extracts a non-empty `cluster_name` from a root-endpoint body
fn cluster_name(body: &str) -> Option<String> {
    let info: Value = serde_json::from_str(body).ok()?;
    info.get("cluster_name")
        .and_then(Value::as_str)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
}

#[async_trait]
impl Probe for SearchEngineProbe {
    fn name(&self) -> &'static str {
        "opensearch"
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

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => return ProbeOutcome::Failed(e.to_string()),
        };

        match cluster_name(&body) {
            Some(name) => ProbeOutcome::Healthy(format!("running ({})", name)),
            None => ProbeOutcome::Incomplete("responded without cluster_name".to_string()),
        }
    }

    fn failure_status(&self, _cause: &str) -> String {
        "not reachable".to_string()
    }
}
