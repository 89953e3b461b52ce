// Composite health check across the gateway's backing services

mod connectors;
mod relational;
mod search;
mod wide_column;

pub use connectors::ConnectorManagerProbe;
pub use relational::RelationalProbe;
pub use search::SearchEngineProbe;
pub use wide_column::{ClusterConnector, ScyllaConnector, WideColumnProbe};

use async_trait::async_trait;
use reqwest::Client;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

use crate::config::HealthConfig;

/// Snapshot of every dependency's status, built fresh for each request.
///
/// All fields are plain strings: a failing dependency is described, never omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub server: String,
    pub db: String,
    pub message_broker: String,
    pub wide_column_store: String,
    pub search_engine: String,
    pub mail: String,
}

/// Result of a single probe before it is folded into the report
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// Dependency answered as expected; carries the status to report
    Healthy(String),
    /// Dependency answered but without the data the probe looks for
    Incomplete(String),
    /// Dependency could not be used; carries the cause
    Failed(String),
}

/// One bounded interaction with one external dependency
#[async_trait]
pub trait Probe: Send + Sync + 'static {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    async fn check(&self) -> ProbeOutcome;

    /// Status reported when the probe fails, panics or runs out of time.
    /// Each dependency decides how much of the cause it exposes.
    fn failure_status(&self, cause: &str) -> String;

    fn render(&self, outcome: ProbeOutcome) -> String {
        match outcome {
            ProbeOutcome::Healthy(status) | ProbeOutcome::Incomplete(status) => status,
            ProbeOutcome::Failed(cause) => self.failure_status(&cause),
        }
    }
}

/// Runs all dependency probes and assembles a [`HealthReport`]
#[derive(Clone)]
pub struct HealthAggregator {
    relational: Arc<dyn Probe>,
    message_broker: Arc<dyn Probe>,
    wide_column: Arc<dyn Probe>,
    search_engine: Arc<dyn Probe>,
    probe_timeout: Duration,
}

impl HealthAggregator {
    pub fn new(
        relational: Arc<dyn Probe>,
        message_broker: Arc<dyn Probe>,
        wide_column: Arc<dyn Probe>,
        search_engine: Arc<dyn Probe>,
        probe_timeout: Duration,
    ) -> Self {
        Self {
            relational,
            message_broker,
            wide_column,
            search_engine,
            probe_timeout,
        }
    }

    /// Wires the production probes from configuration and the shared database pool
    pub fn from_config(
        config: &HealthConfig,
        conn: Arc<DatabaseConnection>,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(config.probe_timeout)
            .connect_timeout(config.probe_timeout)
            .build()?;

        Ok(Self::new(
            Arc::new(RelationalProbe::new(conn, config.db_mode)),
            Arc::new(ConnectorManagerProbe::new(
                client.clone(),
                &config.kafka_connect_url,
            )),
            Arc::new(WideColumnProbe::new(ScyllaConnector::from_config(config))),
            Arc::new(SearchEngineProbe::new(client, &config.opensearch_url)),
            config.probe_timeout,
        ))
    }

    /// Probes every dependency concurrently and returns a fully populated report
    pub async fn collect(&self) -> HealthReport {
        let (db, message_broker, wide_column_store, search_engine) = tokio::join!(
            run_isolated(Arc::clone(&self.relational), self.probe_timeout),
            run_isolated(Arc::clone(&self.message_broker), self.probe_timeout),
            run_isolated(Arc::clone(&self.wide_column), self.probe_timeout),
            run_isolated(Arc::clone(&self.search_engine), self.probe_timeout),
        );

        HealthReport {
            server: "running".to_string(),
            db,
            message_broker,
            wide_column_store,
            search_engine,
            mail: "ready".to_string(),
        }
    }
}

/// Runs one probe on its own task so that a panic or a hang stays local to it
async fn run_isolated(probe: Arc<dyn Probe>, deadline: Duration) -> String {
    let task_probe = Arc::clone(&probe);
    let mut handle = tokio::spawn(async move { task_probe.check().await });

    match timeout(deadline, &mut handle).await {
        Ok(Ok(outcome)) => {
            if let ProbeOutcome::Failed(cause) = &outcome {
                tracing::debug!(probe = probe.name(), %cause, "Dependency probe failed");
            }
            probe.render(outcome)
        }
        Ok(Err(join_error)) => {
            tracing::error!(probe = probe.name(), error = %join_error, "Dependency probe aborted");
            probe.failure_status(&format!("probe task failed: {}", join_error))
        }
        Err(_) => {
            // Wait for the cancelled task so its resources are dropped before we report
            handle.abort();
            let _ = handle.await;
            tracing::debug!(
                probe = probe.name(),
                timeout_secs = deadline.as_secs_f64(),
                "Dependency probe timed out"
            );
            probe.failure_status(&format!("timed out after {:?}", deadline))
        }
    }
}
