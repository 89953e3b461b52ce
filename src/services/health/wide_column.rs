// Cassandra / Scylla reachability probe

use async_trait::async_trait;
use scylla::load_balancing::DefaultPolicy;
use scylla::{ExecutionProfile, Session, SessionBuilder};
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use super::{Probe, ProbeOutcome};
use crate::config::HealthConfig;

const DEFAULT_CQL_PORT: u16 = 9042;

/// Opens a client session against the wide-column cluster.
///
/// The returned session owns its connections and closes them when dropped.
#[async_trait]
pub trait ClusterConnector: Send + Sync + 'static {
    type Session: Send;

    async fn connect(&self) -> Result<Self::Session, String>;
}

/// Connector backed by the Scylla driver, which speaks the Cassandra protocol
pub struct ScyllaConnector {
    contact_point: String,
    datacenter: String,
    keyspace: String,
    connect_timeout: Duration,
}

impl ScyllaConnector {
    pub fn from_config(config: &HealthConfig) -> Self {
        Self {
            contact_point: contact_address(&config.cassandra_host),
            datacenter: config.cassandra_datacenter.clone(),
            keyspace: config.cassandra_keyspace.clone(),
            connect_timeout: config.probe_timeout,
        }
    }
}

/// Appends the default CQL port when the host carries none
fn contact_address(host: &str) -> String {
    let host = host.trim();
    if host.parse::<SocketAddr>().is_ok() {
        return host.to_string();
    }
    if let Ok(ip) = host.parse::<IpAddr>() {
        return SocketAddr::new(ip, DEFAULT_CQL_PORT).to_string();
    }
    match host.rsplit_once(':') {
        Some((_, port)) if port.parse::<u16>().is_ok() => host.to_string(),
        _ => format!("{}:{}", host, DEFAULT_CQL_PORT),
    }
}

#[async_trait]
impl ClusterConnector for ScyllaConnector {
    type Session = Session;

    async fn connect(&self) -> Result<Session, String> {
        let policy = DefaultPolicy::builder()
            .prefer_datacenter(self.datacenter.clone())
            .build();
        let profile = ExecutionProfile::builder()
            .load_balancing_policy(policy)
            .build();

        let builder = SessionBuilder::new()
            .known_node(&self.contact_point)
            .default_execution_profile_handle(profile.into_handle())
            .use_keyspace(&self.keyspace, false)
            .connection_timeout(self.connect_timeout);

        match tokio::time::timeout(self.connect_timeout, builder.build()).await {
            Ok(Ok(session)) => Ok(session),
            Ok(Err(e)) => Err(e.to_string()),
            Err(_) => Err(format!(
                "connection to {} timed out after {:?}",
                self.contact_point, self.connect_timeout
            )),
        }
    }
}

/// Connects to the cluster and immediately lets the session go
pub struct WideColumnProbe<C> {
    connector: C,
}

impl<C: ClusterConnector> WideColumnProbe<C> {
    pub fn new(connector: C) -> Self {
        Self { connector }
    }
}

#[async_trait]
impl<C: ClusterConnector> Probe for WideColumnProbe<C> {
    fn name(&self) -> &'static str {
        "cassandra"
    }

    async fn check(&self) -> ProbeOutcome {
        // Dropping the session closes its connections
        match self.connector.connect().await {
            Ok(session) => {
                drop(session);
                ProbeOutcome::Healthy("running".to_string())
            }
            Err(cause) => ProbeOutcome::Failed(cause),
        }
    }

    fn failure_status(&self, _cause: &str) -> String {
        "not reachable".to_string()
    }
}
